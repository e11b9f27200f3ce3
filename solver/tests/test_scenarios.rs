//! End-to-end scenarios through the public API.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use cluedo::simulation::Deal;
use cluedo::{
    choose_accusation, Agent, Category, Certainty, ClueError, Holder, KnowledgeBase, SearchConfig, Suggestion,
    SuggestionSearch, Token, TokenSet,
};

fn set(s: &str) -> TokenSet {
    TokenSet::parse(s).unwrap()
}

fn tok(s: &str) -> Token {
    Token::parse(s).unwrap()
}

fn sug(s: &str) -> Suggestion {
    Suggestion::parse(s).unwrap()
}

#[test]
fn shown_token_is_pinned_to_disprover() {
    let kb = KnowledgeBase::initialize(4, Some(0), Some(set("Gr Ca Ba"))).unwrap();
    let kb = kb.on_suggestion_disproved(0, sug("Mu Kn Li"), 3, Some(tok("Kn"))).unwrap();

    assert!(kb.player(3).unwrap().known_have().contains(tok("Kn")));
    for seat in [1, 2] {
        assert_eq!(kb.has(Holder::Player(seat), tok("Kn")), Certainty::No);
        assert_eq!(kb.has(Holder::Player(seat), tok("Mu")), Certainty::No);
        assert_eq!(kb.has(Holder::Player(seat), tok("Li")), Certainty::No);
    }
    assert_eq!(kb.has(Holder::Solution, tok("Kn")), Certainty::No);
    assert_eq!(kb.holder_of(tok("Kn")), Some(Holder::Player(3)));
}

#[test]
fn accusation_once_one_triple_remains() {
    // Seat 1 holds Pl Re Ba Bi Co Di, seat 2 holds Sc Ro Ha Ki Li Lo,
    // the solution is Wh Wr St.
    let kb = KnowledgeBase::initialize(3, Some(0), Some(set("Gr Mu Pe Ca Kn Pi"))).unwrap();
    let events = [
        ("Pl Ca Ba", 1, "Pl"),
        ("Gr Re Bi", 1, "Re"),
        ("Gr Ca Ba", 1, "Ba"),
        ("Gr Ca Bi", 1, "Bi"),
        ("Gr Ca Co", 1, "Co"),
        ("Gr Ca Di", 1, "Di"),
        ("Sc Ca St", 2, "Sc"),
        ("Gr Ro St", 2, "Ro"),
        ("Gr Ca Ha", 2, "Ha"),
        ("Gr Ca Ki", 2, "Ki"),
        ("Gr Ca Li", 2, "Li"),
    ];
    let mut kb = kb;
    for (suggestion, disprover, shown) in events {
        kb = kb
            .on_suggestion_disproved(0, sug(suggestion), disprover, Some(tok(shown)))
            .unwrap();
    }
    assert_eq!(kb.remaining(Category::Suspect), set("Wh"));
    assert_eq!(kb.remaining(Category::Weapon), set("Wr"));
    assert_eq!(kb.remaining(Category::Room), set("Lo St"));
    assert_eq!(choose_accusation(&kb), None);

    let kb = kb.on_suggestion_disproved(0, sug("Gr Ca Lo"), 2, Some(tok("Lo"))).unwrap();
    assert_eq!(choose_accusation(&kb), Some(sug("Wh Wr St")));
    assert!(kb.player(2).unwrap().is_resolved());
}

#[test]
fn holding_and_excluding_the_same_token_is_a_contradiction() {
    let kb = KnowledgeBase::initialize(4, Some(0), Some(set("Gr Ca Ba Bi Co"))).unwrap();
    let kb = kb.on_suggestion_disproved(0, sug("Mu Kn Li"), 2, Some(tok("Kn"))).unwrap();
    // Seat 1 suggests Pe Kn St and nobody answers: seat 2 would exclude Kn.
    let err = kb.on_suggestion_not_disproved(1, sug("Pe Kn St")).unwrap_err();
    assert!(matches!(err, ClueError::Contradiction(_)));
    // The earlier value is untouched.
    assert_eq!(kb.holder_of(tok("Kn")), Some(Holder::Player(2)));
}

#[test]
fn incorrect_accusations_narrow_the_solution() {
    let mut kb = KnowledgeBase::initialize(3, Some(0), Some(set("Gr Mu Pe Ca Kn Pi"))).unwrap();
    // Suspects and weapons fixed, two rooms left.
    for (suggestion, disprover, shown) in [
        ("Pl Ca Ba", 1, "Pl"),
        ("Sc Ca Ba", 1, "Sc"),
        ("Gr Re Ba", 1, "Re"),
        ("Gr Ro Ba", 1, "Ro"),
    ] {
        kb = kb
            .on_suggestion_disproved(0, sug(suggestion), disprover, Some(tok(shown)))
            .unwrap();
    }
    let rooms = kb.remaining(Category::Room);
    assert!(rooms.len() > 1);
    for room in rooms.iter().skip(1) {
        let accusation = Suggestion::new(tok("Wh"), tok("Wr"), room).unwrap();
        kb = kb.on_accusation(1, accusation, false).unwrap();
    }
    let last = rooms.first().unwrap();
    assert_eq!(kb.remaining(Category::Room), TokenSet::single(last));
    assert_eq!(
        choose_accusation(&kb),
        Some(Suggestion::new(tok("Wh"), tok("Wr"), last).unwrap())
    );
}

#[test]
fn self_played_game_converges_on_the_solution() {
    let mut rng = SmallRng::seed_from_u64(2024);
    let deal = Deal::random(4, &mut rng).unwrap();
    let search = Arc::new(SuggestionSearch::new(&SearchConfig::default()).unwrap());
    let mut agents: Vec<Agent> = deal
        .hands
        .iter()
        .enumerate()
        .map(|(seat, &hand)| Agent::new(4, seat, hand, Arc::clone(&search), seat as u64).unwrap())
        .collect();
    let mut observer = KnowledgeBase::initialize(4, None, None).unwrap();

    let mut winner = None;
    'game: for turn in 0..400 {
        let active = turn % 4;
        let suggestion = agents[active].suggest().unwrap();
        let disprover = deal.first_disprover(active, suggestion);
        let shown = disprover.map(|d| agents[d].disprove(active, suggestion).unwrap());
        for (seat, agent) in agents.iter_mut().enumerate() {
            let visible = if seat == active || Some(seat) == disprover { shown } else { None };
            agent.observe_suggestion(active, suggestion, disprover, visible).unwrap();
            assert!(agent.knowledge().is_consistent_with(&deal.hands, deal.solution));
        }
        observer = observer.record_suggestion(active, suggestion, disprover, None).unwrap();

        if let Some(accusation) = agents[active].accuse() {
            assert_eq!(accusation, deal.solution, "sound agents only accuse correctly");
            for agent in agents.iter_mut() {
                agent.observe_accusation(active, accusation, true).unwrap();
            }
            observer = observer.on_accusation(active, accusation, true).unwrap();
            winner = Some(active);
            break 'game;
        }
    }

    assert!(winner.is_some(), "game did not finish");
    for agent in &agents {
        assert_eq!(agent.knowledge().solution().known_have(), deal.solution.token_set());
    }
    assert_eq!(observer.solution().known_have(), deal.solution.token_set());
    assert_eq!(observer.possible_solutions(), vec![deal.solution]);
}

#[test]
fn observer_never_sees_tokens() {
    let kb = KnowledgeBase::initialize(5, None, None).unwrap();
    let kb = kb.on_suggestion_disproved(0, sug("Mu Kn Li"), 2, None).unwrap();
    assert_eq!(kb.player(1).unwrap().possible().intersection(set("Mu Kn Li")), TokenSet::EMPTY);
    assert_eq!(kb.player(2).unwrap().clauses(), &[set("Mu Kn Li")]);
    assert!(kb.estimate_possibilities() > 0.0);
    assert_eq!(kb.history().len(), 1);
}

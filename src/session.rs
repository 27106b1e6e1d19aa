use crate::models::{Card, Judgment};
use crate::store::CardStore;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

/// Time units on the clock when a session starts.
pub const SESSION_TIME: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing left to review.
    Idle,
    Running,
    Paused,
}

/// What the presentation layer renders from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub deck: Vec<Card>,
    pub time_remaining: u32,
    pub active: bool,
}

impl Snapshot {
    pub fn top(&self) -> Option<&Card> {
        self.deck.last()
    }
}

type Observer = Box<dyn FnMut(&Snapshot)>;

pub struct Session<S: CardStore> {
    store: S,
    deck: Vec<Card>,
    time_remaining: u32,
    active: bool,
    reuse_incorrect: bool,
    shuffle: bool,
    observers: Vec<Observer>,
}

impl<S: CardStore> Session<S> {
    /// Creates a session and starts it with the stored deck.
    pub fn new(store: S) -> Self {
        let mut session = Session {
            store,
            deck: Vec::new(),
            time_remaining: SESSION_TIME,
            active: true,
            reuse_incorrect: false,
            shuffle: false,
            observers: Vec::new(),
        };
        session.reset();
        session
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reuse_incorrect(&self) -> bool {
        self.reuse_incorrect
    }

    /// Can change at any time, it only affects later judgments.
    pub fn set_reuse_incorrect(&mut self, reuse: bool) {
        self.reuse_incorrect = reuse;
    }

    /// Takes effect on the next reset.
    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    pub fn phase(&self) -> Phase {
        if self.deck.is_empty() {
            Phase::Idle
        } else if self.active {
            Phase::Running
        } else {
            Phase::Paused
        }
    }

    /// Out of cards or out of time.
    pub fn is_over(&self) -> bool {
        self.deck.is_empty() || self.time_remaining == 0
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            deck: self.deck.clone(),
            time_remaining: self.time_remaining,
            active: self.active,
        }
    }

    /// Calls `observer` with a fresh snapshot after every event that changes state.
    pub fn subscribe(&mut self, observer: impl FnMut(&Snapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Reloads the deck and restarts the clock.
    pub fn reset(&mut self) {
        self.reset_with_rng(&mut rand::rng());
    }

    pub fn reset_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.deck = self.store.load().unwrap_or_default();
        if self.shuffle {
            self.deck.shuffle(rng);
        }
        self.time_remaining = SESSION_TIME;
        self.active = true;
        info!(cards = self.deck.len(), "Session reset");
        self.notify();
    }

    /// One unit of time passes. The clock stops at 0.
    pub fn tick(&mut self) {
        if !self.active || self.time_remaining == 0 {
            return;
        }
        self.time_remaining -= 1;
        if self.time_remaining == 0 {
            debug!("Time is up");
        }
        self.notify();
    }

    pub fn app_will_background(&mut self) {
        if self.active {
            debug!("Pausing session");
            self.active = false;
            self.notify();
        }
    }

    pub fn app_will_foreground(&mut self) {
        if !self.deck.is_empty() && !self.active {
            debug!("Resuming session");
            self.active = true;
            self.notify();
        }
    }

    /// Judges the topmost card as answered correctly.
    pub fn mark_correct(&mut self) {
        if let Some(top) = self.top_index() {
            self.judge(top, Judgment::Correct);
        }
    }

    /// Judges the card at `index` as answered incorrectly.
    pub fn mark_incorrect(&mut self, index: usize) {
        self.judge(index, Judgment::Incorrect);
    }

    /// Judges whatever card is on top right now as answered incorrectly.
    pub fn mark_top_incorrect(&mut self) {
        if let Some(top) = self.top_index() {
            self.judge(top, Judgment::Incorrect);
        }
    }

    pub fn judge(&mut self, index: usize, judgment: Judgment) {
        if index >= self.deck.len() {
            debug!(index, len = self.deck.len(), "Ignoring judgment for missing card");
            return;
        }
        match judgment {
            Judgment::Incorrect if self.reuse_incorrect => self.push_to_back(index),
            _ => self.remove(index),
        }
        debug!(?judgment, remaining = self.deck.len(), "Judged card");
        if self.deck.is_empty() {
            info!("Deck finished");
            self.active = false;
        }
        self.notify();
    }

    fn top_index(&self) -> Option<usize> {
        self.deck.len().checked_sub(1)
    }

    fn remove(&mut self, index: usize) {
        self.deck.remove(index);
    }

    // Position 0 is the bottom of the stack, so the card comes around again last.
    fn push_to_back(&mut self, index: usize) {
        let card = self.deck.remove(index);
        self.deck.insert(0, card);
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer(&snapshot);
        }
    }
}

#[cfg(test)]
fn cards(prompts: &[&str]) -> Vec<Card> {
    prompts.iter().map(|p| Card::new(*p, "")).collect()
}

#[cfg(test)]
fn session_with(prompts: &[&str]) -> Session<crate::store::Preferences> {
    use crate::store::Preferences;

    let mut prefs = Preferences::in_memory();
    prefs.save(&cards(prompts)).unwrap();
    Session::new(prefs)
}

#[test]
fn test_new_session_starts_running() {
    let session = session_with(&["A", "B"]);
    assert_eq!(session.deck(), cards(&["A", "B"]));
    assert_eq!(session.time_remaining(), SESSION_TIME);
    assert!(session.is_active());
    assert_eq!(session.phase(), Phase::Running);
}

#[test]
fn test_empty_store_gives_empty_deck() {
    use crate::store::Preferences;

    let mut session = Session::new(Preferences::in_memory());
    session.reset();
    assert!(session.deck().is_empty());
    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.is_over());
}

#[test]
fn test_correct_removes_top_card() {
    let mut session = session_with(&["A", "B", "C"]);
    session.mark_correct();
    assert_eq!(session.deck(), cards(&["A", "B"]));
    assert!(session.is_active());
}

#[test]
fn test_correct_always_shrinks_deck_by_one() {
    for n in 1..6 {
        let prompts: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let prompts: Vec<&str> = prompts.iter().map(String::as_str).collect();
        let mut session = session_with(&prompts);
        session.mark_correct();
        assert_eq!(session.deck().len(), n - 1);
    }
}

#[test]
fn test_incorrect_with_reuse_moves_card_to_front() {
    let mut session = session_with(&["A", "B", "C"]);
    session.set_reuse_incorrect(true);
    session.mark_incorrect(2);
    assert_eq!(session.deck(), cards(&["C", "A", "B"]));

    session.mark_incorrect(1);
    assert_eq!(session.deck(), cards(&["A", "C", "B"]));
    assert!(session.is_active());
}

#[test]
fn test_incorrect_without_reuse_removes_card() {
    let mut session = session_with(&["A", "B", "C"]);
    session.mark_incorrect(1);
    assert_eq!(session.deck(), cards(&["A", "C"]));
    session.mark_top_incorrect();
    assert_eq!(session.deck(), cards(&["A"]));
}

#[test]
fn test_reuse_of_last_card_keeps_it() {
    let mut session = session_with(&["A"]);
    session.set_reuse_incorrect(true);
    session.mark_top_incorrect();
    assert_eq!(session.deck(), cards(&["A"]));
    assert!(session.is_active());
}

#[test]
fn test_emptying_deck_stops_clock() {
    let mut session = session_with(&["A"]);
    session.mark_correct();
    assert!(session.deck().is_empty());
    assert!(!session.is_active());

    session.tick();
    assert_eq!(session.time_remaining(), SESSION_TIME);
}

#[test]
fn test_emptying_paused_deck_stays_inactive() {
    let mut session = session_with(&["A"]);
    session.app_will_background();
    session.mark_incorrect(0);
    assert!(!session.is_active());
    assert_eq!(session.phase(), Phase::Idle);
}

#[test]
fn test_judging_empty_deck_is_noop() {
    use crate::store::Preferences;

    let mut session = Session::new(Preferences::in_memory());
    session.mark_correct();
    session.mark_top_incorrect();
    session.mark_incorrect(0);
    assert!(session.deck().is_empty());
    assert!(session.is_active());
}

#[test]
fn test_out_of_range_index_is_noop() {
    let mut session = session_with(&["A", "B"]);
    session.set_reuse_incorrect(true);
    session.mark_incorrect(2);
    session.judge(usize::MAX, Judgment::Correct);
    assert_eq!(session.deck(), cards(&["A", "B"]));
}

#[test]
fn test_tick_counts_down_and_floors_at_zero() {
    let mut session = session_with(&["A"]);
    session.tick();
    assert_eq!(session.time_remaining(), SESSION_TIME - 1);
    for _ in 0..SESSION_TIME + 10 {
        session.tick();
    }
    assert_eq!(session.time_remaining(), 0);
    assert!(session.is_over());
    assert!(session.is_active());
}

#[test]
fn test_tick_while_paused_does_nothing() {
    let mut session = session_with(&["A"]);
    session.app_will_background();
    assert_eq!(session.phase(), Phase::Paused);
    for _ in 0..5 {
        session.tick();
    }
    assert_eq!(session.time_remaining(), SESSION_TIME);
}

#[test]
fn test_foreground_resumes_only_with_cards() {
    let mut session = session_with(&["A"]);
    session.app_will_background();
    session.app_will_foreground();
    assert!(session.is_active());

    session.mark_correct();
    session.app_will_background();
    session.app_will_foreground();
    assert!(!session.is_active());
}

#[test]
fn test_reset_restores_everything() {
    let mut session = session_with(&["A", "B"]);
    session.mark_correct();
    session.tick();
    session.app_will_background();

    session.reset();
    assert_eq!(session.deck(), cards(&["A", "B"]));
    assert_eq!(session.time_remaining(), SESSION_TIME);
    assert!(session.is_active());
}

#[test]
fn test_reset_picks_up_newly_saved_cards() {
    let mut session = session_with(&["A"]);
    session.store_mut().save(&cards(&["X", "Y"])).unwrap();
    assert_eq!(session.deck(), cards(&["A"]));
    session.reset();
    assert_eq!(session.deck(), cards(&["X", "Y"]));
}

#[test]
fn test_reset_with_shuffle_keeps_cards() {
    let mut session = session_with(&["A", "B", "C", "D"]);
    session.set_shuffle(true);
    session.reset_with_rng(&mut rand::rng());
    let mut prompts: Vec<&str> = session.deck().iter().map(|c| c.prompt.as_str()).collect();
    prompts.sort();
    assert_eq!(prompts, vec!["A", "B", "C", "D"]);
}

#[test]
fn test_observers_receive_snapshots() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut session = session_with(&["A", "B"]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    session.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.clone()));

    session.tick();
    session.mark_correct();
    // Already paused, nothing to report.
    session.app_will_background();
    session.app_will_background();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].time_remaining, SESSION_TIME - 1);
    assert_eq!(seen[1].top(), Some(&Card::new("A", "")));
    assert!(!seen[2].active);
}

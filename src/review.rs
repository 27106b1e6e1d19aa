use crate::session::Session;
use crate::store::CardStore;
use crate::utils::{clear, plural};
use anyhow::Result;
use std::fmt;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use tracing::debug;

/// Source of session ticks.
pub trait Clock {
    /// Ticks that passed since the last call.
    fn elapsed_ticks(&mut self) -> u32;
}

/// One tick per wall-clock second.
pub struct WallClock {
    last: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        WallClock {
            last: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn elapsed_ticks(&mut self) -> u32 {
        let secs = self.last.elapsed().as_secs();
        // Keep the fraction of a second for the next call.
        self.last += Duration::from_secs(secs);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub correct: usize,
    pub incorrect: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} card{} correct, {} incorrect. Done.",
            self.correct,
            plural(self.correct),
            self.incorrect
        )
    }
}

enum Choice {
    Correct,
    Incorrect,
    Pause,
    Quit,
    Unknown,
}

impl Choice {
    fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "y" => Choice::Correct,
            "n" => Choice::Incorrect,
            "p" => Choice::Pause,
            "q" => Choice::Quit,
            _ => Choice::Unknown,
        }
    }
}

/// Runs a session in the terminal until the user quits or input ends.
pub fn review<S, R, W, C>(
    session: &mut Session<S>,
    mut stdin: R,
    mut stdout: W,
    clock: &mut C,
) -> Result<Summary>
where
    S: CardStore,
    R: BufRead,
    W: Write,
    C: Clock,
{
    let mut summary = Summary::default();
    // Time spent before the first card is shown doesn't count.
    clock.elapsed_ticks();
    loop {
        clear(&mut stdout)?;
        if session.is_over() {
            let message = if session.deck().is_empty() {
                "All cards done!"
            } else {
                "Time is up!"
            };
            write!(stdout, "{}\nStart again? [y/N] ", message)?;
            stdout.flush()?;
            match next_line(&mut stdin)? {
                Some(line) if line.trim().eq_ignore_ascii_case("y") => {
                    session.reset();
                    clock.elapsed_ticks();
                    continue;
                }
                _ => break,
            }
        }

        let Some(card) = session.deck().last().cloned() else {
            break;
        };
        let cards = session.deck().len();
        write!(
            stdout,
            "Time: {} | Card{}: {}\nQ: {}",
            session.time_remaining(),
            plural(cards),
            cards,
            card.prompt
        )?;
        stdout.flush()?;
        match next_line(&mut stdin)? {
            Some(line) if !line.trim().eq_ignore_ascii_case("q") => {}
            _ => break,
        }
        advance(session, clock);
        if session.is_over() {
            continue;
        }

        write!(stdout, "A: {}\nCorrect? [y/n/p/q] ", card.answer)?;
        stdout.flush()?;
        let Some(line) = next_line(&mut stdin)? else {
            break;
        };
        advance(session, clock);
        if session.is_over() {
            debug!("Answer came in after the time was up");
            continue;
        }
        match Choice::parse(&line) {
            Choice::Correct => {
                session.mark_correct();
                summary.correct += 1;
            }
            Choice::Incorrect => {
                session.mark_top_incorrect();
                summary.incorrect += 1;
            }
            Choice::Pause => {
                session.app_will_background();
                write!(stdout, "Paused. Press Enter to resume. ")?;
                stdout.flush()?;
                if next_line(&mut stdin)?.is_none() {
                    break;
                }
                // No ticks while paused.
                clock.elapsed_ticks();
                session.app_will_foreground();
            }
            Choice::Quit => break,
            Choice::Unknown => {}
        }
    }
    Ok(summary)
}

fn advance<S: CardStore, C: Clock>(session: &mut Session<S>, clock: &mut C) {
    let ticks = clock.elapsed_ticks().min(session.time_remaining());
    for _ in 0..ticks {
        session.tick();
    }
}

// None at end of input.
fn next_line<R: BufRead>(stdin: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

#[cfg(test)]
const CLEAR: &str = "\u{1b}[2J\u{1b}[1;1H";

#[cfg(test)]
struct FixedClock(u32);

#[cfg(test)]
impl Clock for FixedClock {
    fn elapsed_ticks(&mut self) -> u32 {
        self.0
    }
}

#[cfg(test)]
fn two_card_session() -> Session<crate::store::Preferences> {
    use crate::models::Card;
    use crate::store::Preferences;

    let mut prefs = Preferences::in_memory();
    prefs
        .save(&[Card::new("A", "a1"), Card::new("B", "b1")])
        .unwrap();
    Session::new(prefs)
}

#[cfg(test)]
fn run(
    session: &mut Session<crate::store::Preferences>,
    input: &[u8],
    ticks: u32,
) -> (Summary, String) {
    use std::io::Cursor;

    let mut stdout = Cursor::new(Vec::new());
    let summary = review(
        session,
        Cursor::new(input),
        &mut stdout,
        &mut FixedClock(ticks),
    )
    .unwrap();
    let output = String::from_utf8_lossy(&stdout.into_inner()).into_owned();
    (summary, output)
}

#[test]
fn test_review_whole_deck() {
    let mut session = two_card_session();
    let (summary, output) = run(&mut session, b"\ny\n\nn\n", 0);

    assert_eq!(
        summary,
        Summary {
            correct: 1,
            incorrect: 1
        }
    );
    assert_eq!(
        output,
        format!(
            "{CLEAR}Time: 100 | Cards: 2\nQ: BA: b1\nCorrect? [y/n/p/q] \
             {CLEAR}Time: 100 | Card: 1\nQ: AA: a1\nCorrect? [y/n/p/q] \
             {CLEAR}All cards done!\nStart again? [y/N] "
        )
    );
    assert!(session.deck().is_empty());
    assert!(!session.is_active());
    assert_eq!(summary.to_string(), "1 card correct, 1 incorrect. Done.");
}

#[test]
fn test_incorrect_cards_come_back_when_reused() {
    use crate::models::Card;

    let mut session = two_card_session();
    session.set_reuse_incorrect(true);
    let (summary, _) = run(&mut session, b"\nn\n", 0);

    assert_eq!(summary.incorrect, 1);
    assert_eq!(session.deck(), [Card::new("B", "b1"), Card::new("A", "a1")]);
}

#[test]
fn test_late_answer_is_ignored_and_session_restarts() {
    use crate::session::SESSION_TIME;

    let mut session = two_card_session();
    let (summary, output) = run(&mut session, b"\ny\ny\n", 60);

    assert_eq!(summary, Summary::default());
    assert!(output.contains("Time is up!\nStart again? [y/N] "));
    assert_eq!(session.deck().len(), 2);
    assert_eq!(session.time_remaining(), SESSION_TIME);
}

#[test]
fn test_pause_stops_the_clock() {
    use crate::models::Card;

    let mut session = two_card_session();
    let (summary, output) = run(&mut session, b"\np\n\n\ny\n", 5);

    assert_eq!(summary.correct, 1);
    assert!(output.contains("Paused. Press Enter to resume. "));
    assert!(output.contains("Time: 90 | Cards: 2"));
    assert_eq!(session.time_remaining(), 80);
    assert_eq!(session.deck(), [Card::new("A", "a1")]);
}

#[test]
fn test_quit_at_question() {
    let mut session = two_card_session();
    let (summary, output) = run(&mut session, b"q\n", 0);

    assert_eq!(summary, Summary::default());
    assert_eq!(output, format!("{CLEAR}Time: 100 | Cards: 2\nQ: B"));
    assert_eq!(session.deck().len(), 2);
}

#[test]
fn test_quit_at_question_in_upper_case() {
    let mut session = two_card_session();
    let (summary, _) = run(&mut session, b"Q\ny\n", 0);

    assert_eq!(summary, Summary::default());
    assert_eq!(session.deck().len(), 2);
}

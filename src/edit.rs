use crate::models::Card;
use crate::store::{self, CardStore};
use crate::utils::read_line;
use anyhow::Result;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    #[error("Prompt and answer must not be empty")]
    EmptyField,
    #[error("A card with this prompt already exists at position {0}")]
    DuplicatePrompt(usize),
    #[error("There is no card at position {0}")]
    NoSuchCard(usize),
}

/// Working copy of the card list. Nothing is stored until [`CardEditor::commit`].
#[derive(Debug, Default)]
pub struct CardEditor {
    cards: Vec<Card>,
}

impl CardEditor {
    pub fn new(cards: Vec<Card>) -> Self {
        CardEditor { cards }
    }

    /// Starts from whatever the store has saved.
    pub fn load<S: CardStore>(store: &S) -> Self {
        Self::new(store.load().unwrap_or_default())
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Adds a card at the bottom of the stack, so it is reviewed last.
    pub fn add(&mut self, prompt: &str, answer: &str) -> Result<(), EditError> {
        let card = self.check(prompt, answer, &[])?;
        self.cards.insert(0, card);
        Ok(())
    }

    /// Adds `cards` at the bottom of the stack as one block, keeping their order.
    /// Returns the refused cards by their position in `cards`.
    pub fn add_all(&mut self, cards: Vec<Card>) -> Vec<(usize, EditError)> {
        let mut block = Vec::with_capacity(cards.len());
        let mut refused = Vec::new();
        for (i, card) in cards.into_iter().enumerate() {
            match self.check(&card.prompt, &card.answer, &block) {
                Ok(card) => block.push(card),
                Err(e) => refused.push((i, e)),
            }
        }
        self.cards.splice(0..0, block);
        refused
    }

    // Positions in errors are where the clashing card ends up once `pending` is in front.
    fn check(&self, prompt: &str, answer: &str, pending: &[Card]) -> Result<Card, EditError> {
        let prompt = prompt.trim();
        let answer = answer.trim();
        if prompt.is_empty() || answer.is_empty() {
            return Err(EditError::EmptyField);
        }
        if let Some(i) = pending.iter().position(|c| c.prompt == prompt) {
            return Err(EditError::DuplicatePrompt(i));
        }
        if let Some(i) = self.cards.iter().position(|c| c.prompt == prompt) {
            return Err(EditError::DuplicatePrompt(pending.len() + i));
        }
        Ok(Card::new(prompt, answer))
    }

    pub fn remove(&mut self, index: usize) -> Result<Card, EditError> {
        if index >= self.cards.len() {
            return Err(EditError::NoSuchCard(index));
        }
        Ok(self.cards.remove(index))
    }

    pub fn commit<S: CardStore>(&self, store: &mut S) -> store::Result<()> {
        debug!(count = self.cards.len(), "Committing edited cards");
        store.save(&self.cards)
    }
}

/// Lets the user type in as many cards as they want. An empty prompt stops.
/// Returns the number of cards added.
pub fn add_cards<R, W>(editor: &mut CardEditor, mut stdin: R, mut stdout: W) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut added = 0;
    loop {
        stdout.write_all(b"Prompt: ")?;
        stdout.flush()?;
        let prompt = read_line(&mut stdin)?;
        // Exit on empty input
        if prompt.trim().is_empty() {
            return Ok(added);
        }

        stdout.write_all(b"Answer: ")?;
        stdout.flush()?;
        let answer = read_line(&mut stdin)?;
        match editor.add(&prompt, &answer) {
            Ok(()) => added += 1,
            Err(e) => writeln!(stdout, "{}. Skipped.", e)?,
        }
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }
}

/// Writes the card list as a numbered listing, topmost card last.
pub fn list_cards<W: Write>(cards: &[Card], mut stdout: W) -> Result<()> {
    if cards.is_empty() {
        writeln!(stdout, "No cards yet. Use `flashdeck add` to create some.")?;
        return Ok(());
    }
    for (i, card) in cards.iter().enumerate() {
        writeln!(stdout, "{:>3}. {} | {}", i, card.prompt, card.answer)?;
    }
    Ok(())
}

#[test]
fn test_add_trims_and_inserts_at_bottom() {
    let mut editor = CardEditor::new(vec![Card::new("a", "1")]);
    editor.add("  b ", " 2\t").unwrap();
    assert_eq!(editor.cards(), [Card::new("b", "2"), Card::new("a", "1")]);
}

#[test]
fn test_add_rejects_empty_and_duplicates() {
    let mut editor = CardEditor::default();
    assert_eq!(editor.add(" ", "x"), Err(EditError::EmptyField));
    assert_eq!(editor.add("x", ""), Err(EditError::EmptyField));
    editor.add("x", "y").unwrap();
    assert_eq!(editor.add("x", "z"), Err(EditError::DuplicatePrompt(0)));
    assert_eq!(editor.cards().len(), 1);
}

#[test]
fn test_add_all_keeps_order_below_existing_cards() {
    let mut editor = CardEditor::new(vec![Card::new("z", "0")]);
    let refused = editor.add_all(vec![
        Card::new("a", "1"),
        Card::new("z", "2"),
        Card::new("b", ""),
        Card::new("a", "3"),
        Card::new("c", "4"),
    ]);
    assert_eq!(
        refused,
        [
            (1, EditError::DuplicatePrompt(1)),
            (2, EditError::EmptyField),
            (3, EditError::DuplicatePrompt(0)),
        ]
    );
    assert_eq!(
        editor.cards(),
        [Card::new("a", "1"), Card::new("c", "4"), Card::new("z", "0")]
    );
}

#[test]
fn test_remove() {
    let mut editor = CardEditor::new(vec![Card::new("a", "1"), Card::new("b", "2")]);
    assert_eq!(editor.remove(0), Ok(Card::new("a", "1")));
    assert_eq!(editor.remove(1), Err(EditError::NoSuchCard(1)));
    assert_eq!(editor.cards(), [Card::new("b", "2")]);
}

#[test]
fn test_commit_writes_to_store() {
    use crate::store::Preferences;

    let mut prefs = Preferences::in_memory();
    let mut editor = CardEditor::load(&prefs);
    editor.add("q", "a").unwrap();
    assert_eq!(prefs.load(), None);
    editor.commit(&mut prefs).unwrap();
    assert_eq!(prefs.load(), Some(vec![Card::new("q", "a")]));
}

#[test]
fn test_add_cards_skips_duplicates() {
    use std::io::Cursor;

    let mut editor = CardEditor::default();
    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(
        b"a\nb\n\
a\nc\n\
d\ne\n\n",
    );
    let added = add_cards(&mut editor, &mut stdin, &mut stdout).unwrap();
    assert_eq!(added, 2);

    let stdout_vec = stdout.into_inner();
    assert_eq!(
        String::from_utf8_lossy(&stdout_vec),
        "Prompt: Answer: \n\
Prompt: Answer: A card with this prompt already exists at position 0. Skipped.\n\n\
Prompt: Answer: \n\
Prompt: "
    );
    assert_eq!(editor.cards(), [Card::new("d", "e"), Card::new("a", "b")]);
}

#[test]
fn test_list_cards() {
    use std::io::Cursor;

    let mut stdout = Cursor::new(Vec::new());
    list_cards(&[Card::new("a", "1"), Card::new("b", "2")], &mut stdout).unwrap();
    assert_eq!(
        String::from_utf8_lossy(&stdout.into_inner()),
        "  0. a | 1\n  1. b | 2\n"
    );
}

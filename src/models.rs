use serde::{Deserialize, Serialize};
use struct_field_names_as_array::FieldNamesAsArray;

/// A single flashcard. Two cards are the same card if their text matches.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, FieldNamesAsArray)]
pub struct Card {
    pub prompt: String,
    pub answer: String,
}

impl Card {
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Card {
            prompt: prompt.into(),
            answer: answer.into(),
        }
    }

    pub fn example() -> Self {
        Card::new(
            "Who played the 13th Doctor in Doctor Who?",
            "Jodie Whittaker",
        )
    }
}

/// How the user judged the topmost card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Judgment {
    Correct,
    Incorrect,
}

use crate::edit::CardEditor;
use crate::models::Card;
use crate::utils::{create_reader, create_writer};
use anyhow::{anyhow, Result};
use std::io::{Read, Write};
use struct_field_names_as_array::FieldNamesAsArray;
use tracing::{info, warn};

pub fn export_cards<W: Write>(cards: &[Card], out: W) -> Result<()> {
    let mut writer = create_writer(out);
    writer.write_record(Card::FIELD_NAMES_AS_ARRAY)?;
    for card in cards {
        writer.serialize(card)?;
    }
    writer.flush()?;
    info!(count = cards.len(), "Exported cards");
    Ok(())
}

/// Adds the cards from `input` to the bottom of the editor's stack in file
/// order. Cards the editor refuses are skipped. Returns how many were added.
pub fn import_cards<R: Read>(editor: &mut CardEditor, input: R) -> Result<usize> {
    let mut reader = create_reader(input);
    let cards = reader
        .deserialize::<Card>()
        .enumerate()
        .map(|(i, record)| {
            record.map_err(|e| anyhow!("Line {} is not a valid card: {}", i + 2, e))
        })
        .collect::<Result<Vec<_>>>()?;
    let total = cards.len();
    let refused = editor.add_all(cards);
    for (i, e) in &refused {
        warn!(line = i + 2, error = %e, "Skipping card");
    }
    let added = total - refused.len();
    info!(added, "Imported cards");
    Ok(added)
}

#[test]
fn test_export_writes_header_and_quotes() {
    use std::io::Cursor;

    let mut out = Cursor::new(Vec::new());
    export_cards(
        &[Card::new("a", "b"), Card::new("x|y", "z")],
        &mut out,
    )
    .unwrap();
    assert_eq!(
        String::from_utf8_lossy(&out.into_inner()),
        "prompt|answer\na|b\n#x|y#|z\n"
    );
}

#[test]
fn test_import_skips_duplicates() {
    let mut editor = CardEditor::new(vec![Card::new("a", "b")]);
    let input = "prompt|answer\na|other\nc|d\n#e|f#|g\n";
    let added = import_cards(&mut editor, input.as_bytes()).unwrap();
    assert_eq!(added, 2);
    assert_eq!(
        editor.cards(),
        [Card::new("c", "d"), Card::new("e|f", "g"), Card::new("a", "b")]
    );
}

#[test]
fn test_import_reports_bad_line() {
    let mut editor = CardEditor::default();
    let input = "prompt|answer\na|b\nonly-one-field\n";
    let result = import_cards(&mut editor, input.as_bytes());
    assert!(result
        .unwrap_err()
        .to_string()
        .starts_with("Line 3 is not a valid card"));
}

#[test]
fn test_export_then_import_keeps_order() {
    use std::io::Cursor;

    let cards = vec![Card::new("a", "1"), Card::new("b", "2"), Card::new("c", "3")];
    let mut out = Cursor::new(Vec::new());
    export_cards(&cards, &mut out).unwrap();

    let mut editor = CardEditor::default();
    let added = import_cards(&mut editor, out.into_inner().as_slice()).unwrap();
    assert_eq!(added, 3);
    assert_eq!(editor.cards(), cards);
}

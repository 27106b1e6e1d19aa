use std::io::{self, BufRead, Write};

/// Reads one line without its line ending. Returns an empty string at EOF.
pub fn read_line<R: BufRead>(mut reader: R) -> io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}

pub fn clear<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "{esc}[2J{esc}[1;1H", esc = 27 as char)
}

pub fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

pub fn create_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'|')
        .quote(b'#')
        .has_headers(true)
        .from_reader(reader)
}

pub fn create_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'|')
        .quote(b'#')
        .has_headers(false)
        .from_writer(writer)
}

#[test]
fn test_read_line_strips_line_endings() {
    use std::io::Cursor;

    let mut input = Cursor::new(b"first\r\nsecond\n");
    assert_eq!(read_line(&mut input).unwrap(), "first");
    assert_eq!(read_line(&mut input).unwrap(), "second");
    assert_eq!(read_line(&mut input).unwrap(), "");
}

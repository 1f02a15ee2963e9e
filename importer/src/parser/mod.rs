//! CSV input reading with encoding and delimiter auto-detection.
//!
//! A CSV export is a single sheet: the first record is the header row.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::error::{SheetError, SheetResult};
use crate::sheet::Sheet;

/// Delimiters tried on the header line, in order of preference on a tie.
const DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];

/// Guess the encoding of a CSV export with chardet.
///
/// Labels resolve through the WHATWG table, so a Latin-1 guess decodes as
/// windows-1252. Unknown guesses fall back to UTF-8.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let charset = chardet::detect(bytes).0.to_ascii_lowercase();
    match charset.as_str() {
        "" | "ascii" | "utf-8" | "utf8" => UTF_8,
        label => Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8),
    }
}

/// Decode `bytes`, dropping any byte order mark.
///
/// A BOM overrides `encoding`. Malformed UTF-8 is decoded lossily; malformed
/// input in any other encoding is an error.
pub fn decode_content(bytes: &[u8], encoding: &'static Encoding) -> SheetResult<String> {
    let (decoded, actual, had_errors) = encoding.decode(bytes);
    if had_errors && actual != UTF_8 {
        return Err(SheetError::Encoding(format!(
            "content is not valid {}",
            actual.name()
        )));
    }
    Ok(decoded.into_owned())
}

/// The delimiter occurring most often in the header line, `;` when none does.
pub fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    DELIMITERS
        .iter()
        .map(|&d| (d, header.bytes().filter(|&b| b == d).count()))
        .fold((DELIMITERS[0], 0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
        .0
}

/// Parse CSV text with an explicit delimiter.
///
/// Blank lines are skipped; short records read as empty trailing cells.
pub fn parse_csv(content: &str, delimiter: u8, name: &str) -> SheetResult<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Sheet::from_rows(name, rows).ok_or_else(|| SheetError::EmptySheet(name.to_string()))
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8], name: &str) -> SheetResult<Sheet> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, encoding)?;
    let delimiter = detect_delimiter(&content);

    debug!(
        encoding = encoding.name(),
        delimiter = %(delimiter as char).escape_default(),
        "Detected CSV layout"
    );
    parse_csv(&content, delimiter, name)
}

/// Parse a CSV file with auto-detection of encoding and delimiter. The sheet
/// is named after the file stem.
pub fn parse_csv_file_auto(path: &Path) -> SheetResult<Sheet> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_bytes_auto(&bytes, &name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let sheet = parse_csv("Id;Name\nTC-1;Login\nTC-2;Logout", b';', "cases").unwrap();
        let rows: Vec<_> = sheet.rows().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cell("Id").unwrap(), "TC-1");
        assert_eq!(rows[1].cell("Name").unwrap(), "Logout");
    }

    #[test]
    fn test_quoted_values_keep_delimiters_and_newlines() {
        let csv = "Id,Test Step Description\nTC-1,\"Open, then\nclose\"";
        let sheet = parse_csv(csv, b',', "cases").unwrap();
        let row = sheet.rows().next().unwrap();

        assert_eq!(row.cell("Test Step Description").unwrap(), "Open, then\nclose");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let sheet = parse_csv("a;b\n1;2\n;\n3;4\n", b';', "cases").unwrap();
        assert_eq!(sheet.row_count(), 2);
    }

    #[test]
    fn test_missing_values() {
        let sheet = parse_csv("a;b;c\n1", b';', "cases").unwrap();
        let row = sheet.rows().next().unwrap();

        assert_eq!(row.cell("a").unwrap(), "1");
        assert_eq!(row.cell("c").unwrap(), "");
    }

    #[test]
    fn test_empty_csv_error() {
        let err = parse_csv("", b';', "cases").unwrap_err();
        assert!(matches!(err, SheetError::EmptySheet(_)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), b'\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), b'|');
    }

    #[test]
    fn test_auto_parse() {
        let sheet = parse_bytes_auto(b"Id,Name,Status\nTC-1,Login,New", "cases").unwrap();

        assert_eq!(sheet.headers.names().collect::<Vec<_>>(), vec!["Id", "Name", "Status"]);
        assert_eq!(sheet.row_count(), 1);
    }

    #[test]
    fn test_detect_delimiter_defaults_to_semicolon() {
        assert_eq!(detect_delimiter("Id"), b';');
        assert_eq!(detect_delimiter(""), b';');
        assert_eq!(detect_delimiter("a,b;c"), b';');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let latin1 = Encoding::for_label(b"iso-8859-1").unwrap();
        assert_eq!(decode_content(bytes, latin1).unwrap(), "Société");
    }

    #[test]
    fn test_latin1_currency_sign_is_not_euro() {
        let latin1 = Encoding::for_label(b"latin1").unwrap();
        assert_eq!(decode_content(&[0xA4, 0x31], latin1).unwrap(), "¤1");
    }

    #[test]
    fn test_detect_encoding_plain_text_is_utf8() {
        assert_eq!(detect_encoding(b"Id;Name\nTC-1;Login"), UTF_8);
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let decoded = decode_content("\u{feff}Id;Name".as_bytes(), UTF_8).unwrap();
        assert_eq!(decoded, "Id;Name");
    }
}

use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use crate::{error::ParseError, Error};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One data record, with the line it started on for diagnostics.
#[derive(Debug, Clone)]
pub struct SourceRow {
    pub line: u64,
    pub record: csv::StringRecord,
}

impl SourceRow {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.record.get(index)
    }

    pub fn field_count(&self) -> usize {
        self.record.len()
    }
}

/// A delimited text file whose first record is a header.
///
/// The header is skipped without looking at it; every following record must
/// have as many fields as the header does. Quoting is checked strictly
/// before any record is handed out.
pub struct CsvSource {
    path: PathBuf,
    reader: csv::Reader<Cursor<Vec<u8>>>,
}

impl CsvSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| Error::io(path, e))?;
        CsvSource::from_bytes(path, data)
    }

    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self, Error> {
        let path = path.into();
        if let Err(source) = check_quoting(&data) {
            return Err(Error::Parse { path, source });
        }
        Ok(CsvSource {
            path,
            reader: csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(false)
                .from_reader(Cursor::new(data)),
        })
    }

    pub fn rows(&mut self) -> Rows<'_> {
        Rows {
            path: &self.path,
            records: self.reader.records(),
        }
    }
}

pub struct Rows<'a> {
    path: &'a Path,
    records: csv::StringRecordsIter<'a, Cursor<Vec<u8>>>,
}

impl<'a> Iterator for Rows<'a> {
    type Item = Result<SourceRow, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.path;
        self.records.next().map(|result| {
            result
                .map(|record| SourceRow {
                    line: record.position().map_or(0, |pos| pos.line()),
                    record,
                })
                .map_err(|e| Error::csv(path, e))
        })
    }
}

/// Rejects the quoting mistakes the csv reader accepts silently: a quote
/// inside an unquoted field, anything but a delimiter or line end after a
/// closing quote, and a quoted field running to the end of the input.
fn check_quoting(data: &[u8]) -> Result<(), ParseError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut line = 1;
    let mut at_field_start = true;
    let mut bytes = data.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        match b {
            b'"' if at_field_start => {
                let start = line;
                loop {
                    match bytes.next() {
                        None => return Err(ParseError::UnclosedQuote { line: start }),
                        Some(b'"') if bytes.peek() == Some(&b'"') => {
                            bytes.next();
                        }
                        Some(b'"') => break,
                        Some(b'\n') => line += 1,
                        Some(_) => {}
                    }
                }
                match bytes.peek().copied() {
                    None | Some(b',') | Some(b'\r') | Some(b'\n') => at_field_start = false,
                    Some(_) => return Err(ParseError::ExtraneousQuote { line }),
                }
            }
            b'"' => return Err(ParseError::BareQuote { line }),
            b',' | b'\r' => at_field_start = true,
            b'\n' => {
                line += 1;
                at_field_start = true;
            }
            _ => at_field_start = false,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(input: &[u8]) -> Result<Vec<SourceRow>, Error> {
        CsvSource::from_bytes("test.csv", input.to_vec())?
            .rows()
            .collect()
    }

    fn parse_error(input: &[u8]) -> ParseError {
        match rows(input) {
            Err(Error::Parse { path, source }) => {
                assert_eq!(path, Path::new("test.csv"));
                source
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn skips_header() {
        let rows = rows(b"kode,nama\n11,Aceh\n12,Sumatera Utara\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(1), Some("Aceh"));
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].get(0), Some("12"));
        assert_eq!(rows[1].line, 3);
        assert_eq!(rows[1].field_count(), 2);
    }

    #[test]
    fn header_only_and_empty_input_yield_nothing() {
        assert!(rows(b"kode,nama\n").unwrap().is_empty());
        assert!(rows(b"").unwrap().is_empty());
    }

    #[test]
    fn quoted_fields_keep_delimiters_and_quotes() {
        let rows = rows(b"a,b\n1,\"Kota, Lama\"\r\n2,\"Kampung \"\"Baru\"\"\"\n").unwrap();
        assert_eq!(rows[0].get(1), Some("Kota, Lama"));
        assert_eq!(rows[1].get(1), Some("Kampung \"Baru\""));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let rows = rows(b"\xEF\xBB\xBF\"kode\",nama\n11,Aceh\n").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn unclosed_quote_is_parse_error() {
        let err = parse_error(b"kode,nama\n11,\"Aceh\n12,Sumatera Utara\n");
        assert!(matches!(err, ParseError::UnclosedQuote { line: 2 }));
    }

    #[test]
    fn quote_in_unquoted_field_is_parse_error() {
        let err = parse_error(b"kode,nama\n11,Aceh\n12,Ac\"eh\n");
        assert!(matches!(err, ParseError::BareQuote { line: 3 }));
    }

    #[test]
    fn text_after_closing_quote_is_parse_error() {
        let err = parse_error(b"kode,nama\n11,\"Ac\"eh\n");
        assert!(matches!(err, ParseError::ExtraneousQuote { line: 2 }));
    }

    #[test]
    fn invalid_utf8_is_parse_error() {
        let err = parse_error(b"kode,nama\n11,Ac\xFFeh\n");
        assert!(matches!(err, ParseError::Csv(_)));
    }

    #[test]
    fn uneven_records_are_parse_errors() {
        let err = parse_error(b"a,b\n1,x\n2\n");
        assert!(matches!(err, ParseError::Csv(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        match CsvSource::open(dir.path().join("missing.csv")) {
            Err(Error::Io { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("opened a missing file"),
        }
    }
}

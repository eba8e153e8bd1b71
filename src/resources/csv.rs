//! Strict CSV dialect used by the packaged lookup tables.
//!
//! Fields are comma separated and may be wrapped in double quotes to carry
//! commas; a quote inside a quoted field is doubled. Unlike the lenient
//! readers, a stray or unmatched quote is rejected with its line number.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsvError {
    #[error("line {line}: unmatched quote")]
    UnmatchedQuote { line: usize },
    #[error("line {line}: quote inside an unquoted field")]
    StrayQuote { line: usize },
    #[error("line {line}: unexpected character '{found}' after closing quote")]
    TrailingCharacter { line: usize, found: char },
    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("missing header row")]
    MissingHeader,
    #[error("key column {column} is out of range for {columns} columns")]
    KeyColumn { column: usize, columns: usize },
    #[error("cannot write a record with no values")]
    EmptyRecord,
    #[error("failed to write values: {0}")]
    Write(String),
}

/// Splits one line into fields. `line_number` is 1-based and only used for
/// error reporting.
pub fn parse_csv_line(line: &str, line_number: usize) -> Result<Vec<String>, CsvError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut after_closing_quote = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                    after_closing_quote = true;
                }
            } else {
                current.push(c);
            }
            continue;
        }

        match c {
            ',' => {
                fields.push(std::mem::take(&mut current));
                after_closing_quote = false;
            }
            _ if after_closing_quote => {
                return Err(CsvError::TrailingCharacter {
                    line: line_number,
                    found: c,
                });
            }
            '"' if current.is_empty() => in_quotes = true,
            '"' => return Err(CsvError::StrayQuote { line: line_number }),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnmatchedQuote { line: line_number });
    }
    fields.push(current);

    Ok(fields)
}

/// Joins values into one CSV line, quoting only where needed. An empty list
/// has no line that parses back to it and is rejected.
pub fn write_csv_values<S: AsRef<str>>(values: &[S]) -> Result<String, CsvError> {
    if values.is_empty() {
        return Err(CsvError::EmptyRecord);
    }
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(values.iter().map(AsRef::as_ref))
        .map_err(|err| CsvError::Write(err.to_string()))?;
    let bytes = writer
        .into_inner()
        .map_err(|err| CsvError::Write(err.to_string()))?;

    let mut line = String::from_utf8_lossy(&bytes).into_owned();
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

/// Parses a whole document: the first non-blank line is the header and fixes
/// the column count every data row must match. Blank lines are skipped.
pub fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_start_matches('\u{feff}')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = lines.next().ok_or(CsvError::MissingHeader)?;
    let expected = parse_csv_line(header, header_line)?.len();

    lines
        .map(|(line_number, line)| {
            let fields = parse_csv_line(line, line_number)?;
            if fields.len() != expected {
                return Err(CsvError::ColumnCount {
                    line: line_number,
                    expected,
                    found: fields.len(),
                });
            }
            Ok(fields)
        })
        .collect()
}

/// Groups data rows by the value in `key_column`, keeping first-seen key order.
pub fn group_rows(
    rows: Vec<Vec<String>>,
    key_column: usize,
) -> Result<IndexMap<String, Vec<Vec<String>>>, CsvError> {
    let mut grouped: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();

    for row in rows {
        let key = row
            .get(key_column)
            .ok_or(CsvError::KeyColumn {
                column: key_column,
                columns: row.len(),
            })?
            .trim()
            .to_string();
        grouped.entry(key).or_default().push(row);
    }

    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_quoted_fields_with_commas() {
        assert_eq!(
            parse_csv_line("a,\"b,c\",d", 1).expect("parse"),
            vec!["a", "b,c", "d"]
        );
        assert_eq!(
            parse_csv_line("\"say \"\"hi\"\"\",,x", 1).expect("parse"),
            vec!["say \"hi\"", "", "x"]
        );
        assert_eq!(parse_csv_line("", 1).expect("parse"), vec![""]);
    }

    #[test]
    fn rejects_broken_quoting_with_line_number() {
        assert_eq!(
            parse_csv_line("a,\"b", 7),
            Err(CsvError::UnmatchedQuote { line: 7 })
        );
        assert_eq!(
            parse_csv_line("\"a\"b,c", 3),
            Err(CsvError::TrailingCharacter { line: 3, found: 'b' })
        );
        assert_eq!(
            parse_csv_line("ab\"c", 2),
            Err(CsvError::StrayQuote { line: 2 })
        );
    }

    #[test]
    fn written_values_parse_back_unchanged() {
        let samples: Vec<Vec<String>> = vec![
            vec!["plain".into(), "8140".into()],
            vec!["with, comma".into(), "x".into()],
            vec!["with \"quotes\"".into(), "\"".into(), "".into()],
            vec!["".into(), "mixed, \"both\"".into()],
        ];
        for fields in samples {
            let line = write_csv_values(&fields).expect("write");
            assert_eq!(parse_csv_line(&line, 1).expect("parse back"), fields);
        }
    }

    #[test]
    fn empty_record_is_not_written() {
        let empty: [&str; 0] = [];
        assert_eq!(write_csv_values(&empty), Err(CsvError::EmptyRecord));
    }

    #[test]
    fn rows_must_match_header_width() {
        let rows = parse_rows("a,b\n1,2\n\n3,\"4,5\"\n").expect("valid document");
        assert_eq!(rows, vec![vec!["1", "2"], vec!["3", "4,5"]]);

        assert_eq!(
            parse_rows("a,b\n1,2\n3\n"),
            Err(CsvError::ColumnCount {
                line: 3,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(parse_rows("\n\n"), Err(CsvError::MissingHeader));
    }

    #[test]
    fn groups_rows_in_first_seen_order() {
        let rows = parse_rows("row,code\nB,1\nA,2\nB,3\n").expect("parse");
        let grouped = group_rows(rows, 0).expect("group");
        let keys: Vec<&String> = grouped.keys().collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(grouped["B"].len(), 2);

        assert!(matches!(
            group_rows(vec![vec!["x".to_string()]], 3),
            Err(CsvError::KeyColumn { column: 3, .. })
        ));
    }
}

// src/csv_handler.rs
use csv::{ReaderBuilder, Trim};

use crate::data_types::TableData;

pub struct CsvHandler {}

impl CsvHandler {
    pub fn new() -> Self {
        CsvHandler {}
    }

    /// Parses an export body into headers plus data rows.
    pub fn parse(&self, text: &str) -> TableData {
        let mut records = Self::parse_records(text).into_iter();
        let mut data = TableData::empty();
        if let Some(headers) = records.next() {
            data.headers = headers;
        }
        data.rows = records.collect();
        data
    }

    /// Every non-blank line as a trimmed record, header line included.
    pub fn parse_records(text: &str) -> Vec<Vec<String>> {
        let delimiter = Self::detect_delimiter(text);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        for result in reader.records() {
            match result {
                Ok(record) => {
                    // Skip rows with no content at all
                    if record.iter().all(|field| field.is_empty()) {
                        continue;
                    }
                    records.push(record.iter().map(String::from).collect());
                }
                Err(_) => continue,
            }
        }

        records
    }

    // Published sheets export with commas, but semicolon exports exist in
    // locales that use the comma as a decimal separator.
    fn detect_delimiter(text: &str) -> char {
        let first_line = text.lines().next().unwrap_or_default();
        if first_line.contains(';') {
            ';'
        } else {
            ','
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_keep_the_header_line() {
        let records = CsvHandler::parse_records("a,b\n1,2\n3,4");
        assert_eq!(
            records,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["1".to_string(), "2".to_string()],
                vec!["3".to_string(), "4".to_string()],
            ]
        );
    }

    #[test]
    fn blank_lines_are_dropped_not_emitted() {
        let records = CsvHandler::parse_records("a,b\n\n1,2\n   \n3,4\n");
        assert_eq!(records.len(), 3);
        assert_eq!(records[1], vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn cells_are_trimmed() {
        let records = CsvHandler::parse_records(" a , b \n 1 ,2");
        assert_eq!(records[0], vec!["a".to_string(), "b".to_string()]);
        assert_eq!(records[1], vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn semicolon_delimiter_is_detected() {
        let records = CsvHandler::parse_records("name;rating\nliisa;10");
        assert_eq!(records[0], vec!["name".to_string(), "rating".to_string()]);
        assert_eq!(records[1], vec!["liisa".to_string(), "10".to_string()]);
    }

    #[test]
    fn quoted_fields_keep_embedded_delimiters() {
        let records = CsvHandler::parse_records("name,comment\nbob,\"fine, thanks\"");
        assert_eq!(records[1], vec!["bob".to_string(), "fine, thanks".to_string()]);
    }

    #[test]
    fn ragged_rows_are_kept() {
        let records = CsvHandler::parse_records("a,b,c\n1,2\n3,4,5,6");
        assert_eq!(records[1].len(), 2);
        assert_eq!(records[2].len(), 4);
    }

    #[test]
    fn parse_splits_headers_from_rows() {
        let data = CsvHandler::new().parse("name,answer\nalice,yes\nbob,no");
        assert_eq!(data.headers, vec!["name".to_string(), "answer".to_string()]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[1], vec!["bob".to_string(), "no".to_string()]);
    }

    #[test]
    fn empty_input_is_empty_table() {
        let data = CsvHandler::new().parse("");
        assert!(data.is_empty());
    }
}

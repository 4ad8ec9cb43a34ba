// src/sheets_handler.rs
use thiserror::Error;

use crate::csv_handler::CsvHandler;
use crate::data_types::TableData;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("export request returned {0}. Check if the sheet is published.")]
    BadStatus(reqwest::StatusCode),
}

pub struct SheetsHandler {}

impl SheetsHandler {
    pub fn new() -> Self {
        SheetsHandler {}
    }

    pub fn is_valid_sheets_url(url: &str) -> bool {
        url.contains("docs.google.com/spreadsheets/") || url.contains("sheets.googleapis.com/")
    }

    /// Derives the CSV export endpoint for a sheet URL. URLs without a
    /// recognizable spreadsheet id pass through verbatim, so already-exported
    /// links keep working.
    pub fn to_export_url(sheets_url: &str) -> String {
        match Self::extract_spreadsheet_id(sheets_url) {
            Some(id) => format!("https://docs.google.com/spreadsheets/d/{id}/export?format=csv"),
            None => sheets_url.to_string(),
        }
    }

    // URLs typically look like: https://docs.google.com/spreadsheets/d/[SPREADSHEET_ID]/edit
    fn extract_spreadsheet_id(url: &str) -> Option<&str> {
        let parts: Vec<&str> = url.split('/').collect();

        for (i, part) in parts.iter().enumerate() {
            if *part == "d" && i + 1 < parts.len() {
                let candidate = parts[i + 1];
                let end = candidate
                    .find(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_')
                    .unwrap_or(candidate.len());
                if end > 0 {
                    return Some(&candidate[..end]);
                }
            }
        }

        None
    }

    pub async fn fetch_export(&self, sheets_url: &str) -> Result<TableData, SheetsError> {
        let export_url = Self::to_export_url(sheets_url);
        let response = reqwest::get(&export_url).await?;

        if !response.status().is_success() {
            return Err(SheetsError::BadStatus(response.status()));
        }

        let body = response.text().await?;
        Ok(CsvHandler::new().parse(&body))
    }

    /// One-shot reachability probe. Leaves configuration and any rendered
    /// preview untouched.
    pub async fn test_connection(&self, sheets_url: &str) -> Result<(), SheetsError> {
        let export_url = Self::to_export_url(sheets_url);
        let response = reqwest::get(&export_url).await?;

        if !response.status().is_success() {
            return Err(SheetsError::BadStatus(response.status()));
        }

        Ok(())
    }
}

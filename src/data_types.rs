// src/data_types.rs
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn empty() -> Self {
        TableData {
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}

/// Lifecycle of the data preview panel. `Connected` and `Disconnected`
/// re-enter `Loading` on every refresh; `Unconfigured` never fetches.
#[derive(Debug, Clone)]
pub enum PreviewState {
    Unconfigured,
    Loading,
    Connected(TableData),
    Disconnected(String),
}

/// Connectivity indicator. Only changes when a fetch resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetsStatus {
    Unknown,
    Connected,
    Disconnected,
}

impl SheetsStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SheetsStatus::Unknown => "Not connected",
            SheetsStatus::Connected => "Connected",
            SheetsStatus::Disconnected => "Disconnected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub created: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Notification {
            message: message.into(),
            level,
            created: Instant::now(),
        }
    }
}

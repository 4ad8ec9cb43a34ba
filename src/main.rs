// src/main.rs
use iced::widget::{
    button, checkbox, column, container, row, scrollable, text, text_input, Column, Row, Space,
};
use iced::{
    executor, keyboard, keyboard::KeyCode, subscription, theme, window, Alignment, Application,
    Background, Color, Command, Element, Event, Length, Settings, Subscription, Theme, Vector,
};

use chrono::{DateTime, Local};
use env_logger::Env;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

mod config;
mod csv_handler;
mod data_types;
mod geo_handler;
mod jurisdiction;
mod sheets_handler;
mod ui;

use config::{SheetsConfig, Store};
use data_types::{Notification, NotificationLevel, PreviewState, SheetsStatus, TableData};
use geo_handler::GeoHandler;
use jurisdiction::{Jurisdiction, JurisdictionCode, LocaleSignals};
use sheets_handler::SheetsHandler;
use ui::{Styles, DARK_THEME, LIGHT_THEME};

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

// ↑↑↓↓←→←→BA
const ADMIN_SEQUENCE: [KeyCode; 10] = [
    KeyCode::Up,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::B,
    KeyCode::A,
];

pub fn main() -> iced::Result {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // Log uncaught panics for diagnostics.
    std::panic::set_hook(Box::new(|info| {
        log::error!("uncaught panic: {info}");
    }));

    ResponseViewer::run(Settings {
        window: window::Settings {
            size: (1100, 800),
            resizable: true,
            ..Default::default()
        },
        ..Settings::default()
    })
}

struct ResponseViewer {
    store: Store,
    config: SheetsConfig,
    is_dark_mode: bool,

    preview: PreviewState,
    status: SheetsStatus,
    last_updated: Option<DateTime<Local>>,
    // Single pending refresh slot; re-armed, never accumulated.
    refresh_deadline: Option<Instant>,

    jurisdiction: Option<Jurisdiction>,
    manual_jurisdiction: bool,

    admin_unlocked: bool,
    admin_panel_open: bool,
    key_history: Vec<KeyCode>,
    reset_armed: bool,

    url_input: String,
    interval_input: String,
    show_live_input: bool,
    max_input: String,

    welcome_visible: bool,
    consent_visible: bool,
    preferences_open: bool,
    analytics_consent: bool,
    marketing_consent: bool,

    notifications: Vec<Notification>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    KeyPressed(KeyCode),
    ToggleTheme,

    JurisdictionResolved(Jurisdiction),
    JurisdictionSelected(JurisdictionCode),

    LoadData,
    DataLoaded(Result<TableData, String>),
    OpenSheetsLink,

    OpenAdminPanel,
    CloseAdminPanel,
    UrlInputChanged(String),
    IntervalInputChanged(String),
    ShowLiveDataToggled(bool),
    MaxResponsesChanged(String),
    SaveSettings,
    TestConnection,
    ConnectionTested(Result<(), String>),
    ArmReset,
    ConfirmReset,
    CancelReset,

    DismissWelcome,
    AcceptConsent,
    OpenPreferences,
    ClosePreferences,
    AnalyticsConsentToggled(bool),
    MarketingConsentToggled(bool),
    SavePreferences,
}

impl ResponseViewer {
    fn with_store(store: Store) -> Self {
        let config = store.sheets_config();
        let is_dark_mode = store.theme().map(|t| t == "dark").unwrap_or(true);
        let admin_unlocked =
            store.admin_access() || std::env::args().any(|arg| arg == "--admin");
        let preferences = store.cookie_preferences();

        let mut app = ResponseViewer {
            is_dark_mode,
            preview: PreviewState::Unconfigured,
            status: SheetsStatus::Unknown,
            last_updated: None,
            refresh_deadline: None,
            jurisdiction: None,
            manual_jurisdiction: false,
            admin_unlocked,
            admin_panel_open: false,
            key_history: Vec::new(),
            reset_armed: false,
            url_input: config.sheets_url.clone(),
            interval_input: config.refresh_interval_minutes.to_string(),
            show_live_input: config.show_live_data,
            max_input: config.max_responses.to_string(),
            welcome_visible: !store.welcome_shown(),
            consent_visible: !store.cookie_accepted(),
            preferences_open: false,
            analytics_consent: preferences.get("Analytics Cookies").copied().unwrap_or(false),
            marketing_consent: preferences.get("Marketing Cookies").copied().unwrap_or(false),
            notifications: Vec::new(),
            config,
            store,
        };
        app.start_auto_refresh();
        app
    }

    fn notify(&mut self, message: impl Into<String>, level: NotificationLevel) {
        self.notifications.push(Notification::new(message, level));
    }

    /// No-op unless a URL is configured and live data is enabled. Overlapping
    /// fetches are allowed; the last response to resolve wins.
    fn load_data(&mut self) -> Command<Message> {
        if !self.config.is_configured() {
            self.preview = PreviewState::Unconfigured;
            return Command::none();
        }

        self.preview = PreviewState::Loading;
        let url = self.config.sheets_url.clone();

        Command::perform(
            async move {
                SheetsHandler::new()
                    .fetch_export(&url)
                    .await
                    .map_err(|err| err.to_string())
            },
            Message::DataLoaded,
        )
    }

    /// Cancel-then-schedule: the previous slot is always dropped before a new
    /// one is armed, so repeated saves cannot stack refreshes.
    fn start_auto_refresh(&mut self) {
        self.refresh_deadline = None;
        if self.config.refresh_interval_minutes > 0 {
            let interval = Duration::from_secs(self.config.refresh_interval_minutes as u64 * 60);
            self.refresh_deadline = Some(Instant::now() + interval);
        }
    }

    fn refill_form(&mut self) {
        self.url_input = self.config.sheets_url.clone();
        self.interval_input = self.config.refresh_interval_minutes.to_string();
        self.show_live_input = self.config.show_live_data;
        self.max_input = self.config.max_responses.to_string();
    }

    fn visible_rows<'a>(&self, data: &'a TableData) -> &'a [Vec<String>] {
        let count = visible_row_count(data.rows.len(), self.config.max_responses);
        &data.rows[..count]
    }

    fn current_code(&self) -> Option<JurisdictionCode> {
        self.jurisdiction.map(|jurisdiction| jurisdiction.code)
    }
}

fn visible_row_count(available: usize, max_responses: usize) -> usize {
    available.min(max_responses)
}

fn summary_lines(total: usize, shown: usize) -> (String, String) {
    (
        format!("{total} total responses"),
        format!("Showing latest {shown} entries"),
    )
}

/// Card order for the legal panel: the current jurisdiction moves to the
/// top, the rest keep their canonical order.
fn ordered_legal_cards(current: Option<JurisdictionCode>) -> Vec<JurisdictionCode> {
    let mut codes = JurisdictionCode::ALL.to_vec();
    if let Some(current) = current {
        codes.retain(|code| *code != current);
        codes.insert(0, current);
    }
    codes
}

impl Application for ResponseViewer {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ();

    fn new(_flags: ()) -> (Self, Command<Message>) {
        let mut app = ResponseViewer::with_store(Store::new());

        let signals = LocaleSignals::from_env();
        let resolve = Command::perform(
            async move { GeoHandler::new().resolve(&signals).await },
            Message::JurisdictionResolved,
        );
        let load = app.load_data();

        (app, Command::batch(vec![resolve, load]))
    }

    fn title(&self) -> String {
        String::from("Response Viewer")
    }

    fn theme(&self) -> Theme {
        if self.is_dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::Tick => {
                self.notifications
                    .retain(|notification| notification.created.elapsed() < NOTIFICATION_TTL);

                if let Some(deadline) = self.refresh_deadline {
                    if Instant::now() >= deadline {
                        self.start_auto_refresh();
                        return self.load_data();
                    }
                }
                Command::none()
            }

            Message::KeyPressed(key) => {
                self.key_history.push(key);
                if self.key_history.len() > ADMIN_SEQUENCE.len() {
                    self.key_history.remove(0);
                }

                if self.key_history == ADMIN_SEQUENCE {
                    self.admin_unlocked = true;
                    self.store.set_admin_access();
                    self.notify("Admin access enabled!", NotificationLevel::Success);
                }
                Command::none()
            }

            Message::ToggleTheme => {
                self.is_dark_mode = !self.is_dark_mode;
                let name = if self.is_dark_mode { "dark" } else { "light" };
                self.store.set_theme(name);
                // Integration point for embedded widgets that follow the theme.
                log::info!("theme changed to {name}");
                Command::none()
            }

            Message::JurisdictionResolved(jurisdiction) => {
                log::info!("jurisdiction resolved to {}", jurisdiction.code.tag());
                self.jurisdiction = Some(jurisdiction);
                self.manual_jurisdiction = false;
                Command::none()
            }

            Message::JurisdictionSelected(code) => {
                self.jurisdiction = Some(Jurisdiction::for_code(code));
                self.manual_jurisdiction = true;
                Command::none()
            }

            Message::LoadData => self.load_data(),

            Message::DataLoaded(result) => {
                match result {
                    Ok(data) => {
                        self.preview = PreviewState::Connected(data);
                        self.status = SheetsStatus::Connected;
                        self.last_updated = Some(Local::now());
                    }
                    Err(message) => {
                        log::warn!("loading sheet data failed: {message}");
                        self.preview = PreviewState::Disconnected(message);
                        self.status = SheetsStatus::Disconnected;
                    }
                }
                Command::none()
            }

            Message::OpenSheetsLink => {
                if self.config.sheets_url.is_empty() {
                    self.notify("No Google Sheets URL configured", NotificationLevel::Error);
                } else if let Err(err) = webbrowser::open(&self.config.sheets_url) {
                    self.notify(format!("Could not open browser: {err}"), NotificationLevel::Error);
                }
                Command::none()
            }

            Message::OpenAdminPanel => {
                self.refill_form();
                self.reset_armed = false;
                self.admin_panel_open = true;
                Command::none()
            }

            Message::CloseAdminPanel => {
                self.admin_panel_open = false;
                Command::none()
            }

            Message::UrlInputChanged(value) => {
                self.url_input = value;
                Command::none()
            }

            Message::IntervalInputChanged(value) => {
                self.interval_input = value;
                Command::none()
            }

            Message::ShowLiveDataToggled(value) => {
                self.show_live_input = value;
                Command::none()
            }

            Message::MaxResponsesChanged(value) => {
                self.max_input = value;
                Command::none()
            }

            Message::SaveSettings => {
                let url = self.url_input.trim().to_string();
                if !url.is_empty() && !SheetsHandler::is_valid_sheets_url(&url) {
                    self.notify(
                        "Please enter a valid Google Sheets URL",
                        NotificationLevel::Error,
                    );
                    return Command::none();
                }

                let config = SheetsConfig {
                    sheets_url: url,
                    refresh_interval_minutes: self.interval_input.trim().parse().unwrap_or(0),
                    show_live_data: self.show_live_input,
                    max_responses: self
                        .max_input
                        .trim()
                        .parse()
                        .ok()
                        .filter(|n| *n > 0)
                        .unwrap_or(config::DEFAULT_MAX_RESPONSES),
                };

                self.store.save_sheets_config(&config);
                self.config = config;
                self.start_auto_refresh();
                self.notify("Settings saved successfully!", NotificationLevel::Success);
                self.admin_panel_open = false;

                self.load_data()
            }

            Message::TestConnection => {
                let url = self.url_input.trim().to_string();
                if url.is_empty() {
                    self.notify(
                        "Please enter a Google Sheets URL first",
                        NotificationLevel::Error,
                    );
                    return Command::none();
                }
                if !SheetsHandler::is_valid_sheets_url(&url) {
                    self.notify("Invalid Google Sheets URL format", NotificationLevel::Error);
                    return Command::none();
                }

                self.notify("Testing...", NotificationLevel::Info);
                Command::perform(
                    async move {
                        SheetsHandler::new()
                            .test_connection(&url)
                            .await
                            .map_err(|err| err.to_string())
                    },
                    Message::ConnectionTested,
                )
            }

            Message::ConnectionTested(result) => {
                match result {
                    Ok(()) => self.notify("Connection successful!", NotificationLevel::Success),
                    Err(message) => {
                        self.notify(format!("Connection failed: {message}"), NotificationLevel::Error)
                    }
                }
                Command::none()
            }

            Message::ArmReset => {
                self.reset_armed = true;
                Command::none()
            }

            Message::CancelReset => {
                self.reset_armed = false;
                Command::none()
            }

            Message::ConfirmReset => {
                self.store.reset_sheets_config();
                self.config = SheetsConfig::default();
                self.refill_form();
                self.start_auto_refresh();
                self.preview = PreviewState::Unconfigured;
                self.reset_armed = false;
                self.notify("Settings reset to default", NotificationLevel::Success);
                Command::none()
            }

            Message::DismissWelcome => {
                self.welcome_visible = false;
                self.store.set_welcome_shown();
                Command::none()
            }

            Message::AcceptConsent => {
                self.consent_visible = false;
                self.store.set_cookie_accepted();
                Command::none()
            }

            Message::OpenPreferences => {
                self.preferences_open = true;
                Command::none()
            }

            Message::ClosePreferences => {
                self.preferences_open = false;
                Command::none()
            }

            Message::AnalyticsConsentToggled(value) => {
                self.analytics_consent = value;
                Command::none()
            }

            Message::MarketingConsentToggled(value) => {
                self.marketing_consent = value;
                Command::none()
            }

            Message::SavePreferences => {
                let mut preferences = BTreeMap::new();
                preferences.insert("Essential Cookies".to_string(), true);
                preferences.insert("Analytics Cookies".to_string(), self.analytics_consent);
                preferences.insert("Marketing Cookies".to_string(), self.marketing_consent);
                self.store.set_cookie_preferences(&preferences);

                self.preferences_open = false;
                self.consent_visible = false;
                self.store.set_cookie_accepted();
                self.notify(
                    "Cookie preferences saved successfully!",
                    NotificationLevel::Success,
                );
                Command::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch(vec![
            iced::time::every(TICK_INTERVAL).map(|_| Message::Tick),
            subscription::events_with(|event, _status| match event {
                Event::Keyboard(keyboard::Event::KeyPressed { key_code, .. }) => {
                    Some(Message::KeyPressed(key_code))
                }
                _ => None,
            }),
        ])
    }

    fn view(&self) -> Element<Message> {
        let styles = if self.is_dark_mode {
            &*DARK_THEME
        } else {
            &*LIGHT_THEME
        };

        if self.admin_panel_open {
            return self.admin_panel_view(styles);
        }
        if self.preferences_open {
            return self.preferences_view(styles);
        }

        let mut page = Column::new().spacing(16).padding(20);
        if self.welcome_visible {
            page = page.push(self.welcome_view(styles));
        }
        page = page
            .push(self.jurisdiction_view(styles))
            .push(self.preview_view(styles));

        let mut root = Column::new().push(scrollable(page).height(Length::Fill));
        for notification in &self.notifications {
            root = root.push(self.notification_view(notification, styles));
        }
        if self.consent_visible {
            root = root.push(self.consent_view(styles));
        }
        root = root.push(self.footer_view(styles));

        container(root)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(panel(styles.bg))
            .into()
    }
}

impl ResponseViewer {
    fn welcome_view(&self, styles: &Styles) -> Element<Message> {
        let banner = row![
            text("Welcome! This panel shows live survey responses and the privacy rules that apply to you.")
                .size(15)
                .style(styles.fg),
            Space::with_width(Length::Fill),
            button(text("Dismiss").size(14))
                .padding(8)
                .on_press(Message::DismissWelcome)
                .style(plain_button(styles)),
        ]
        .spacing(10)
        .align_items(Alignment::Center);

        container(banner)
            .padding(12)
            .width(Length::Fill)
            .style(panel(styles.panel_bg))
            .into()
    }

    fn jurisdiction_view(&self, styles: &Styles) -> Element<Message> {
        let (title, detail) = match &self.jurisdiction {
            Some(jurisdiction) => (
                format!("Your Location: {}", jurisdiction.name),
                format!(
                    "Based on your {}, {} Your highlighted section below shows the specific privacy rights and protections that apply to you.",
                    if self.manual_jurisdiction { "selection" } else { "location" },
                    jurisdiction.description
                ),
            ),
            None => (
                String::from("Detecting your location..."),
                String::from("Checking which privacy rules apply to you."),
            ),
        };

        let mut buttons = Row::new().spacing(8);
        for code in JurisdictionCode::ALL {
            let entry = Jurisdiction::for_code(code);
            let selected = self.current_code() == Some(code);
            buttons = buttons.push(
                button(text(entry.region).size(13))
                    .padding(8)
                    .on_press(Message::JurisdictionSelected(code))
                    .style(if selected {
                        accent_button(styles)
                    } else {
                        plain_button(styles)
                    }),
            );
        }

        let mut section = Column::new()
            .spacing(10)
            .push(text(title).size(22).style(styles.fg))
            .push(text(detail).size(15).style(styles.muted))
            .push(buttons);

        for code in ordered_legal_cards(self.current_code()) {
            section = section.push(self.legal_card_view(code, styles));
        }

        container(section)
            .padding(16)
            .width(Length::Fill)
            .style(panel(styles.panel_bg))
            .into()
    }

    fn legal_card_view(&self, code: JurisdictionCode, styles: &Styles) -> Element<Message> {
        let entry = Jurisdiction::for_code(code);
        let highlighted = self.current_code() == Some(code);

        let body = column![
            text(entry.name).size(17).style(styles.fg),
            text(entry.description).size(14).style(styles.muted),
        ]
        .spacing(4);

        container(body)
            .padding(12)
            .width(Length::Fill)
            .style(card_style(styles, highlighted))
            .into()
    }

    fn preview_view(&self, styles: &Styles) -> Element<Message> {
        let status_color = match self.status {
            SheetsStatus::Connected => styles.success,
            SheetsStatus::Disconnected => styles.error,
            SheetsStatus::Unknown => styles.muted,
        };

        let mut heading = Row::new()
            .spacing(10)
            .align_items(Alignment::Center)
            .push(text("Live Responses").size(22).style(styles.fg))
            .push(text(format!("● {}", self.status.label())).size(14).style(status_color))
            .push(Space::with_width(Length::Fill));

        if let Some(updated) = &self.last_updated {
            heading = heading.push(
                text(format!("Updated {}", updated.format("%H:%M:%S")))
                    .size(13)
                    .style(styles.muted),
            );
        }

        heading = heading
            .push(
                button(text("Refresh").size(14))
                    .padding(8)
                    .on_press(Message::LoadData)
                    .style(plain_button(styles)),
            )
            .push(
                button(text("View Sheet").size(14))
                    .padding(8)
                    .on_press(Message::OpenSheetsLink)
                    .style(plain_button(styles)),
            );

        let body: Element<Message> = match &self.preview {
            PreviewState::Unconfigured => {
                text("Live data is disabled. Configure a sheet in the admin panel.")
                    .size(15)
                    .style(styles.muted)
                    .into()
            }
            PreviewState::Loading => text("Loading latest responses...")
                .size(15)
                .style(styles.muted)
                .into(),
            PreviewState::Connected(data) => self.data_view(data, styles),
            PreviewState::Disconnected(message) => column![
                text(format!("Error loading data: {message}"))
                    .size(15)
                    .style(styles.error),
                button(text("Retry").size(14))
                    .padding(8)
                    .on_press(Message::LoadData)
                    .style(accent_button(styles)),
            ]
            .spacing(8)
            .into(),
        };

        container(column![heading, body].spacing(12))
            .padding(16)
            .width(Length::Fill)
            .style(panel(styles.panel_bg))
            .into()
    }

    fn data_view(&self, data: &TableData, styles: &Styles) -> Element<Message> {
        if data.is_empty() {
            return text("No responses yet").size(15).style(styles.muted).into();
        }

        let shown = visible_row_count(data.rows.len(), self.config.max_responses);
        let (total_line, shown_line) = summary_lines(data.rows.len(), shown);

        let summary = column![
            text(total_line).size(14).style(styles.fg),
            text(shown_line).size(13).style(styles.muted),
        ]
        .spacing(2);

        let header_row = Row::with_children(
            data.headers
                .iter()
                .map(|header| {
                    container(text(header).size(15).style(styles.header_fg))
                        .width(Length::Fixed(140.0))
                        .padding(6)
                        .style(panel(styles.header_bg))
                        .into()
                })
                .collect(),
        )
        .spacing(1);

        let mut body = Column::new().spacing(1);
        for row_data in self.visible_rows(data) {
            body = body.push(
                Row::with_children(
                    row_data
                        .iter()
                        .map(|cell| {
                            let content = if cell.is_empty() { "-" } else { cell.as_str() };
                            container(text(content).size(14).style(styles.fg))
                                .width(Length::Fixed(140.0))
                                .padding(6)
                                .into()
                        })
                        .collect(),
                )
                .spacing(1),
            );
        }

        column![summary, header_row, body].spacing(10).into()
    }

    fn consent_view(&self, styles: &Styles) -> Element<Message> {
        let banner = row![
            text("We store your settings locally and only use optional analytics with your consent.")
                .size(14)
                .style(styles.footer_fg),
            Space::with_width(Length::Fill),
            button(text("Accept").size(14))
                .padding(8)
                .on_press(Message::AcceptConsent)
                .style(accent_button(styles)),
            button(text("Preferences").size(14))
                .padding(8)
                .on_press(Message::OpenPreferences)
                .style(plain_button(styles)),
        ]
        .spacing(10)
        .padding(10)
        .align_items(Alignment::Center);

        container(banner)
            .width(Length::Fill)
            .style(panel(styles.header_bg))
            .into()
    }

    fn preferences_view(&self, styles: &Styles) -> Element<Message> {
        let dialog = column![
            text("Privacy Preferences").size(24).style(styles.fg),
            text("Essential Cookies (always on)").size(15).style(styles.muted),
            checkbox(
                "Analytics Cookies",
                self.analytics_consent,
                Message::AnalyticsConsentToggled
            ),
            checkbox(
                "Marketing Cookies",
                self.marketing_consent,
                Message::MarketingConsentToggled
            ),
            row![
                button(text("Save").size(15))
                    .padding(10)
                    .on_press(Message::SavePreferences)
                    .style(accent_button(styles)),
                button(text("Cancel").size(15))
                    .padding(10)
                    .on_press(Message::ClosePreferences)
                    .style(plain_button(styles)),
            ]
            .spacing(10),
        ]
        .spacing(12)
        .padding(20)
        .width(Length::Fixed(420.0));

        container(container(dialog).style(panel(styles.panel_bg)))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .style(panel(styles.bg))
            .into()
    }

    fn admin_panel_view(&self, styles: &Styles) -> Element<Message> {
        let mut dialog = Column::new()
            .spacing(10)
            .padding(20)
            .width(Length::Fixed(480.0))
            .push(text("Live Data Settings").size(24).style(styles.fg))
            .push(text("Google Sheets URL:").size(15).style(styles.fg))
            .push(
                text_input(
                    "https://docs.google.com/spreadsheets/d/...",
                    &self.url_input,
                )
                .padding(10)
                .on_input(Message::UrlInputChanged),
            )
            .push(
                text("Refresh interval in minutes (0 disables auto-refresh):")
                    .size(15)
                    .style(styles.fg),
            )
            .push(
                text_input("5", &self.interval_input)
                    .padding(10)
                    .on_input(Message::IntervalInputChanged),
            )
            .push(checkbox(
                "Show live data",
                self.show_live_input,
                Message::ShowLiveDataToggled,
            ))
            .push(text("Responses shown in the preview:").size(15).style(styles.fg))
            .push(
                text_input("10", &self.max_input)
                    .padding(10)
                    .on_input(Message::MaxResponsesChanged),
            )
            .push(
                row![
                    button(text("Save").size(15))
                        .padding(10)
                        .on_press(Message::SaveSettings)
                        .style(accent_button(styles)),
                    button(text("Test connection").size(15))
                        .padding(10)
                        .on_press(Message::TestConnection)
                        .style(plain_button(styles)),
                    button(text("Close").size(15))
                        .padding(10)
                        .on_press(Message::CloseAdminPanel)
                        .style(plain_button(styles)),
                ]
                .spacing(10),
            );

        if self.reset_armed {
            dialog = dialog.push(
                row![
                    text("Reset all settings to default?").size(15).style(styles.error),
                    button(text("Confirm").size(14))
                        .padding(8)
                        .on_press(Message::ConfirmReset)
                        .style(accent_button(styles)),
                    button(text("Cancel").size(14))
                        .padding(8)
                        .on_press(Message::CancelReset)
                        .style(plain_button(styles)),
                ]
                .spacing(10)
                .align_items(Alignment::Center),
            );
        } else {
            dialog = dialog.push(
                button(text("Reset to defaults").size(14))
                    .padding(8)
                    .on_press(Message::ArmReset)
                    .style(plain_button(styles)),
            );
        }

        for notification in &self.notifications {
            dialog = dialog.push(self.notification_view(notification, styles));
        }

        container(container(dialog).style(panel(styles.panel_bg)))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .style(panel(styles.bg))
            .into()
    }

    fn notification_view(&self, notification: &Notification, styles: &Styles) -> Element<Message> {
        let color = match notification.level {
            NotificationLevel::Success => styles.success,
            NotificationLevel::Error => styles.error,
            NotificationLevel::Info => styles.accent,
        };

        container(text(&notification.message).size(14).style(color))
            .padding(8)
            .width(Length::Fill)
            .style(panel(styles.panel_bg))
            .into()
    }

    fn footer_view(&self, styles: &Styles) -> Element<Message> {
        let mut footer = Row::new()
            .spacing(8)
            .padding(10)
            .align_items(Alignment::Center)
            .push(
                text(format!("Response Viewer v{}", env!("CARGO_PKG_VERSION")))
                    .size(13)
                    .style(styles.footer_fg),
            )
            .push(Space::with_width(Length::Fill));

        if self.admin_unlocked {
            footer = footer.push(
                button(text("Admin").size(14))
                    .padding(8)
                    .on_press(Message::OpenAdminPanel)
                    .style(footer_button(styles)),
            );
        }

        footer = footer.push(
            button(text(if self.is_dark_mode { "Light" } else { "Dark" }).size(14))
                .padding(8)
                .on_press(Message::ToggleTheme)
                .style(footer_button(styles)),
        );

        container(footer)
            .width(Length::Fill)
            .style(panel(styles.footer_bg))
            .into()
    }
}

// Custom styles for containers and buttons

fn panel(bg: Color) -> theme::Container {
    theme::Container::Custom(Box::new(ContainerStyle { bg }))
}

fn card_style(styles: &Styles, highlighted: bool) -> theme::Container {
    theme::Container::Custom(Box::new(CardStyle {
        bg: styles.bg,
        border: if highlighted { styles.accent } else { Color::TRANSPARENT },
        border_width: if highlighted { 2.0 } else { 0.0 },
    }))
}

fn accent_button(styles: &Styles) -> theme::Button {
    theme::Button::Custom(Box::new(ButtonStyle {
        bg: styles.accent,
        fg: Color::WHITE,
        hover_bg: styles.footer_bg,
    }))
}

fn plain_button(styles: &Styles) -> theme::Button {
    theme::Button::Custom(Box::new(ButtonStyle {
        bg: styles.header_bg,
        fg: styles.fg,
        hover_bg: styles.accent,
    }))
}

fn footer_button(styles: &Styles) -> theme::Button {
    theme::Button::Custom(Box::new(ButtonStyle {
        bg: styles.footer_bg,
        fg: styles.footer_fg,
        hover_bg: Color::from_rgb(0.0, 0.26, 0.5),
    }))
}

struct ContainerStyle {
    bg: Color,
}

impl container::StyleSheet for ContainerStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            text_color: None,
            background: Some(Background::Color(self.bg)),
            border_radius: 6.0.into(),
            border_width: 0.0,
            border_color: Color::TRANSPARENT,
        }
    }
}

struct CardStyle {
    bg: Color,
    border: Color,
    border_width: f32,
}

impl container::StyleSheet for CardStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            text_color: None,
            background: Some(Background::Color(self.bg)),
            border_radius: 8.0.into(),
            border_width: self.border_width,
            border_color: self.border,
        }
    }
}

struct ButtonStyle {
    bg: Color,
    fg: Color,
    hover_bg: Color,
}

impl button::StyleSheet for ButtonStyle {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        button::Appearance {
            shadow_offset: Vector::new(0.0, 0.0),
            background: Some(Background::Color(self.bg)),
            border_radius: 4.0.into(),
            border_width: 0.0,
            border_color: Color::TRANSPARENT,
            text_color: self.fg,
        }
    }

    fn hovered(&self, style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(Background::Color(self.hover_bg)),
            ..self.active(style)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
        dir.path().join("settings.json")
    }

    fn test_app(dir: &tempfile::TempDir) -> ResponseViewer {
        ResponseViewer::with_store(Store::at(store_path(dir)))
    }

    fn sample_table(rows: usize) -> TableData {
        TableData {
            headers: vec!["name".to_string(), "answer".to_string()],
            rows: (0..rows)
                .map(|i| vec![format!("user{i}"), "yes".to_string()])
                .collect(),
        }
    }

    fn configured() -> SheetsConfig {
        SheetsConfig {
            sheets_url: "https://docs.google.com/spreadsheets/d/abc123/edit".to_string(),
            ..SheetsConfig::default()
        }
    }

    #[test]
    fn preview_caps_rows_at_max_responses() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.config.max_responses = 2;

        let data = sample_table(5);
        assert_eq!(app.visible_rows(&data).len(), 2);

        let shown = visible_row_count(data.rows.len(), app.config.max_responses);
        let (total_line, shown_line) = summary_lines(data.rows.len(), shown);
        assert_eq!(total_line, "5 total responses");
        assert_eq!(shown_line, "Showing latest 2 entries");
    }

    #[test]
    fn short_tables_show_everything() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        let data = sample_table(3);
        assert_eq!(app.visible_rows(&data).len(), 3);
        assert_eq!(summary_lines(3, 3).1, "Showing latest 3 entries");
    }

    #[test]
    fn starting_auto_refresh_twice_keeps_one_slot() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.config = configured();

        app.start_auto_refresh();
        let first = app.refresh_deadline.expect("deadline armed");
        app.start_auto_refresh();
        let second = app.refresh_deadline.expect("deadline re-armed");

        assert!(second >= first);
    }

    #[test]
    fn zero_interval_disables_auto_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.config = SheetsConfig {
            refresh_interval_minutes: 0,
            ..configured()
        };
        app.start_auto_refresh();
        assert!(app.refresh_deadline.is_none());
    }

    #[test]
    fn save_with_invalid_url_rejects_and_keeps_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        let valid = configured();
        app.store.save_sheets_config(&valid);
        app.config = valid.clone();

        app.url_input = "not-a-sheet-url".to_string();
        let _ = app.update(Message::SaveSettings);

        assert_eq!(app.config, valid);
        assert_eq!(Store::at(store_path(&dir)).sheets_config(), valid);
        assert!(app
            .notifications
            .iter()
            .any(|n| n.level == NotificationLevel::Error));
    }

    #[test]
    fn save_settings_persists_and_restarts_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        app.url_input = "https://docs.google.com/spreadsheets/d/abc123/edit".to_string();
        app.interval_input = "2".to_string();
        app.max_input = "7".to_string();
        app.show_live_input = true;
        let _ = app.update(Message::SaveSettings);

        assert_eq!(app.config.refresh_interval_minutes, 2);
        assert_eq!(app.config.max_responses, 7);
        assert!(app.refresh_deadline.is_some());
        assert!(matches!(app.preview, PreviewState::Loading));
        assert!(!app.admin_panel_open);

        let persisted = Store::at(store_path(&dir)).sheets_config();
        assert_eq!(persisted, app.config);
    }

    #[test]
    fn empty_url_saves_and_disables_live_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        app.url_input = String::new();
        let _ = app.update(Message::SaveSettings);

        assert!(app.config.sheets_url.is_empty());
        assert!(matches!(app.preview, PreviewState::Unconfigured));
    }

    #[test]
    fn reset_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        let valid = configured();
        app.store.save_sheets_config(&valid);
        app.config = valid.clone();

        let _ = app.update(Message::ArmReset);
        assert!(app.reset_armed);
        assert_eq!(app.config, valid);

        let _ = app.update(Message::ConfirmReset);
        assert_eq!(app.config, SheetsConfig::default());
        assert_eq!(
            Store::at(store_path(&dir)).sheets_config(),
            SheetsConfig::default()
        );
        assert_eq!(app.url_input, "");
        assert!(!app.reset_armed);
    }

    #[test]
    fn fetch_results_drive_preview_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.config = configured();

        let _ = app.update(Message::DataLoaded(Ok(sample_table(1))));
        assert!(matches!(app.preview, PreviewState::Connected(_)));
        assert_eq!(app.status, SheetsStatus::Connected);
        assert!(app.last_updated.is_some());

        let _ = app.update(Message::DataLoaded(Err("Failed to fetch data".to_string())));
        assert!(matches!(app.preview, PreviewState::Disconnected(_)));
        assert_eq!(app.status, SheetsStatus::Disconnected);
    }

    #[test]
    fn unconfigured_preview_never_loads() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        let _ = app.update(Message::LoadData);
        assert!(matches!(app.preview, PreviewState::Unconfigured));
    }

    #[test]
    fn admin_sequence_unlocks_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        assert!(!app.admin_unlocked);

        // A stray key first; only the last ten keystrokes count.
        let _ = app.update(Message::KeyPressed(KeyCode::X));
        for key in ADMIN_SEQUENCE {
            let _ = app.update(Message::KeyPressed(key));
        }

        assert!(app.admin_unlocked);
        assert!(Store::at(store_path(&dir)).admin_access());
    }

    #[test]
    fn wrong_key_order_does_not_unlock() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        for key in [
            KeyCode::Up,
            KeyCode::Down,
            KeyCode::Up,
            KeyCode::Down,
            KeyCode::Left,
            KeyCode::Right,
            KeyCode::Left,
            KeyCode::Right,
            KeyCode::B,
            KeyCode::A,
        ] {
            let _ = app.update(Message::KeyPressed(key));
        }

        assert!(!app.admin_unlocked);
    }

    #[test]
    fn manual_override_replaces_detection() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        let _ = app.update(Message::JurisdictionResolved(Jurisdiction::for_code(
            JurisdictionCode::Eu,
        )));
        assert!(!app.manual_jurisdiction);

        let _ = app.update(Message::JurisdictionSelected(JurisdictionCode::Au));
        let selected = app.jurisdiction.expect("jurisdiction set");
        assert_eq!(selected.code, JurisdictionCode::Au);
        assert_eq!(selected.name, "Australia");
        assert!(app.manual_jurisdiction);
    }

    #[test]
    fn current_jurisdiction_card_is_first() {
        let cards = ordered_legal_cards(Some(JurisdictionCode::Au));
        assert_eq!(cards.len(), 7);
        assert_eq!(cards[0], JurisdictionCode::Au);

        let unordered = ordered_legal_cards(None);
        assert_eq!(unordered, JurisdictionCode::ALL.to_vec());
    }

    #[test]
    fn theme_toggle_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        assert!(app.is_dark_mode);

        let _ = app.update(Message::ToggleTheme);
        assert!(!app.is_dark_mode);
        assert_eq!(Store::at(store_path(&dir)).theme(), Some("light"));
    }

    #[test]
    fn stale_notifications_are_pruned_on_tick() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        if let Some(past) = Instant::now().checked_sub(Duration::from_secs(4)) {
            app.notifications.push(Notification {
                message: "old".to_string(),
                level: NotificationLevel::Info,
                created: past,
            });
            let _ = app.update(Message::Tick);
            assert!(app.notifications.is_empty());
        }
    }

    #[test]
    fn startup_honors_persisted_flags() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = Store::at(store_path(&dir));
            store.set_admin_access();
            store.set_theme("light");
            store.set_welcome_shown();
            store.set_cookie_accepted();
        }

        let app = test_app(&dir);
        assert!(app.admin_unlocked);
        assert!(!app.is_dark_mode);
        assert!(!app.welcome_visible);
        assert!(!app.consent_visible);
    }

    #[test]
    fn saving_preferences_marks_consent_given() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.analytics_consent = true;

        let _ = app.update(Message::SavePreferences);

        let store = Store::at(store_path(&dir));
        let preferences = store.cookie_preferences();
        assert_eq!(preferences.get("Essential Cookies"), Some(&true));
        assert_eq!(preferences.get("Analytics Cookies"), Some(&true));
        assert_eq!(preferences.get("Marketing Cookies"), Some(&false));
        assert!(store.cookie_accepted());
        assert!(!app.consent_visible);
    }
}

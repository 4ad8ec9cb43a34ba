// src/ui.rs
use iced::Color;
use once_cell::sync::Lazy;

#[derive(Clone)]
pub struct Styles {
    pub bg: Color,
    pub fg: Color,
    pub panel_bg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub footer_bg: Color,
    pub footer_fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub success: Color,
    pub error: Color,
}

pub static DARK_THEME: Lazy<Styles> = Lazy::new(|| Styles {
    bg: Color::from_rgb(0.07, 0.07, 0.09),
    fg: Color::from_rgb(0.95, 0.95, 0.95),
    panel_bg: Color::from_rgb(0.12, 0.12, 0.15),
    header_bg: Color::from_rgb(0.2, 0.2, 0.24),
    header_fg: Color::from_rgb(1.0, 1.0, 1.0),
    footer_bg: Color::from_rgb(0.0078, 0.325, 0.6118), // #02539c
    footer_fg: Color::from_rgb(1.0, 1.0, 1.0),
    accent: Color::from_rgb(0.25, 0.55, 0.95),
    muted: Color::from_rgb(0.6, 0.6, 0.65),
    success: Color::from_rgb(0.2, 0.7, 0.35),
    error: Color::from_rgb(0.85, 0.3, 0.3),
});

pub static LIGHT_THEME: Lazy<Styles> = Lazy::new(|| Styles {
    bg: Color::from_rgb(1.0, 1.0, 1.0),
    fg: Color::from_rgb(0.1, 0.1, 0.1),
    panel_bg: Color::from_rgb(0.96, 0.96, 0.97),
    header_bg: Color::from_rgb(0.8784, 0.8784, 0.8784), // #e0e0e0
    header_fg: Color::from_rgb(0.0, 0.0, 0.0),
    footer_bg: Color::from_rgb(0.0078, 0.325, 0.6118), // #02539c
    footer_fg: Color::from_rgb(1.0, 1.0, 1.0),
    accent: Color::from_rgb(0.1, 0.4, 0.8),
    muted: Color::from_rgb(0.45, 0.45, 0.5),
    success: Color::from_rgb(0.1, 0.55, 0.25),
    error: Color::from_rgb(0.75, 0.2, 0.2),
});

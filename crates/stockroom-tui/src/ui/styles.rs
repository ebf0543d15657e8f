//! Console palette. Every widget takes its colors from here.

use ratatui::style::{Color, Modifier, Style};

// Palette
pub const BRAND: Color = Color::Rgb(72, 144, 176);
pub const OK: Color = Color::Rgb(104, 168, 104);
pub const WARN: Color = Color::Rgb(216, 160, 56);
pub const DANGER: Color = Color::Rgb(200, 72, 72);
pub const DIM: Color = Color::Rgb(124, 128, 136);
pub const TEXT: Color = Color::Rgb(224, 224, 224);
pub const SELECTION_BG: Color = Color::Rgb(40, 52, 64);
pub const STATUS_BG: Color = Color::Rgb(28, 32, 40);

pub fn title_style() -> Style {
    Style::default().fg(BRAND).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(SELECTION_BG).fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn muted_style() -> Style {
    Style::default().fg(DIM)
}

pub fn highlight_style() -> Style {
    Style::default().fg(WARN)
}

pub fn success_style() -> Style {
    Style::default().fg(OK)
}

pub fn error_style() -> Style {
    Style::default().fg(DANGER)
}

/// Rows whose quantity is under the low-stock threshold
pub fn low_stock_style() -> Style {
    Style::default().fg(WARN).add_modifier(Modifier::BOLD)
}

pub fn tab_style(selected: bool) -> Style {
    match selected {
        true => title_style().add_modifier(Modifier::UNDERLINED),
        false => list_item_style(),
    }
}

pub fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { BRAND } else { DIM })
}

pub fn search_style() -> Style {
    Style::default().fg(WARN).add_modifier(Modifier::ITALIC)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(STATUS_BG).fg(TEXT)
}

pub fn help_key_style() -> Style {
    Style::default().fg(WARN).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    list_item_style()
}

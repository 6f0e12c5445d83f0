//! Theme system for the TUI.
//!
//! `ThemeVariant` selects between Dark and Light palettes; `ColorPalette`
//! maps each semantic UI role to a ratatui `Style`.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants. Light is used until the viewer picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    Dark,
    #[default]
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Flip between the two variants.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// Value written to the preferences file.
    pub fn as_pref_value(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Cards --
    pub card_title: Style,
    pub card_date: Style,
    pub card_excerpt: Style,
    pub card_border: Style,
    pub card_border_selected: Style,

    // -- Topics --
    pub topic_normal: Style,
    pub topic_selected: Style,
    pub topic_cursor: Style,
    pub clear_selection: Style,

    // -- Notices --
    pub notice_error: Style,
    pub notice_empty: Style,
    pub loading: Style,

    // -- Chrome --
    pub background: Style,
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            card_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            card_date: Style::default().fg(Color::Gray),
            card_excerpt: Style::default().fg(Color::Gray),
            card_border: Style::default().fg(Color::DarkGray),
            card_border_selected: Style::default().fg(Color::Cyan),

            topic_normal: Style::default().fg(Color::Cyan),
            topic_selected: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            topic_cursor: Style::default().add_modifier(Modifier::REVERSED),
            clear_selection: Style::default().fg(Color::Yellow),

            notice_error: Style::default().fg(Color::Red),
            notice_empty: Style::default().fg(Color::Gray),
            loading: Style::default().fg(Color::Yellow),

            background: Style::default().bg(Color::Black).fg(Color::White),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Cyan),
        }
    }

    fn light() -> Self {
        Self {
            card_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            card_date: Style::default().fg(Color::DarkGray),
            card_excerpt: Style::default().fg(Color::DarkGray),
            card_border: Style::default().fg(Color::Gray),
            card_border_selected: Style::default().fg(Color::Blue),

            topic_normal: Style::default().fg(Color::Blue),
            topic_selected: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            topic_cursor: Style::default().add_modifier(Modifier::REVERSED),
            clear_selection: Style::default().fg(Color::Magenta),

            notice_error: Style::default().fg(Color::Red),
            notice_empty: Style::default().fg(Color::DarkGray),
            loading: Style::default().fg(Color::Magenta),

            background: Style::default().bg(Color::White).fg(Color::Black),
            status_bar: Style::default().bg(Color::Gray).fg(Color::Black),
            panel_border: Style::default().fg(Color::Gray),
            panel_border_focused: Style::default().fg(Color::Blue),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_variant_is_light() {
        assert_eq!(ThemeVariant::default(), ThemeVariant::Light);
    }

    #[test]
    fn next_flips_variant() {
        assert_eq!(ThemeVariant::Dark.next(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.next(), ThemeVariant::Dark);
    }

    #[test]
    fn pref_value_parses_back() {
        for variant in [ThemeVariant::Dark, ThemeVariant::Light] {
            assert_eq!(
                ThemeVariant::from_str_name(variant.as_pref_value()),
                Some(variant)
            );
        }
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(
            ThemeVariant::from_str_name("Light"),
            Some(ThemeVariant::Light)
        );
        assert_eq!(
            ThemeVariant::from_str_name("DARK"),
            Some(ThemeVariant::Dark)
        );
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn palettes_differ_on_selection() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.topic_selected, light.topic_selected);
        assert_ne!(dark.background, light.background);
    }

    #[test]
    fn error_notice_is_red_in_both() {
        for variant in [ThemeVariant::Dark, ThemeVariant::Light] {
            assert_eq!(
                variant.palette().notice_error,
                Style::default().fg(Color::Red)
            );
        }
    }
}

//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are data-driven so users can rebind any action from the
//! `[keybindings]` table of config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NavLeft,
    NavRight,
    PageDown,
    PageUp,
    JumpTop,
    JumpBottom,
    CycleFocus,
    Back,
    OpenInBrowser,
    ToggleFilters,
    ToggleTopic,
    FilterByCardTopic,
    ClearTopics,
    ToggleTheme,
    ShowInfo,
}

impl Action {
    /// Human-readable description for the info overlay.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::NavDown => "Move down",
            Self::NavUp => "Move up",
            Self::NavLeft => "Move left",
            Self::NavRight => "Move right",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::JumpTop => "Jump to first card",
            Self::JumpBottom => "Jump to last card",
            Self::CycleFocus => "Switch between cards and topics",
            Self::Back => "Go back / dismiss",
            Self::OpenInBrowser => "Open article in browser",
            Self::ToggleFilters => "Show or hide topic filters",
            Self::ToggleTopic => "Select or deselect topic",
            Self::FilterByCardTopic => "Filter by the card's first topic",
            Self::ClearTopics => "Clear topic selection",
            Self::ToggleTheme => "Toggle dark/light theme",
            Self::ShowInfo => "Show keys and page info",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context; determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Cards,
    Topics,
    Info,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "PageDown", "Home"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then_some(KeySpec::ctrl(c));
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|rest| rest.parse::<u8>().ok())
    {
        return (1..=12)
            .contains(&n)
            .then_some(KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars
        .next()
        .is_none()
        .then_some(KeySpec::plain(KeyCode::Char(c)))
}

/// Format a KeySpec as a human-readable string for the info overlay.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; lookups
/// fall back to [`Context::Global`].
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the info overlay
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    /// Create a registry with the default bindings.
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Action::*;
        use KeyCode::{Char, Down, End, Enter, Esc, Home, Left, PageDown as PgDn, PageUp as PgUp, Right, Tab, Up};

        let global = [
            (KeySpec::plain(Char('q')), Quit),
            (KeySpec::ctrl('c'), Quit),
            (KeySpec::plain(Char('j')), NavDown),
            (KeySpec::plain(Down), NavDown),
            (KeySpec::plain(Char('k')), NavUp),
            (KeySpec::plain(Up), NavUp),
            (KeySpec::plain(Char('h')), NavLeft),
            (KeySpec::plain(Left), NavLeft),
            (KeySpec::plain(Char('l')), NavRight),
            (KeySpec::plain(Right), NavRight),
            (KeySpec::ctrl('d'), PageDown),
            (KeySpec::plain(PgDn), PageDown),
            (KeySpec::ctrl('u'), PageUp),
            (KeySpec::plain(PgUp), PageUp),
            (KeySpec::plain(Char('g')), JumpTop),
            (KeySpec::plain(Home), JumpTop),
            (KeySpec::plain(Char('G')), JumpBottom),
            (KeySpec::plain(End), JumpBottom),
            (KeySpec::plain(Tab), CycleFocus),
            (KeySpec::plain(Esc), Back),
            (KeySpec::plain(Char('f')), ToggleFilters),
            (KeySpec::plain(Char('c')), ClearTopics),
            (KeySpec::plain(Char('T')), ToggleTheme),
            (KeySpec::plain(Char('?')), ShowInfo),
            (KeySpec::plain(Char('o')), OpenInBrowser),
        ];
        for (key, action) in global {
            self.bind(Context::Global, key, action);
        }

        self.bind(Context::Cards, KeySpec::plain(Enter), OpenInBrowser);
        self.bind(Context::Cards, KeySpec::plain(Char('t')), FilterByCardTopic);

        self.bind(Context::Topics, KeySpec::plain(Enter), ToggleTopic);
        self.bind(Context::Topics, KeySpec::plain(Char(' ')), ToggleTopic);

        // Any of these closes the overlay
        self.bind(Context::Info, KeySpec::plain(Esc), Back);
        self.bind(Context::Info, KeySpec::plain(Char('?')), Back);
        self.bind(Context::Info, KeySpec::plain(Char('q')), Back);
    }

    /// Apply user overrides from the config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "toggle_theme").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). Every existing
    /// binding of an overridden action is replaced, in the same contexts.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        // Sorted for deterministic results when two overrides collide
        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();

        for (action_name, key_str) in entries {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, _) in self.bindings.iter().filter(|(_, _, a)| *a == action) {
                if !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a key, trying `context` first, then Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        // The overlay swallows everything it does not bind
        if context == Context::Info {
            return None;
        }

        self.lookup.get(&(Context::Global, key)).copied()
    }

    /// All bindings as (context, key display string, action, description).
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "nav_left" | "left" => Some(Action::NavLeft),
        "nav_right" | "right" => Some(Action::NavRight),
        "page_down" | "pagedown" => Some(Action::PageDown),
        "page_up" | "pageup" => Some(Action::PageUp),
        "jump_top" | "top" => Some(Action::JumpTop),
        "jump_bottom" | "bottom" => Some(Action::JumpBottom),
        "cycle_focus" | "focus" => Some(Action::CycleFocus),
        "back" => Some(Action::Back),
        "open_in_browser" | "open" => Some(Action::OpenInBrowser),
        "toggle_filters" | "filters" => Some(Action::ToggleFilters),
        "toggle_topic" | "topic" => Some(Action::ToggleTopic),
        "filter_by_card_topic" | "card_topic" => Some(Action::FilterByCardTopic),
        "clear_topics" | "clear" => Some(Action::ClearTopics),
        "toggle_theme" | "theme" => Some(Action::ToggleTheme),
        "show_info" | "info" | "help" => Some(Action::ShowInfo),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_quit() {
        let reg = KeybindingRegistry::new();
        let action = reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Global);
        assert_eq!(action, Some(Action::Quit));
    }

    #[test]
    fn test_context_falls_back_to_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('j'), KeyModifiers::NONE, Context::Topics),
            Some(Action::NavDown)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('T'), KeyModifiers::NONE, Context::Cards),
            Some(Action::ToggleTheme)
        );
    }

    #[test]
    fn test_enter_depends_on_context() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Cards),
            Some(Action::OpenInBrowser)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Topics),
            Some(Action::ToggleTopic)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Global),
            None
        );
    }

    #[test]
    fn test_info_overlay_swallows_other_keys() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Info),
            Some(Action::Back)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('j'), KeyModifiers::NONE, Context::Info),
            None
        );
    }

    #[test]
    fn test_ctrl_modifiers() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('d'), KeyModifiers::CONTROL, Context::Cards),
            Some(Action::PageDown)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('c'), KeyModifiers::CONTROL, Context::Cards),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("toggle_theme".to_string(), "F2".to_string())]);

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(
            reg.action_for_key(KeyCode::Char('T'), KeyModifiers::NONE, Context::Global),
            None
        );
        assert_eq!(
            reg.action_for_key(KeyCode::F(2), KeyModifiers::NONE, Context::Global),
            Some(Action::ToggleTheme)
        );
    }

    #[test]
    fn test_override_preserves_contexts() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("toggle_topic".to_string(), "x".to_string())]);
        assert!(reg.apply_overrides(&overrides).is_empty());

        assert_eq!(
            reg.action_for_key(KeyCode::Char('x'), KeyModifiers::NONE, Context::Topics),
            Some(Action::ToggleTopic)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char(' '), KeyModifiers::NONE, Context::Topics),
            None
        );
        // Still scoped to the topics panel
        assert_eq!(
            reg.action_for_key(KeyCode::Char('x'), KeyModifiers::NONE, Context::Cards),
            None
        );
    }

    #[test]
    fn test_apply_overrides_unknown_action() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("refresh".to_string(), "r".to_string())]);

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unknown action"));
    }

    #[test]
    fn test_apply_overrides_bad_key() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("quit".to_string(), "Ctrl+Alt+Q".to_string())]);

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Cannot parse key"));
    }

    #[test]
    fn test_parse_key_string_named_keys() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(
            parse_key_string("PageDown"),
            Some(KeySpec::plain(KeyCode::PageDown))
        );
        assert_eq!(
            parse_key_string("space"),
            Some(KeySpec::plain(KeyCode::Char(' ')))
        );
    }

    #[test]
    fn test_parse_key_string_function_keys() {
        assert_eq!(parse_key_string("F1"), Some(KeySpec::plain(KeyCode::F(1))));
        assert_eq!(parse_key_string("f12"), Some(KeySpec::plain(KeyCode::F(12))));
        assert_eq!(parse_key_string("F0"), None);
        assert_eq!(parse_key_string("F13"), None);
    }

    #[test]
    fn test_parse_key_string_single_char() {
        assert_eq!(parse_key_string("q"), Some(KeySpec::plain(KeyCode::Char('q'))));
        assert_eq!(parse_key_string("F"), Some(KeySpec::plain(KeyCode::Char('F'))));
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(parse_key_string("qq"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char('q'))), "q");
        assert_eq!(format_key(&KeySpec::ctrl('d')), "Ctrl+d");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char(' '))), "Space");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }

    #[test]
    fn test_every_action_has_a_default_binding() {
        let reg = KeybindingRegistry::new();
        let bound: Vec<Action> = reg.all_bindings().iter().map(|(_, _, a, _)| *a).collect();
        for action in [
            Action::Quit,
            Action::PageDown,
            Action::ToggleFilters,
            Action::ToggleTopic,
            Action::FilterByCardTopic,
            Action::ClearTopics,
            Action::ToggleTheme,
            Action::OpenInBrowser,
            Action::ShowInfo,
        ] {
            assert!(bound.contains(&action), "{action:?} has no binding");
        }
    }
}

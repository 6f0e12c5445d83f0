//! Input handling for the TUI.
//!
//! Keys are resolved through the keybinding registry for the current
//! context, then dispatched on the resulting action.

use crate::app::{App, Focus};
use crate::keybindings::Action as KbAction;
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let context = app.input_context();
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };

    if app.show_info {
        if action == KbAction::Back {
            app.show_info = false;
        }
        return Action::Continue;
    }

    match app.focus {
        Focus::Topics => handle_topics_action(app, action),
        Focus::Cards => handle_cards_action(app, action),
    }
}

/// Actions that behave the same whichever panel has focus.
fn handle_common_action(app: &mut App, action: KbAction) -> Action {
    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::PageDown => app.page(true),
        KbAction::PageUp => app.page(false),
        KbAction::JumpTop => app.select_first(),
        KbAction::JumpBottom => app.select_last(),
        KbAction::CycleFocus => app.cycle_focus(),
        KbAction::ToggleFilters => app.toggle_filters(),
        KbAction::ClearTopics => app.clear_topics(),
        KbAction::ToggleTheme => app.toggle_theme(),
        KbAction::OpenInBrowser => app.open_selected(),
        KbAction::ShowInfo => app.show_info = true,
        KbAction::Back => {
            if app.filters_visible {
                app.toggle_filters();
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_cards_action(app: &mut App, action: KbAction) -> Action {
    let columns = app.layout().columns as isize;
    match action {
        KbAction::NavDown => app.move_selection(columns),
        KbAction::NavUp => app.move_selection(-columns),
        KbAction::NavRight => app.move_selection(1),
        KbAction::NavLeft => app.move_selection(-1),
        KbAction::FilterByCardTopic => app.toggle_card_topic(),
        other => return handle_common_action(app, other),
    }
    Action::Continue
}

fn handle_topics_action(app: &mut App, action: KbAction) -> Action {
    match action {
        KbAction::NavRight | KbAction::NavDown => app.move_topic_cursor(1),
        KbAction::NavLeft | KbAction::NavUp => app.move_topic_cursor(-1),
        KbAction::ToggleTopic => app.toggle_topic_at_cursor(),
        KbAction::Back => {
            app.focus = Focus::Cards;
            app.needs_redraw = true;
        }
        other => return handle_common_action(app, other),
    }
    Action::Continue
}

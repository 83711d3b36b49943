//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] operations.  Per-joke controls act on
//! the selected row through its [`JokeItem`], the same way a click on that
//! row's buttons would.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;
use crate::joke_item::JokeItem;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('n') => {
            app.fetch_jokes();
        }
        KeyCode::Char('r') => app.reset_votes(),
        // The list is hidden while loading, so there is no row to act on.
        _ if app.is_loading() => {}
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
            with_selected(app, |item, app| item.upvote(app))
        }
        KeyCode::Char('-') | KeyCode::Left => with_selected(app, |item, app| item.downvote(app)),
        KeyCode::Char('l') | KeyCode::Char(' ') => {
            with_selected(app, |item, app| item.toggle_lock(app))
        }
        _ => {}
    }
}

fn with_selected(app: &mut App, act: impl FnOnce(&JokeItem, &mut App)) {
    if let Some(joke) = app.selected_joke() {
        act(&JokeItem::new(&joke), app);
    }
}

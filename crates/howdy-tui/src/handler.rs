use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        // The next draw re-measures the chat block
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn focus_input(app: &mut App) {
    app.focus = FocusPane::Input;
    app.input_mode = InputMode::Editing;
    app.query_cursor = app.query_input.chars().count();
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Tab cycles: Chat -> Input -> Sidebar -> Chat
        KeyCode::Tab => match app.focus {
            FocusPane::Chat => focus_input(app),
            FocusPane::Input => app.focus = FocusPane::Sidebar,
            FocusPane::Sidebar => app.focus = FocusPane::Chat,
        },
        KeyCode::Char('i') | KeyCode::Char('/') => focus_input(app),

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Sidebar => app.role_nav_down(),
            _ => app.scroll_down(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Sidebar => app.role_nav_up(),
            _ => app.scroll_up(1),
        },
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down((app.chat_height / 2).max(1));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up((app.chat_height / 2).max(1));
        }
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        KeyCode::Enter | KeyCode::Char(' ') => match app.focus {
            FocusPane::Sidebar => app.apply_highlighted_role(),
            _ => focus_input(app),
        },

        KeyCode::Char('r') => app.toggle_role(),
        KeyCode::Char('C') => app.clear_history(),
        KeyCode::Esc => app.last_error = None,

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Chat;
        }
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Sidebar;
        }
        KeyCode::Enter => {
            app.submit_query();
        }
        KeyCode::Backspace => {
            if app.query_cursor > 0 {
                app.query_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
                app.query_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.query_input.chars().count();
            if app.query_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
                app.query_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.query_cursor = app.query_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.query_input.chars().count();
            app.query_cursor = (app.query_cursor + 1).min(char_count);
        }
        KeyCode::Home => app.query_cursor = 0,
        KeyCode::End => app.query_cursor = app.query_input.chars().count(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
            app.query_input.insert(byte_pos, c);
            app.query_cursor += 1;
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    let in_sidebar = app
        .sidebar_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_chat => app.scroll_down(3),
        MouseEventKind::ScrollUp if in_chat => app.scroll_up(3),
        MouseEventKind::ScrollDown if in_sidebar => app.role_nav_down(),
        MouseEventKind::ScrollUp if in_sidebar => app.role_nav_up(),
        _ => {}
    }
}

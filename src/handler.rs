use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, ChatFocus, InputMode, Section, QUICK_ACTIONS};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Section switching is global in normal mode
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('1') => {
            app.set_section(Section::Chat);
            return;
        }
        KeyCode::Char('2') => {
            app.set_section(Section::Doctors);
            return;
        }
        KeyCode::Char('3') => {
            app.set_section(Section::Medicines);
            return;
        }
        KeyCode::Char('4') => {
            app.set_section(Section::Hospitals);
            return;
        }
        KeyCode::Char('5') => {
            app.set_section(Section::About);
            return;
        }
        KeyCode::Char(']') => {
            app.next_section();
            return;
        }
        KeyCode::Char('[') => {
            app.prev_section();
            return;
        }
        _ => {}
    }

    match app.section {
        Section::Chat => handle_chat_normal(app, key),
        Section::Doctors => handle_doctors_normal(app, key),
        Section::Medicines => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.medicines_nav_down(),
            KeyCode::Char('k') | KeyCode::Up => app.medicines_nav_up(),
            _ => {}
        },
        Section::Hospitals => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.hospitals_nav_down(),
            KeyCode::Char('k') | KeyCode::Up => app.hospitals_nav_up(),
            _ => {}
        },
        Section::About => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        // Tab cycles: Input -> QuickActions -> Transcript -> Input
        KeyCode::Tab => {
            app.chat_focus = match app.chat_focus {
                ChatFocus::Input => ChatFocus::QuickActions,
                ChatFocus::QuickActions => ChatFocus::Transcript,
                ChatFocus::Transcript => ChatFocus::Input,
            };

            // Auto-enter editing mode when focusing input
            if app.chat_focus == ChatFocus::Input {
                app.input_mode = InputMode::Editing;
                app.chat_cursor = app.chat_input.chars().count();
            }
        }

        KeyCode::Char('i') => {
            app.chat_focus = ChatFocus::Input;
            app.input_mode = InputMode::Editing;
            app.chat_cursor = app.chat_input.chars().count();
        }

        // Quick action chips: pick one and send it
        KeyCode::Char('h') | KeyCode::Left => {
            if app.chat_focus == ChatFocus::QuickActions {
                app.quick_prev();
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if app.chat_focus == ChatFocus::QuickActions {
                app.quick_next();
            }
        }
        KeyCode::Enter => {
            if app.chat_focus == ChatFocus::QuickActions {
                if let Some(preset) = QUICK_ACTIONS.get(app.quick_selected) {
                    app.quick_send(preset);
                }
            }
        }

        // Transcript scrolling
        KeyCode::Char('j') | KeyCode::Down => app.chat_scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.chat_scroll_up(),
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        _ => {}
    }
}

fn handle_doctors_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('/') | KeyCode::Char('i') => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => app.doctors_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.doctors_nav_up(),
        KeyCode::Esc => {
            if !app.doctor_query.is_empty() {
                app.doctor_query.clear();
                app.filter_doctors();
            }
        }
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.section {
        Section::Chat => handle_chat_editing(app, key),
        Section::Doctors => handle_search_editing(app, key),
        _ => app.input_mode = InputMode::Normal,
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit();
        }
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.chat_focus = ChatFocus::QuickActions;
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

fn handle_search_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.doctor_query.pop();
            app.filter_doctors();
        }
        KeyCode::Char(c) => {
            app.doctor_query.push(c);
            app.filter_doctors();
        }
        _ => {}
    }
}

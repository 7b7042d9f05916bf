//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::App;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
/// While the trade modal is open it captures every key except Ctrl-C.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return;
    }
    if app.flow.is_open() {
        handle_modal_key(app, key.code);
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char(' ') => app.toggle_pause(),
        KeyCode::Char('+' | '=') => app.speed_up(),
        KeyCode::Char('-') => app.speed_down(),
        KeyCode::Right | KeyCode::Char('l') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.select_prev(),
        KeyCode::Char('d') | KeyCode::Enter => app.toggle_details(),
        KeyCode::Char('t') => app.open_trade(),
        KeyCode::Char('1') => app.switch_preset("baseline"),
        KeyCode::Char('2') => app.switch_preset("wind_rich"),
        KeyCode::Char('3') => app.switch_preset("grid_stress"),
        KeyCode::Char('r') => app.restart(),
        _ => {}
    }
}

fn handle_modal_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel_trade(),
        KeyCode::Tab => app.trade_focus_next(),
        KeyCode::Up | KeyCode::Char('+' | '=') => app.trade_adjust(true),
        KeyCode::Down | KeyCode::Char('-') => app.trade_adjust(false),
        KeyCode::Enter => app.submit_trade(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn modal_captures_escape() {
        let mut app = App::new(ScenarioConfig::baseline(), "baseline");
        press(&mut app, KeyCode::Char('t'));
        assert!(app.flow.is_open());
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.quit);
        press(&mut app, KeyCode::Esc);
        assert!(!app.flow.is_open());
        assert!(!app.quit);
        press(&mut app, KeyCode::Esc);
        assert!(app.quit);
    }

    #[test]
    fn arrows_move_selection() {
        let mut app = App::new(ScenarioConfig::baseline(), "baseline");
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.selected, 2);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.selected, 1);
    }
}

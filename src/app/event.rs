// Keyboard event handling
//
// Processes user input and updates the application state accordingly.

use super::AppState;
use crossterm::event::KeyCode;

/// Handle keyboard events and update application state
///
/// Returns `true` if the application should continue running,
/// `false` if it should exit.
///
/// # Key Bindings
/// - `q`, `Q`, `Esc` - Quit the application
/// - `Up` / `Down` - Select previous / next edge
/// - `c`, `C` - Clear the edge selection
/// - `a`, `A` - Pause / resume the traffic animation
/// - `f`, `F` - Cycle the protocol filter (all / HTTP / gRPC / TCP)
/// - `+`, `=` - Refresh telemetry more often
/// - `-`, `_` - Refresh telemetry less often
/// - `h`, `j`, `k`, `l` - Pan the topology view
/// - `z`, `x` - Zoom in / out
pub fn handle_key_event(app: &mut AppState, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            app.running = false;
            false
        }
        KeyCode::Up => {
            app.select_previous_edge();
            true
        }
        KeyCode::Down => {
            app.select_next_edge();
            true
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            app.clear_selection();
            true
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            app.toggle_animation();
            true
        }
        KeyCode::Char('f') | KeyCode::Char('F') => {
            app.cycle_protocol_filter();
            true
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.increase_refresh_rate();
            true
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.decrease_refresh_rate();
            true
        }
        KeyCode::Char('h') => {
            app.pan(1.0, 0.0);
            true
        }
        KeyCode::Char('l') => {
            app.pan(-1.0, 0.0);
            true
        }
        KeyCode::Char('j') => {
            app.pan(0.0, 1.0);
            true
        }
        KeyCode::Char('k') => {
            app.pan(0.0, -1.0);
            true
        }
        KeyCode::Char('z') => {
            app.zoom_in();
            true
        }
        KeyCode::Char('x') => {
            app.zoom_out();
            true
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        let mut app = AppState::new();

        assert!(app.running);
        let result = handle_key_event(&mut app, KeyCode::Char('q'));
        assert!(!result);
        assert!(!app.running);

        app.running = true;
        let result = handle_key_event(&mut app, KeyCode::Esc);
        assert!(!result);
        assert!(!app.running);
    }

    #[test]
    fn test_toggle_animation_key() {
        let mut app = AppState::new();
        assert!(app.traffic.is_running());

        handle_key_event(&mut app, KeyCode::Char('a'));
        assert!(!app.traffic.is_running());

        handle_key_event(&mut app, KeyCode::Char('A'));
        assert!(app.traffic.is_running());
    }

    #[test]
    fn test_selection_keys() {
        let mut app = AppState::new();

        handle_key_event(&mut app, KeyCode::Down);
        assert_eq!(app.selected_edge, Some(0));

        handle_key_event(&mut app, KeyCode::Char('c'));
        assert_eq!(app.selected_edge, None);
    }

    #[test]
    fn test_zoom_keys() {
        let mut app = AppState::new();
        let initial = app.view.scale;

        handle_key_event(&mut app, KeyCode::Char('z'));
        assert!(app.view.scale > initial);

        handle_key_event(&mut app, KeyCode::Char('x'));
        assert_eq!(app.view.scale, initial);
    }

    #[test]
    fn test_pan_keys() {
        let mut app = AppState::new();
        handle_key_event(&mut app, KeyCode::Char('h'));
        handle_key_event(&mut app, KeyCode::Char('j'));
        assert!(app.view.offset_x > 0.0);
        assert!(app.view.offset_y > 0.0);
    }

    #[test]
    fn test_refresh_rate_keys() {
        let mut app = AppState::new();
        let initial = app.refresh_config.refresh_ms;

        handle_key_event(&mut app, KeyCode::Char('+'));
        assert!(app.refresh_config.refresh_ms < initial);

        handle_key_event(&mut app, KeyCode::Char('-'));
        assert_eq!(app.refresh_config.refresh_ms, initial);
    }
}

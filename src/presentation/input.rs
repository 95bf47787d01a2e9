use std::time::Instant;

use crate::application::{App, AppMode, FetchRequest};
use crate::domain::AgeBracket;
use crate::infrastructure::CsvExporter;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    /// Routes a key press to the controller.
    ///
    /// Returns the request the key issued, if any, for the caller to dispatch.
    pub fn handle_key_event(
        app: &mut App,
        key: KeyCode,
        modifiers: KeyModifiers,
        now: Instant,
    ) -> Option<FetchRequest> {
        match app.mode {
            AppMode::Browse => Self::handle_browse_mode(app, key, modifiers),
            AppMode::Search => {
                Self::handle_search_mode(app, key, modifiers, now);
                None
            }
            AppMode::Help => {
                Self::handle_help_mode(app, key);
                None
            }
            AppMode::ExportCsv => {
                Self::handle_filename_input_mode(app, key);
                None
            }
        }
    }

    fn handle_browse_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> Option<FetchRequest> {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('e') => {
                    app.start_csv_export();
                    return None;
                }
                KeyCode::Char('r') => return Some(app.reload()),
                _ => {}
            }
        }

        app.status_message = None;

        match key {
            KeyCode::Char('/') | KeyCode::Char('s') => {
                app.start_search();
                None
            }
            KeyCode::Char('a') => Some(app.cycle_age_bracket(true)),
            KeyCode::Char('A') => Some(app.cycle_age_bracket(false)),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                Some(app.select_age_bracket(AgeBracket::ALL[index]))
            }
            KeyCode::Right | KeyCode::Char('n') | KeyCode::PageDown => app.next_page(),
            KeyCode::Left | KeyCode::Char('p') | KeyCode::PageUp => app.previous_page(),
            KeyCode::Char('r') | KeyCode::F(5) => Some(app.reload()),
            KeyCode::Up | KeyCode::Char('k') => {
                app.select_previous_row();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.select_next_row();
                None
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.show_help();
                None
            }
            // 'q' is handled by the main loop
            _ => None,
        }
    }

    fn handle_search_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers, now: Instant) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('u') = key {
                app.clear_search(now);
            }
            return;
        }

        match key {
            KeyCode::Enter | KeyCode::Esc => {
                app.finish_search();
            }
            KeyCode::Backspace => {
                app.delete_search_char_before_cursor(now);
            }
            KeyCode::Delete => {
                app.delete_search_char_at_cursor(now);
            }
            KeyCode::Left => {
                app.move_cursor_left();
            }
            KeyCode::Right => {
                app.move_cursor_right();
            }
            KeyCode::Home => {
                app.move_cursor_home();
            }
            KeyCode::End => {
                app.move_cursor_end();
            }
            KeyCode::Char(c) => {
                app.insert_search_char(c, now);
            }
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.close_help();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let filename = app.get_csv_export_filename();
                let result = CsvExporter::export_records(app.visible_records(), &filename);
                app.set_csv_export_result(result);
            }
            KeyCode::Esc => {
                app.cancel_filename_input();
            }
            KeyCode::Backspace => {
                app.filename_input.pop();
            }
            KeyCode::Char(c) => {
                app.filename_input.push(c);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{FetchOutcome, Status};
    use crate::domain::{NetworkError, Record};
    use chrono::NaiveDate;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn press(app: &mut App, key: KeyCode, now: Instant) -> Option<FetchRequest> {
        InputHandler::handle_key_event(app, key, KeyModifiers::NONE, now)
    }

    fn ready_app() -> App {
        let mut app = App::default();
        let request = app.start();
        app.apply_outcome(FetchOutcome {
            token: request.token,
            result: Ok(vec![Record {
                id: 1,
                name: "Anna".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1994, 3, 21).unwrap(),
                email: "anna@example.com".to_string(),
                phone_number: "555-0101".to_string(),
            }]),
        });
        app
    }

    #[test]
    fn test_typing_in_search_mode_is_debounced() {
        let mut app = ready_app();
        let start = Instant::now();

        assert!(press(&mut app, KeyCode::Char('/'), start).is_none());
        assert_eq!(app.mode, AppMode::Search);

        for c in "anna".chars() {
            assert!(press(&mut app, KeyCode::Char(c), start).is_none());
        }
        assert_eq!(app.query().search_term, "anna");
        // Status stays Ready until the debounce fires
        assert_eq!(app.view().status, Status::Ready);

        let request = app.tick(start + Duration::from_millis(1000)).unwrap();
        assert_eq!(request.query.search_term, "anna");
    }

    #[test]
    fn test_letters_in_search_mode_are_not_shortcuts() {
        let mut app = ready_app();
        let now = Instant::now();
        press(&mut app, KeyCode::Char('s'), now);
        assert_eq!(app.mode, AppMode::Search);

        assert!(press(&mut app, KeyCode::Char('a'), now).is_none());
        assert!(press(&mut app, KeyCode::Char('n'), now).is_none());
        assert_eq!(app.query().search_term, "an");
        assert_eq!(app.current_page(), 1);

        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.mode, AppMode::Browse);
        assert_eq!(app.query().search_term, "an");
    }

    #[test]
    fn test_ctrl_u_clears_search() {
        let mut app = ready_app();
        let now = Instant::now();
        app.start_search();
        app.set_search_term("bob", now);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL, now);
        assert_eq!(app.query().search_term, "");
    }

    #[test]
    fn test_age_keys_issue_immediately() {
        let mut app = ready_app();
        let now = Instant::now();
        app.next_page();

        let request = press(&mut app, KeyCode::Char('3'), now).unwrap();
        assert_eq!(request.query.age_bracket, AgeBracket::From19To30);
        assert_eq!(request.query.page, 1);

        let request = press(&mut app, KeyCode::Char('a'), now).unwrap();
        assert_eq!(request.query.age_bracket, AgeBracket::From31To50);
    }

    #[test]
    fn test_page_keys() {
        let mut app = ready_app();
        let now = Instant::now();

        assert!(press(&mut app, KeyCode::Left, now).is_none());
        assert_eq!(press(&mut app, KeyCode::Right, now).unwrap().query.page, 2);
        assert_eq!(press(&mut app, KeyCode::Char('p'), now).unwrap().query.page, 1);
        assert!(press(&mut app, KeyCode::PageUp, now).is_none());
    }

    #[test]
    fn test_next_key_ignored_on_empty_page() {
        let mut app = App::default();
        let now = Instant::now();
        let request = app.start();
        app.apply_outcome(FetchOutcome {
            token: request.token,
            result: Ok(Vec::new()),
        });

        assert!(press(&mut app, KeyCode::Right, now).is_none());
        assert!(press(&mut app, KeyCode::Char('n'), now).is_none());
        assert_eq!(app.current_page(), 1);
    }

    #[test]
    fn test_next_key_after_server_error() {
        let mut app = ready_app();
        let now = Instant::now();
        let broken = press(&mut app, KeyCode::Char('r'), now).unwrap();
        app.apply_outcome(FetchOutcome {
            token: broken.token,
            result: Err(NetworkError::new("HTTP 500 Internal Server Error")),
        });
        assert_eq!(app.view().status, Status::Error);

        let request = press(&mut app, KeyCode::Right, now).unwrap();
        assert_eq!(request.query.page, 2);
    }

    #[test]
    fn test_reload_keys() {
        let mut app = ready_app();
        let now = Instant::now();
        let first = press(&mut app, KeyCode::Char('r'), now).unwrap();
        let second = InputHandler::handle_key_event(&mut app, KeyCode::Char('r'), KeyModifiers::CONTROL, now).unwrap();
        assert_eq!(first.query, second.query);
        assert!(second.token > first.token);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = ready_app();
        let now = Instant::now();
        press(&mut app, KeyCode::F(1), now);
        assert_eq!(app.mode, AppMode::Help);
        press(&mut app, KeyCode::Down, now);
        press(&mut app, KeyCode::PageDown, now);
        assert_eq!(app.help_scroll, 6);
        press(&mut app, KeyCode::Char('q'), now);
        assert_eq!(app.mode, AppMode::Browse);
    }

    #[test]
    fn test_csv_export_key_binding_writes_file() {
        let mut app = ready_app();
        let now = Instant::now();
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        InputHandler::handle_key_event(&mut app, KeyCode::Char('e'), KeyModifiers::CONTROL, now);
        assert_eq!(app.mode, AppMode::ExportCsv);
        assert_eq!(app.filename_input, "customers-page-1.csv");

        app.filename_input = path.display().to_string();
        press(&mut app, KeyCode::Backspace, now);
        press(&mut app, KeyCode::Char('v'), now);
        press(&mut app, KeyCode::Enter, now);

        assert_eq!(app.mode, AppMode::Browse);
        assert!(app.status_message.as_deref().unwrap().starts_with("Exported to"));
        assert!(fs::read_to_string(&path).unwrap().contains("Anna"));
    }

    #[test]
    fn test_csv_export_escape_cancels() {
        let mut app = ready_app();
        let now = Instant::now();
        app.start_csv_export();
        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.mode, AppMode::Browse);
        assert!(app.filename_input.is_empty());
    }
}

use crate::application::{App, AppMode, Status};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

const SKELETON_ROWS: usize = 5;
const SKELETON_CELL: &str = "░░░░░░░░";

pub const ERROR_MESSAGE: &str = "Failed to fetch data. Please try again.";
pub const EMPTY_MESSAGE: &str = "No matching results found.";

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_body(f, app, chunks[1]);
    render_pagination(f, app, chunks[2]);
    render_status_bar(f, app, chunks[3]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(16),
            Constraint::Length(40),
            Constraint::Length(16),
        ])
        .split(area);

    let title = Paragraph::new("Customer Data")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Left);
    f.render_widget(title, columns[0]);

    let searching = matches!(app.mode, AppMode::Search);
    let term = &app.query().search_term;
    let (search_text, search_style) = if term.is_empty() && !searching {
        ("Search customers...".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (term.clone(), Style::default())
    };
    let search_border = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(search_border)
            .title("Search"),
    );
    f.render_widget(search, columns[1]);

    if searching {
        let offset = u16::try_from(app.cursor_position).unwrap_or(u16::MAX);
        let x = columns[1].x.saturating_add(1).saturating_add(offset);
        let max_x = columns[1].x.saturating_add(columns[1].width.saturating_sub(2));
        f.set_cursor_position((x.min(max_x), columns[1].y.saturating_add(1)));
    }

    let age = Paragraph::new(app.query().age_bracket.label())
        .block(Block::default().borders(Borders::ALL).title("Age"));
    f.render_widget(age, columns[2]);
}

fn table_header() -> Row<'static> {
    let style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    Row::new(
        ["Sl. No.", "Name", "Date of Birth", "Email", "Phone Number"]
            .into_iter()
            .map(|h| Cell::from(h).style(style)),
    )
    .height(1)
}

fn table_widths() -> [Constraint; 5] {
    [
        Constraint::Length(7),
        Constraint::Percentage(25),
        Constraint::Length(13),
        Constraint::Percentage(35),
        Constraint::Length(14),
    ]
}

fn render_body(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.view().status == Status::Loading {
        "Customers (loading)"
    } else {
        "Customers"
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    match app.view().status {
        Status::Loading => {
            let rows = (0..SKELETON_ROWS).map(|_| {
                Row::new((0..5).map(|_| Cell::from(SKELETON_CELL)))
                    .style(Style::default().fg(Color::DarkGray))
            });
            let table = Table::new(rows, table_widths())
                .header(table_header())
                .block(block)
                .column_spacing(1);
            f.render_widget(table, area);
        }
        Status::Error => {
            let message = Paragraph::new(vec![
                Line::from(ERROR_MESSAGE),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .block(block);
            f.render_widget(message, area);
        }
        Status::Ready if !app.view().has_records() => {
            let message = Paragraph::new(EMPTY_MESSAGE)
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(message, area);
        }
        Status::Ready => {
            let rows = app.visible_records().iter().enumerate().map(|(index, record)| {
                let style = if index == app.selected_row {
                    Style::default().bg(Color::Blue).fg(Color::White)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(format!("{}", index + 1)),
                    Cell::from(record.name.clone()),
                    Cell::from(record.date_of_birth.format("%Y-%m-%d").to_string()),
                    Cell::from(record.email.clone()),
                    Cell::from(record.phone_number.clone()),
                ])
                .style(style)
                .height(1)
            });
            let table = Table::new(rows, table_widths())
                .header(table_header())
                .block(block)
                .column_spacing(1);
            f.render_widget(table, area);
        }
    }
}

fn render_pagination(f: &mut Frame, app: &App, area: Rect) {
    let view = app.view();
    let has_rows = view.records.as_ref().is_some_and(|records| !records.is_empty());
    if !has_rows || view.status == Status::Loading {
        return;
    }

    let enabled = Style::default().fg(Color::White).bg(Color::Blue);
    let disabled = Style::default().fg(Color::DarkGray);
    let previous_style = if app.can_go_previous() { enabled } else { disabled };

    let line = Line::from(vec![
        Span::styled(" ◀ Previous ", previous_style),
        Span::raw(format!("  Page {}  ", app.current_page())),
        Span::styled(" Next ▶ ", enabled),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Browse => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "/: search | a/A: age filter | ←/→: page | r: reload | Ctrl+E: export CSV | ?: help | q: quit".to_string()
            }
        }
        AppMode::Search => {
            let pending = if app.is_search_pending() { " (searching...)" } else { "" };
            format!("Search: {}{} (Enter/Esc to finish, Ctrl+U to clear)", app.query().search_term, pending)
        }
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        AppMode::ExportCsv => format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.filename_input),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Browse => Style::default(),
            AppMode::Search => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::ExportCsv => Style::default().fg(Color::Magenta),
        });
    f.render_widget(input, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("custview Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"CUSTVIEW KEY REFERENCE

=== SEARCH ===
/ or s          Focus the search box
Typing          Edits the search term; the request is sent once
                you stop typing for a moment
Ctrl+U          Clear the search term
Enter/Esc       Leave the search box (the term is kept)

=== AGE FILTER ===
a / A           Next / previous age bracket
1-5             All, 0-18, 19-30, 31-50, 51+
                Changing the filter jumps back to page 1

=== PAGES ===
→ / n / PgDn    Next page
← / p / PgUp    Previous page (not below page 1)
r / F5          Reload the current page

=== ROWS ===
↑↓ or k/j       Move the row highlight

=== EXPORT ===
Ctrl+E          Export the records on screen to a CSV file

=== OTHER ===
F1 or ?         Show this help
q               Quit

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{FetchOutcome, FetchRequest};
    use crate::domain::{NetworkError, Record};
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn resolve(app: &mut App, request: &FetchRequest, records: Vec<Record>) {
        app.apply_outcome(FetchOutcome {
            token: request.token,
            result: Ok(records),
        });
    }

    fn anna() -> Record {
        Record {
            id: 1,
            name: "Anna Smith".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1994, 3, 21).unwrap(),
            email: "anna@example.com".to_string(),
            phone_number: "555-0101".to_string(),
        }
    }

    #[test]
    fn test_loading_shows_skeleton_and_no_pagination() {
        let mut app = App::default();
        app.start();
        let screen = draw(&app);
        assert!(screen.contains("Customers (loading)"));
        assert!(screen.contains(SKELETON_CELL));
        assert!(!screen.contains("Previous"));
    }

    #[test]
    fn test_ready_shows_records_and_pagination() {
        let mut app = App::default();
        let request = app.start();
        resolve(&mut app, &request, vec![anna()]);

        let screen = draw(&app);
        assert!(screen.contains("Sl. No."));
        assert!(screen.contains("Anna Smith"));
        assert!(screen.contains("1994-03-21"));
        assert!(screen.contains("Page 1"));
        assert!(screen.contains("Next"));
    }

    #[test]
    fn test_empty_page_message() {
        let mut app = App::default();
        let request = app.start();
        resolve(&mut app, &request, vec![]);

        let screen = draw(&app);
        assert!(screen.contains(EMPTY_MESSAGE));
        assert!(!screen.contains("Next"));
    }

    #[test]
    fn test_error_message_overrides_leftover_records() {
        let mut app = App::default();
        let request = app.start();
        resolve(&mut app, &request, vec![anna()]);
        let retry = app.reload();
        app.apply_outcome(FetchOutcome {
            token: retry.token,
            result: Err(NetworkError::new("HTTP 500")),
        });

        let screen = draw(&app);
        assert!(screen.contains(ERROR_MESSAGE));
        assert!(!screen.contains("Anna Smith"));
    }

    #[test]
    fn test_pagination_stays_visible_after_error() {
        let mut app = App::default();
        let request = app.start();
        resolve(&mut app, &request, vec![anna()]);
        let retry = app.reload();
        assert!(!draw(&app).contains("Next"));

        app.apply_outcome(FetchOutcome {
            token: retry.token,
            result: Err(NetworkError::new("HTTP 500")),
        });

        let screen = draw(&app);
        assert!(screen.contains(ERROR_MESSAGE));
        assert!(screen.contains("Page 1"));
        assert!(screen.contains("Next"));
    }

    #[test]
    fn test_cursor_clamped_inside_search_box_for_long_terms() {
        let mut app = App::default();
        app.start_search();
        app.set_search_term("x".repeat(70_000), std::time::Instant::now());
        assert!(app.cursor_position > usize::from(u16::MAX));

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|f| render_ui(f, &app)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();

        // Search box spans columns 64..104 of a 120-wide header
        assert_eq!(cursor.x, 64 + 40 - 2);
        assert_eq!(cursor.y, 1);
    }

    #[test]
    fn test_help_popup_renders() {
        let mut app = App::default();
        app.show_help();
        let screen = draw(&app);
        assert!(screen.contains("custview Help"));
    }
}

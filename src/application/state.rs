//! Application state management for the customer browser.
//!
//! [`App`] is the query-state controller. It owns the [`QueryState`], the
//! search [`Debouncer`] and the [`FetchCoordinator`], and is the only place
//! those are mutated. Input entry points return the [`FetchRequest`] they
//! issued, if any, so the caller decides how the request is executed.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::application::coordinator::{
    FetchCoordinator, FetchOutcome, FetchRequest, Reconciliation, Status, ViewState,
};
use crate::application::debounce::Debouncer;
use crate::domain::{AgeBracket, ExportError, QueryState, Record};

/// Quiet window applied to search keystrokes unless configured otherwise.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Represents the current mode of the application.
///
/// The mode decides how key presses are interpreted and which UI elements
/// are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Browsing the table - paging, filtering and row navigation
    Browse,
    /// Search box focused - characters edit the search term
    Search,
    /// Help screen is displayed
    Help,
    /// CSV export dialog is open
    ExportCsv,
}

/// Main application state: the query, the request bookkeeping and UI state.
///
/// # Examples
///
/// ```
/// use custview::application::{App, Status};
///
/// let mut app = App::default();
/// let request = app.start();
/// assert_eq!(request.query.page, 1);
/// assert_eq!(app.view().status, Status::Loading);
/// ```
#[derive(Debug)]
pub struct App {
    query: QueryState,
    coordinator: FetchCoordinator,
    search_debounce: Debouncer<String>,
    /// Current application mode
    pub mode: AppMode,
    /// Cursor position within the search box, in characters
    pub cursor_position: usize,
    /// Highlighted row in the visible page (zero-based)
    pub selected_row: usize,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Input buffer for filename entry
    pub filename_input: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Debouncer::new(DEFAULT_SEARCH_DEBOUNCE))
    }
}

impl App {
    /// Creates a controller for the default query.
    ///
    /// No request is issued until [`start`](App::start) is called.
    ///
    /// # Arguments
    ///
    /// * `search_debounce` - Debouncer that collapses search keystrokes
    pub fn new(search_debounce: Debouncer<String>) -> Self {
        Self {
            query: QueryState::default(),
            coordinator: FetchCoordinator::default(),
            search_debounce,
            mode: AppMode::Browse,
            cursor_position: 0,
            selected_row: 0,
            help_scroll: 0,
            status_message: None,
            filename_input: String::new(),
        }
    }

    /// Issues the implicit first fetch for the default query.
    pub fn start(&mut self) -> FetchRequest {
        self.coordinator.issue(&self.query)
    }

    /// Returns the live query, including search edits not yet fetched.
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Returns what the table should currently show.
    pub fn view(&self) -> &ViewState {
        self.coordinator.view()
    }

    /// Returns the rows of the current page, or nothing unless the last
    /// fetch succeeded.
    pub fn visible_records(&self) -> &[Record] {
        self.coordinator.view().visible_records()
    }

    /// Returns the highlighted record, if the page has one at that row.
    pub fn selected_record(&self) -> Option<&Record> {
        self.visible_records().get(self.selected_row)
    }

    /// Page shown in the pagination controls.
    pub fn current_page(&self) -> u32 {
        self.query.page
    }

    /// Checks whether a previous page exists.
    pub fn can_go_previous(&self) -> bool {
        self.query.page > 1
    }

    /// Checks whether paging forward makes sense.
    ///
    /// The server does not report a total, so the only known end is a page
    /// that loaded successfully and came back empty.
    pub fn can_go_next(&self) -> bool {
        let view = self.view();
        !(view.status == Status::Ready && view.visible_records().is_empty())
    }

    /// Checks whether a search keystroke is still waiting for its quiet window.
    pub fn is_search_pending(&self) -> bool {
        self.search_debounce.is_pending()
    }

    /// How long the event loop may sleep before the debounced search is due.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.search_debounce.time_until_due(now)
    }

    // ---- search box -------------------------------------------------------

    /// Focuses the search box with the cursor after the last character.
    pub fn start_search(&mut self) {
        self.mode = AppMode::Search;
        self.cursor_position = self.query.search_term.chars().count();
        self.status_message = None;
    }

    /// Leaves the search box. A pending debounced search still fires.
    pub fn finish_search(&mut self) {
        self.mode = AppMode::Browse;
    }

    /// Replaces the search term wholesale. The fetch itself is debounced.
    ///
    /// # Arguments
    ///
    /// * `term` - New search term
    /// * `now` - Time of the edit, used to start the quiet window
    pub fn set_search_term(&mut self, term: impl Into<String>, now: Instant) {
        self.query.search_term = term.into();
        self.cursor_position = self.query.search_term.chars().count();
        self.search_changed(now);
    }

    /// Inserts a character at the cursor and restarts the quiet window.
    ///
    /// # Arguments
    ///
    /// * `c` - Character to insert
    /// * `now` - Time of the keystroke
    pub fn insert_search_char(&mut self, c: char, now: Instant) {
        let at = self.byte_index(self.cursor_position);
        self.query.search_term.insert(at, c);
        self.cursor_position += 1;
        self.search_changed(now);
    }

    /// Deletes the character before the cursor (Backspace).
    pub fn delete_search_char_before_cursor(&mut self, now: Instant) {
        if self.cursor_position == 0 {
            return;
        }
        let at = self.byte_index(self.cursor_position - 1);
        self.query.search_term.remove(at);
        self.cursor_position -= 1;
        self.search_changed(now);
    }

    /// Deletes the character under the cursor (Delete).
    pub fn delete_search_char_at_cursor(&mut self, now: Instant) {
        if self.cursor_position >= self.query.search_term.chars().count() {
            return;
        }
        let at = self.byte_index(self.cursor_position);
        self.query.search_term.remove(at);
        self.search_changed(now);
    }

    /// Empties the search box. Does nothing if it is already empty.
    pub fn clear_search(&mut self, now: Instant) {
        if self.query.search_term.is_empty() {
            return;
        }
        self.set_search_term(String::new(), now);
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let len = self.query.search_term.chars().count();
        if self.cursor_position < len {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.query.search_term.chars().count();
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.query
            .search_term
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.query.search_term.len())
    }

    fn search_changed(&mut self, now: Instant) {
        self.search_debounce
            .trigger(self.query.search_term.clone(), now);
    }

    /// Fires the debounced search once its quiet window has passed.
    ///
    /// The page resets to 1 at fire time; the age bracket used is whatever is
    /// selected now, not when the keystroke happened.
    ///
    /// # Arguments
    ///
    /// * `now` - Current time from the event loop
    pub fn tick(&mut self, now: Instant) -> Option<FetchRequest> {
        let term = self.search_debounce.poll(now)?;
        debug!(search = %term, "debounced search fired");
        self.query.search_term = term;
        self.query.page = 1;
        self.selected_row = 0;
        Some(self.coordinator.issue(&self.query))
    }

    // ---- filter and pagination -------------------------------------------

    /// Changes the age filter, resets to page 1 and fetches immediately.
    ///
    /// A pending debounced search is dropped, since this request already
    /// carries the live search term.
    ///
    /// # Arguments
    ///
    /// * `bracket` - Age bracket to filter by
    pub fn select_age_bracket(&mut self, bracket: AgeBracket) -> FetchRequest {
        if self.search_debounce.cancel() {
            debug!("pending search folded into filter change");
        }
        self.query.age_bracket = bracket;
        self.query.page = 1;
        self.selected_row = 0;
        self.coordinator.issue(&self.query)
    }

    /// Selects the neighbouring age bracket, wrapping at either end.
    pub fn cycle_age_bracket(&mut self, forward: bool) -> FetchRequest {
        let bracket = if forward {
            self.query.age_bracket.next()
        } else {
            self.query.age_bracket.previous()
        };
        self.select_age_bracket(bracket)
    }

    /// Navigates to `page`. Pages below 1 are ignored.
    ///
    /// # Arguments
    ///
    /// * `page` - One-based page number
    pub fn go_to_page(&mut self, page: u32) -> Option<FetchRequest> {
        if page < 1 {
            return None;
        }
        self.query.page = page;
        self.selected_row = 0;
        Some(self.coordinator.issue(&self.query))
    }

    /// Moves one page forward unless the current page loaded empty.
    pub fn next_page(&mut self) -> Option<FetchRequest> {
        if !self.can_go_next() {
            return None;
        }
        self.go_to_page(self.query.page.saturating_add(1))
    }

    /// Moves one page back. Does nothing on page 1.
    pub fn previous_page(&mut self) -> Option<FetchRequest> {
        self.go_to_page(self.query.page.saturating_sub(1))
    }

    /// Re-issues the current query unchanged, e.g. after an error.
    pub fn reload(&mut self) -> FetchRequest {
        self.status_message = None;
        self.coordinator.issue(&self.query)
    }

    /// Hands a completed fetch to the coordinator.
    ///
    /// Outcomes for superseded requests are discarded. When a page is
    /// applied, the highlighted row is clamped to its length.
    ///
    /// # Arguments
    ///
    /// * `outcome` - Completed fetch reported by the dispatcher
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) -> Reconciliation {
        let reconciliation = self.coordinator.resolve(outcome);
        if reconciliation == Reconciliation::Applied && self.view().status == Status::Ready {
            let len = self.visible_records().len();
            if self.selected_row >= len {
                self.selected_row = len.saturating_sub(1);
            }
        }
        reconciliation
    }

    /// Cancels work that must not outlive the controller.
    pub fn shutdown(&mut self) {
        if self.search_debounce.cancel() {
            info!("dropped pending search on shutdown");
        }
    }

    // ---- row navigation ---------------------------------------------------

    /// Moves the highlight down, stopping at the last row.
    pub fn select_next_row(&mut self) {
        let len = self.visible_records().len();
        if self.selected_row + 1 < len {
            self.selected_row += 1;
        }
    }

    /// Moves the highlight up, stopping at the first row.
    pub fn select_previous_row(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    // ---- help -------------------------------------------------------------

    /// Opens the help screen scrolled to the top.
    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    pub fn close_help(&mut self) {
        self.mode = AppMode::Browse;
    }

    // ---- CSV export -------------------------------------------------------

    /// Switches to CSV export mode to prompt for a filename.
    ///
    /// Initializes the filename input with a name derived from the page.
    pub fn start_csv_export(&mut self) {
        self.mode = AppMode::ExportCsv;
        self.filename_input = self.default_export_filename();
        self.status_message = None;
    }

    /// Cancels filename input and returns to browse mode.
    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Browse;
        self.filename_input.clear();
    }

    /// Gets the filename to use for CSV export.
    ///
    /// Falls back to the default name when the input is blank.
    pub fn get_csv_export_filename(&self) -> String {
        if self.filename_input.trim().is_empty() {
            self.default_export_filename()
        } else {
            self.filename_input.trim().to_string()
        }
    }

    fn default_export_filename(&self) -> String {
        format!("customers-page-{}.csv", self.query.page)
    }

    /// Processes the result of a CSV export and returns to browse mode.
    ///
    /// # Arguments
    ///
    /// * `result` - Result of the export operation (filename or error)
    pub fn set_csv_export_result(&mut self, result: Result<String, ExportError>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Exported to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Export failed: {}", error));
            }
        }

        self.mode = AppMode::Browse;
        self.filename_input.clear();
    }
}

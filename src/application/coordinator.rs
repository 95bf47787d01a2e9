//! Request sequencing and result reconciliation.
//!
//! Every fetch is tagged with a [`RequestToken`] when it is issued. Only the
//! most recently issued token is current, and only an outcome carrying the
//! current token may touch the [`ViewState`]. Responses that arrive late for
//! a superseded query are dropped, whatever order the network delivers them.

use std::fmt;

use tracing::{debug, info, warn};

use crate::domain::{NetworkError, QueryState, Record};

/// Monotonically increasing identifier assigned when a fetch is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A query snapshot ready to be handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub token: RequestToken,
    pub query: QueryState,
}

/// A completed fetch, successful or not, as posted back to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub token: RequestToken,
    pub result: Result<Vec<Record>, NetworkError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Loading,
    Ready,
    Error,
}

/// Display-ready projection of the latest authoritative fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// `None` until the first successful load
    pub records: Option<Vec<Record>>,
    pub status: Status,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            records: None,
            status: Status::Loading,
        }
    }
}

impl ViewState {
    /// Records that should be rendered. Empty unless the status is `Ready`.
    pub fn visible_records(&self) -> &[Record] {
        match (self.status, &self.records) {
            (Status::Ready, Some(records)) => records,
            _ => &[],
        }
    }

    pub fn has_records(&self) -> bool {
        !self.visible_records().is_empty()
    }
}

/// Whether an outcome changed the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Applied,
    Discarded,
}

/// Tracks the current request and owns the [`ViewState`].
///
/// # Examples
///
/// ```
/// use custview::application::{FetchCoordinator, Reconciliation, Status};
/// use custview::domain::QueryState;
///
/// let mut coordinator = FetchCoordinator::default();
/// let first = coordinator.issue(&QueryState::default());
/// let second = coordinator.issue(&QueryState { page: 2, ..QueryState::default() });
///
/// // The older response arrives last and is ignored.
/// assert_eq!(coordinator.on_success(second.token, vec![]), Reconciliation::Applied);
/// assert_eq!(coordinator.on_success(first.token, vec![]), Reconciliation::Discarded);
/// assert_eq!(coordinator.view().status, Status::Ready);
/// ```
#[derive(Debug, Default)]
pub struct FetchCoordinator {
    last_issued: u64,
    current: Option<FetchRequest>,
    applied_query: Option<QueryState>,
    view: ViewState,
}

impl FetchCoordinator {
    /// Allocates a fresh token for `query`, makes it current and enters `Loading`.
    pub fn issue(&mut self, query: &QueryState) -> FetchRequest {
        self.last_issued += 1;
        let request = FetchRequest {
            token: RequestToken(self.last_issued),
            query: query.clone(),
        };
        info!(
            token = request.token.value(),
            search = %query.search_term,
            age = query.age_bracket.wire_value(),
            page = query.page,
            "issuing fetch"
        );
        self.current = Some(request.clone());
        self.view.status = Status::Loading;
        request
    }

    pub fn on_success(&mut self, token: RequestToken, records: Vec<Record>) -> Reconciliation {
        let Some(query) = self.current_query_for(token) else {
            debug!(token = token.value(), "discarding stale response");
            return Reconciliation::Discarded;
        };
        debug!(token = token.value(), count = records.len(), "applying response");
        self.applied_query = Some(query);
        self.view.records = Some(records);
        self.view.status = Status::Ready;
        Reconciliation::Applied
    }

    pub fn on_failure(&mut self, token: RequestToken, error: &NetworkError) -> Reconciliation {
        if self.current_query_for(token).is_none() {
            debug!(token = token.value(), %error, "discarding stale failure");
            return Reconciliation::Discarded;
        }
        warn!(token = token.value(), %error, "fetch failed");
        self.view.status = Status::Error;
        Reconciliation::Applied
    }

    pub fn resolve(&mut self, outcome: FetchOutcome) -> Reconciliation {
        match outcome.result {
            Ok(records) => self.on_success(outcome.token, records),
            Err(error) => self.on_failure(outcome.token, &error),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn current_token(&self) -> Option<RequestToken> {
        self.current.as_ref().map(|r| r.token)
    }

    /// The query behind the records currently on screen.
    pub fn applied_query(&self) -> Option<&QueryState> {
        self.applied_query.as_ref()
    }

    fn current_query_for(&self, token: RequestToken) -> Option<QueryState> {
        self.current
            .as_ref()
            .filter(|current| current.token == token)
            .map(|current| current.query.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: i64, name: &str) -> Record {
        Record {
            id,
            name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone_number: "555-0100".to_string(),
        }
    }

    fn page(n: u32) -> QueryState {
        QueryState {
            page: n,
            ..QueryState::default()
        }
    }

    #[test]
    fn test_initial_view_is_loading_without_records() {
        let coordinator = FetchCoordinator::default();
        assert_eq!(coordinator.view().status, Status::Loading);
        assert!(coordinator.view().records.is_none());
        assert!(coordinator.current_token().is_none());
    }

    #[test]
    fn test_tokens_increase_monotonically() {
        let mut coordinator = FetchCoordinator::default();
        let a = coordinator.issue(&page(1));
        let b = coordinator.issue(&page(1));
        let c = coordinator.issue(&page(2));
        assert!(a.token < b.token && b.token < c.token);
        assert_eq!(coordinator.current_token(), Some(c.token));
    }

    #[test]
    fn test_success_on_current_token_becomes_ready() {
        let mut coordinator = FetchCoordinator::default();
        let request = coordinator.issue(&page(1));

        let result = coordinator.on_success(request.token, vec![record(1, "Anna")]);

        assert_eq!(result, Reconciliation::Applied);
        assert_eq!(coordinator.view().status, Status::Ready);
        assert_eq!(coordinator.view().visible_records().len(), 1);
        assert_eq!(coordinator.applied_query(), Some(&page(1)));
    }

    #[test]
    fn test_stale_success_arriving_late_is_discarded() {
        let mut coordinator = FetchCoordinator::default();
        let slow = coordinator.issue(&page(1));
        let fast = coordinator.issue(&page(2));

        coordinator.on_success(fast.token, vec![record(2, "Bob")]);
        let late = coordinator.on_success(slow.token, vec![record(1, "Anna")]);

        assert_eq!(late, Reconciliation::Discarded);
        assert_eq!(coordinator.view().visible_records()[0].name, "Bob");
        assert_eq!(coordinator.applied_query().map(|q| q.page), Some(2));
    }

    #[test]
    fn test_stale_success_arriving_early_does_not_end_loading() {
        let mut coordinator = FetchCoordinator::default();
        let old = coordinator.issue(&page(1));
        let _new = coordinator.issue(&page(2));

        assert_eq!(coordinator.on_success(old.token, vec![record(1, "Anna")]), Reconciliation::Discarded);
        assert_eq!(coordinator.view().status, Status::Loading);
        assert!(coordinator.view().records.is_none());
    }

    #[test]
    fn test_stale_failure_is_swallowed() {
        let mut coordinator = FetchCoordinator::default();
        let old = coordinator.issue(&page(1));
        let new = coordinator.issue(&page(2));
        coordinator.on_success(new.token, vec![record(2, "Bob")]);

        let result = coordinator.on_failure(old.token, &NetworkError::new("HTTP 500"));

        assert_eq!(result, Reconciliation::Discarded);
        assert_eq!(coordinator.view().status, Status::Ready);
    }

    #[test]
    fn test_failure_keeps_previous_records_but_shows_error() {
        let mut coordinator = FetchCoordinator::default();
        let first = coordinator.issue(&page(1));
        coordinator.on_success(first.token, vec![record(1, "Anna")]);

        let second = coordinator.issue(&page(2));
        coordinator.on_failure(second.token, &NetworkError::new("HTTP 500"));

        assert_eq!(coordinator.view().status, Status::Error);
        assert_eq!(coordinator.view().records.as_ref().map(Vec::len), Some(1));
        assert!(coordinator.view().visible_records().is_empty());
    }

    #[test]
    fn test_duplicate_outcome_for_current_token_reapplies() {
        let mut coordinator = FetchCoordinator::default();
        let request = coordinator.issue(&page(1));
        coordinator.resolve(FetchOutcome {
            token: request.token,
            result: Ok(vec![record(1, "Anna")]),
        });
        let again = coordinator.resolve(FetchOutcome {
            token: request.token,
            result: Ok(vec![record(1, "Anna")]),
        });
        assert_eq!(again, Reconciliation::Applied);
        assert_eq!(coordinator.view().visible_records().len(), 1);
    }

    #[test]
    fn test_issue_after_ready_returns_to_loading() {
        let mut coordinator = FetchCoordinator::default();
        let first = coordinator.issue(&page(1));
        coordinator.on_success(first.token, vec![]);
        assert_eq!(coordinator.view().status, Status::Ready);

        coordinator.issue(&page(2));
        assert_eq!(coordinator.view().status, Status::Loading);
    }
}

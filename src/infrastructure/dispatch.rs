//! Runs fetches off the UI thread and posts outcomes back to the event loop.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{debug, error};

use crate::application::{FetchOutcome, FetchRequest};
use crate::domain::NetworkError;
use crate::infrastructure::http::CustomerClient;

/// Executes issued requests. Outcomes come back through a channel owned by
/// the implementation, never by mutating controller state directly.
pub trait FetchDispatcher {
    fn dispatch(&self, request: FetchRequest);
}

/// One short-lived worker thread per request.
///
/// Superseded requests are not aborted; their outcomes still arrive and are
/// dropped by the coordinator.
pub struct ThreadDispatcher<C> {
    client: Arc<C>,
    outcomes: Sender<FetchOutcome>,
}

impl<C: CustomerClient + 'static> ThreadDispatcher<C> {
    pub fn new(client: C) -> (Self, Receiver<FetchOutcome>) {
        let (outcomes, receiver) = mpsc::channel();
        let dispatcher = Self {
            client: Arc::new(client),
            outcomes,
        };
        (dispatcher, receiver)
    }
}

impl<C: CustomerClient + 'static> FetchDispatcher for ThreadDispatcher<C> {
    fn dispatch(&self, request: FetchRequest) {
        let client = Arc::clone(&self.client);
        let outcomes = self.outcomes.clone();
        let token = request.token;

        let spawned = thread::Builder::new()
            .name(format!("fetch-{}", token.value()))
            .spawn(move || {
                let result = client.fetch_page(&request.query);
                if outcomes.send(FetchOutcome { token, result }).is_err() {
                    debug!(token = token.value(), "event loop gone, dropping outcome");
                }
            });

        if let Err(err) = spawned {
            error!(token = token.value(), %err, "failed to spawn fetch worker");
            let _ = self.outcomes.send(FetchOutcome {
                token,
                result: Err(NetworkError::new(format!("Could not start request: {err}"))),
            });
        }
    }
}

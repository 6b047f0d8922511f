use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use super::ReplayApi;
use crate::ReplayError;
use crate::session::{RoundInfo, Session, SessionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Years,
    Rounds,
    Session,
}

/// Result of a background request, delivered to the UI thread
#[derive(Debug)]
pub enum LoaderEvent {
    Years(Result<Vec<i32>, ReplayError>),
    Rounds {
        year: i32,
        result: Result<Vec<RoundInfo>, ReplayError>,
    },
    Session {
        request: SessionRequest,
        result: Result<Box<Session>, ReplayError>,
    },
}

impl LoaderEvent {
    pub fn kind(&self) -> RequestKind {
        match self {
            LoaderEvent::Years(_) => RequestKind::Years,
            LoaderEvent::Rounds { .. } => RequestKind::Rounds,
            LoaderEvent::Session { .. } => RequestKind::Session,
        }
    }
}

/// Hands out monotonically increasing sequence numbers and remembers the
/// latest one per request kind. Only the response to the latest request of a
/// kind is accepted.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next_seq: u64,
    latest: HashMap<RequestKind, u64>,
    resolved: HashMap<RequestKind, u64>,
}

impl RequestTracker {
    pub fn issue(&mut self, kind: RequestKind) -> u64 {
        self.next_seq += 1;
        self.latest.insert(kind, self.next_seq);
        self.next_seq
    }

    /// True if `seq` answers the newest request of `kind`.
    pub fn accept(&mut self, kind: RequestKind, seq: u64) -> bool {
        if self.latest.get(&kind) == Some(&seq) {
            self.resolved.insert(kind, seq);
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self, kind: RequestKind) -> bool {
        match self.latest.get(&kind) {
            Some(latest) => self.resolved.get(&kind) != Some(latest),
            None => false,
        }
    }
}

struct Response {
    seq: u64,
    event: LoaderEvent,
}

/// Runs replay API requests off the UI thread.
///
/// Each request runs on its own worker thread and reports back through a
/// channel that the UI drains with [`SessionLoader::poll`] once per frame.
/// Requests cannot be cancelled; responses superseded by a newer request of
/// the same kind are dropped instead.
pub struct SessionLoader {
    api: Arc<dyn ReplayApi>,
    tracker: RequestTracker,
    response_tx: Sender<Response>,
    response_rx: Receiver<Response>,
    stale_discarded: usize,
}

impl SessionLoader {
    pub fn new(api: Arc<dyn ReplayApi>) -> Self {
        let (response_tx, response_rx) = mpsc::channel::<Response>();
        Self {
            api,
            tracker: RequestTracker::default(),
            response_tx,
            response_rx,
            stale_discarded: 0,
        }
    }

    pub fn request_years(&mut self) {
        self.spawn(RequestKind::Years, |api| LoaderEvent::Years(api.years()));
    }

    pub fn request_rounds(&mut self, year: i32) {
        self.spawn(RequestKind::Rounds, move |api| LoaderEvent::Rounds {
            year,
            result: api.rounds(year),
        });
    }

    pub fn request_session(&mut self, request: SessionRequest) {
        info!(
            "Loading {} {} round {}",
            request.year,
            request.session_type.label(),
            request.round_number
        );
        self.spawn(RequestKind::Session, move |api| LoaderEvent::Session {
            request,
            result: api.session(&request).map(Box::new),
        });
    }

    fn spawn<F>(&mut self, kind: RequestKind, request: F)
    where
        F: FnOnce(&dyn ReplayApi) -> LoaderEvent + Send + 'static,
    {
        let seq = self.tracker.issue(kind);
        let api = Arc::clone(&self.api);
        let response_tx = self.response_tx.clone();
        debug!("Issuing {:?} request #{}", kind, seq);

        thread::spawn(move || {
            let event = request(api.as_ref());
            if response_tx.send(Response { seq, event }).is_err() {
                debug!("Loader dropped before {:?} request #{} finished", kind, seq);
            }
        });
    }

    pub fn is_loading(&self, kind: RequestKind) -> bool {
        self.tracker.in_flight(kind)
    }

    pub fn is_busy(&self) -> bool {
        [RequestKind::Years, RequestKind::Rounds, RequestKind::Session]
            .iter()
            .any(|kind| self.tracker.in_flight(*kind))
    }

    /// Number of responses dropped because a newer request superseded them
    pub fn stale_discarded(&self) -> usize {
        self.stale_discarded
    }

    /// Drains finished requests without blocking.
    pub fn poll(&mut self) -> Vec<LoaderEvent> {
        let mut events = Vec::new();
        while let Ok(response) = self.response_rx.try_recv() {
            if let Some(event) = self.admit(response) {
                events.push(event);
            }
        }
        events
    }

    /// Blocks until the next accepted event or until `timeout` passes.
    pub fn next_event(&mut self, timeout: Duration) -> Option<LoaderEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let response = self.response_rx.recv_timeout(remaining).ok()?;
            if let Some(event) = self.admit(response) {
                return Some(event);
            }
        }
    }

    fn admit(&mut self, response: Response) -> Option<LoaderEvent> {
        let kind = response.event.kind();
        if self.tracker.accept(kind, response.seq) {
            Some(response.event)
        } else {
            info!(
                "Discarding stale {:?} response #{}, a newer request is pending",
                kind, response.seq
            );
            self.stale_discarded += 1;
            None
        }
    }
}

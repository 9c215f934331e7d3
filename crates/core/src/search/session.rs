use std::fmt::Display;

use tracing::{debug, info, warn};

use crate::models::Station;

use super::state::{ResultState, LOAD_FAILED, SEARCH_FAILED};

/// What a single catalog request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationQuery {
    /// The whole catalog, no filter parameter.
    All,
    /// Server-side name filter with the raw input text.
    ByName(String),
}

impl StationQuery {
    /// Map raw input text to a query. Blank text asks for the whole catalog;
    /// anything else is sent exactly as typed.
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            StationQuery::All
        } else {
            StationQuery::ByName(text.to_string())
        }
    }

    /// Fixed user-facing message for a failed fetch of this query.
    pub fn failure_message(&self) -> &'static str {
        match self {
            StationQuery::All => LOAD_FAILED,
            StationQuery::ByName(_) => SEARCH_FAILED,
        }
    }
}

/// Identifies one dispatched request.
///
/// `mount_id` separates modal mounts; `seq` increases with every request of
/// a mount. Only the newest tag of the live mount may change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTag {
    /// Mount the request belongs to.
    pub mount_id: u64,
    /// Position of the request within its mount.
    pub seq: u64,
}

/// A request the caller must run against the catalog and report back via
/// [`SearchSession::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Tag to hand back with the outcome.
    pub tag: FetchTag,
    /// Query to run.
    pub query: StationQuery,
}

/// Whether an outcome passed to [`SearchSession::apply`] changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The outcome belonged to the newest request and was applied.
    Current,
    /// A newer request had been dispatched; the outcome was dropped.
    Stale,
}

/// Search state owned by one mount of the search modal.
#[derive(Debug)]
pub struct SearchSession {
    mount_id: u64,
    next_seq: u64,
    in_flight: Option<FetchTicket>,
    search_term: String,
    state: ResultState,
}

impl SearchSession {
    /// Start a session and issue the initial full-catalog request.
    pub fn mount(mount_id: u64) -> (Self, FetchTicket) {
        let mut session = Self {
            mount_id,
            next_seq: 0,
            in_flight: None,
            search_term: String::new(),
            state: ResultState::Loading,
        };
        let ticket = session.dispatch(StationQuery::All);
        (session, ticket)
    }

    /// Record new input text and issue the matching request.
    ///
    /// Every change issues a request; there is no debounce.
    pub fn on_text_change(&mut self, text: impl Into<String>) -> FetchTicket {
        self.search_term = text.into();
        let query = StationQuery::from_text(&self.search_term);
        self.dispatch(query)
    }

    /// Apply the outcome of a request previously handed out by this session.
    ///
    /// Outcomes for anything but the newest request are dropped, so a slow
    /// early response can no longer overwrite a later one.
    pub fn apply<E: Display>(
        &mut self,
        tag: FetchTag,
        outcome: Result<Vec<Station>, E>,
    ) -> Applied {
        let Some(ticket) = self.in_flight.as_ref().filter(|ticket| ticket.tag == tag) else {
            debug!(
                mount_id = tag.mount_id,
                seq = tag.seq,
                latest = self.next_seq,
                "Dropping stale catalog response"
            );
            return Applied::Stale;
        };

        self.state = match outcome {
            Ok(stations) => {
                info!(seq = tag.seq, count = stations.len(), "Stations loaded");
                ResultState::Success(stations)
            }
            Err(err) => {
                warn!(seq = tag.seq, query = ?ticket.query, %err, "Station fetch failed");
                ResultState::Error(ticket.query.failure_message().to_string())
            }
        };
        self.in_flight = None;
        Applied::Current
    }

    /// Raw input text as last typed.
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Current result state.
    pub fn state(&self) -> &ResultState {
        &self.state
    }

    /// Latest fetched stations; empty while loading or after a failure.
    pub fn results(&self) -> &[Station] {
        self.state.results()
    }

    /// True exactly while the newest request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Message of the latest failure, if the latest fetch failed.
    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    fn dispatch(&mut self, query: StationQuery) -> FetchTicket {
        self.next_seq += 1;
        let ticket = FetchTicket {
            tag: FetchTag {
                mount_id: self.mount_id,
                seq: self.next_seq,
            },
            query,
        };
        debug!(seq = self.next_seq, query = ?ticket.query, "Dispatching station fetch");
        self.in_flight = Some(ticket.clone());
        self.state = ResultState::Loading;
        ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_and_oak() -> Vec<Station> {
        vec![Station::new("1", "Main St"), Station::new("2", "Oak Ave")]
    }

    fn ok(stations: Vec<Station>) -> Result<Vec<Station>, String> {
        Ok(stations)
    }

    fn failed() -> Result<Vec<Station>, String> {
        Err("connection refused".to_string())
    }

    #[test]
    fn blank_text_maps_to_full_catalog() {
        assert_eq!(StationQuery::from_text(""), StationQuery::All);
        assert_eq!(StationQuery::from_text("   \t"), StationQuery::All);
        assert_eq!(
            StationQuery::from_text(" Oak "),
            StationQuery::ByName(" Oak ".to_string())
        );
    }

    #[test]
    fn mount_issues_one_full_catalog_request() {
        let (session, ticket) = SearchSession::mount(7);
        assert_eq!(ticket.query, StationQuery::All);
        assert_eq!(ticket.tag, FetchTag { mount_id: 7, seq: 1 });
        assert!(session.is_loading());
        assert_eq!(session.state(), &ResultState::Loading);
        assert_eq!(session.search_term(), "");
    }

    #[test]
    fn successful_fetch_keeps_server_order() {
        let (mut session, ticket) = SearchSession::mount(1);
        let reversed = vec![Station::new("2", "Oak Ave"), Station::new("1", "Main St")];
        assert_eq!(session.apply(ticket.tag, ok(reversed.clone())), Applied::Current);
        assert!(!session.is_loading());
        assert_eq!(session.results(), reversed.as_slice());
        assert_eq!(session.error(), None);
    }

    #[test]
    fn typing_issues_filtered_request_with_exact_text() {
        let (mut session, first) = SearchSession::mount(1);
        session.apply(first.tag, ok(main_and_oak()));

        let ticket = session.on_text_change("Oak");
        assert_eq!(ticket.query, StationQuery::ByName("Oak".to_string()));
        assert!(session.is_loading());
        assert!(session.results().is_empty());

        session.apply(ticket.tag, ok(vec![Station::new("2", "Oak Ave")]));
        assert_eq!(session.results(), &[Station::new("2", "Oak Ave")]);
    }

    #[test]
    fn clearing_input_requests_full_catalog_again() {
        let (mut session, first) = SearchSession::mount(1);
        session.apply(first.tag, ok(main_and_oak()));
        let filtered = session.on_text_change("Oak");
        session.apply(filtered.tag, ok(vec![Station::new("2", "Oak Ave")]));

        let cleared = session.on_text_change("");
        assert_eq!(cleared.query, StationQuery::All);
        session.apply(cleared.tag, ok(main_and_oak()));
        assert_eq!(session.results(), main_and_oak().as_slice());
    }

    #[test]
    fn failed_search_clears_results_and_sets_message() {
        let (mut session, first) = SearchSession::mount(1);
        session.apply(first.tag, ok(main_and_oak()));

        let ticket = session.on_text_change("Oak");
        session.apply(ticket.tag, failed());
        assert!(session.results().is_empty());
        assert_eq!(session.error(), Some(SEARCH_FAILED));
        assert!(!session.is_loading());
    }

    #[test]
    fn failed_initial_load_uses_load_message() {
        let (mut session, ticket) = SearchSession::mount(1);
        session.apply(ticket.tag, failed());
        assert_eq!(session.error(), Some(LOAD_FAILED));
    }

    #[test]
    fn new_request_clears_previous_error() {
        let (mut session, ticket) = SearchSession::mount(1);
        session.apply(ticket.tag, failed());
        session.on_text_change("O");
        assert_eq!(session.error(), None);
        assert_eq!(session.state(), &ResultState::Loading);
    }

    /// Overlapping requests used to be applied in arrival order, so a slow
    /// response for "O" could replace the results for "Oak".
    #[test]
    fn out_of_order_responses_do_not_overwrite_newer_results() {
        let (mut session, first) = SearchSession::mount(1);
        session.apply(first.tag, ok(main_and_oak()));

        let slow = session.on_text_change("O");
        let fast = session.on_text_change("Oak");

        assert_eq!(
            session.apply(fast.tag, ok(vec![Station::new("2", "Oak Ave")])),
            Applied::Current
        );
        assert_eq!(session.apply(slow.tag, ok(main_and_oak())), Applied::Stale);
        assert_eq!(session.results(), &[Station::new("2", "Oak Ave")]);
    }

    #[test]
    fn stale_failure_does_not_mask_pending_request() {
        let (mut session, first) = SearchSession::mount(1);
        let second = session.on_text_change("Oak");

        assert_eq!(session.apply(first.tag, failed()), Applied::Stale);
        assert!(session.is_loading());
        assert_eq!(session.error(), None);

        session.apply(second.tag, ok(vec![Station::new("2", "Oak Ave")]));
        assert!(!session.is_loading());
    }

    #[test]
    fn responses_from_another_mount_are_ignored() {
        let (_old, old_ticket) = SearchSession::mount(1);
        let (mut session, _ticket) = SearchSession::mount(2);
        assert_eq!(old_ticket.tag.seq, 1);
        assert_eq!(session.apply(old_ticket.tag, ok(main_and_oak())), Applied::Stale);
        assert!(session.is_loading());
    }

    #[test]
    fn duplicate_delivery_is_stale() {
        let (mut session, ticket) = SearchSession::mount(1);
        assert_eq!(session.apply(ticket.tag, ok(main_and_oak())), Applied::Current);
        assert_eq!(session.apply(ticket.tag, failed()), Applied::Stale);
        assert_eq!(session.results(), main_and_oak().as_slice());
    }
}

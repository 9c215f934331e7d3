use crate::models::Station;

/// Message shown when the unfiltered catalog could not be fetched.
pub const LOAD_FAILED: &str = "failed to load stations";
/// Message shown when a filtered search could not be fetched.
pub const SEARCH_FAILED: &str = "search failed";

/// Where the current result set stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultState {
    /// A fetch is in flight.
    Loading,
    /// The latest fetch resolved with these stations, in server order.
    Success(Vec<Station>),
    /// The latest fetch failed.
    Error(String),
}

impl ResultState {
    /// Stations to display; empty unless the state is `Success`.
    pub fn results(&self) -> &[Station] {
        match self {
            ResultState::Success(stations) => stations,
            _ => &[],
        }
    }

    /// User-facing error message, if the latest fetch failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            ResultState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_state_has_no_results() {
        let state = ResultState::Error(SEARCH_FAILED.to_string());
        assert!(state.results().is_empty());
        assert_eq!(state.error(), Some("search failed"));
    }
}

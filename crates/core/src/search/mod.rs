//! Query controller and result state machine for station search.

mod session;
mod state;

pub use session::{Applied, FetchTag, FetchTicket, SearchSession, StationQuery};
pub use state::{ResultState, LOAD_FAILED, SEARCH_FAILED};

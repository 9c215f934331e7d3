//! Station catalog service access.
//!
//! The catalog exposes `GET /api/station` for the full list and
//! `GET /api/station?name=<query>` for a server-side name filter. Matching
//! semantics belong to the service; the client passes the query through.

mod client;
mod error;

use std::future::Future;

pub use client::StationClient;
pub use error::CatalogError;

use crate::{models::Station, search::StationQuery};

/// Anything that can answer station catalog queries.
pub trait StationCatalog: Send + Sync {
    /// Fetch the stations matching `query`, in server order.
    fn fetch(
        &self,
        query: &StationQuery,
    ) -> impl Future<Output = Result<Vec<Station>, CatalogError>> + Send;
}

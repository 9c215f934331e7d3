//! Shared domain models.

use serde::{Deserialize, Serialize};

/// A transit stop as returned by the station catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Opaque identifier, stable across fetches.
    pub id: String,
    /// Display name, also what users type to search.
    pub name: String,
}

impl Station {
    /// Build a station from its identifier and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Envelope wrapping every catalog response: `{ "data": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsResponse {
    /// Stations in server order.
    pub data: Vec<Station>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_ignores_unknown_fields() {
        let body = r#"{"data":[{"id":"1","name":"Main St","lat":51.5}],"total":1}"#;
        let response: StationsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data, vec![Station::new("1", "Main St")]);
    }
}

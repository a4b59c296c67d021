//! Correlation and request identifiers.

use uuid::Uuid;

/// Header carrying the correlation id in both directions.
pub const X_CORRELATION_ID: &str = "x-correlation-id";

/// Generate a fresh random id (UUID v4, hyphenated).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Where a request's correlation id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Inherited,
    Generated,
}

impl IdSource {
    pub fn as_str(self) -> &'static str {
        match self {
            IdSource::Inherited => "inherited",
            IdSource::Generated => "generated",
        }
    }
}

/// Reuse an inbound id when it is non-empty, otherwise generate one.
pub fn inherit_or_generate(inbound: Option<&str>) -> (String, IdSource) {
    match inbound.map(str::trim) {
        Some(id) if !id.is_empty() => (id.to_string(), IdSource::Inherited),
        _ => (generate_id(), IdSource::Generated),
    }
}

use thiserror::Error;

/// Failures surfaced by the aggregation layer. Both abort the computation
/// they occur in; nothing is substituted or logged-and-ignored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// A field expected to hold a base-10 integer string did not parse.
    #[error("invalid amount {value:?} in field `{field}`")]
    InvalidAmount { field: &'static str, value: String },

    /// A required event list was missing from the upstream response.
    #[error("event list `{0}` missing from upstream response")]
    DataUnavailable(&'static str),
}

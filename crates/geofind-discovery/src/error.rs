use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Latitude, longitude or radius absent from the request. Checked before
    /// any index or catalog work happens.
    #[error("missing required discovery parameters")]
    MissingParams,
}

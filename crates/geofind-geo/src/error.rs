use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoIndexError {
    /// Coordinate outside WGS84 ranges or not finite.
    #[error("invalid coordinate for '{id}': lat={lat}, lng={lng}")]
    InvalidCoordinate { id: String, lat: f64, lng: f64 },

    /// Backing store failure, for index implementations with external state.
    #[error("geo index store error: {0}")]
    Store(String),
}

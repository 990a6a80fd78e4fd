//! Viewport geometry.

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Southwest and northeast corners of the visible map area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

/// Camera state as reported by the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub bounds: Bounds,
    pub zoom: u8,
}

impl Viewport {
    /// Search radius in whole metres for the current bounds.
    ///
    /// Half the latitude span and half the longitude span form the legs of a
    /// right triangle; the hypotenuse, scaled by 100 000, approximates the
    /// centre-to-corner distance. The result is truncated to a whole metre.
    #[must_use]
    pub fn search_radius_m(&self) -> f64 {
        let half_lat = (self.bounds.north_east.lat - self.bounds.south_west.lat) / 2.0;
        let half_lng = (self.bounds.north_east.lng - self.bounds.south_west.lng) / 2.0;

        ((half_lat * half_lat + half_lng * half_lng).sqrt() * 100_000.0).trunc()
    }
}

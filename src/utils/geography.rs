//! Great-circle distance helpers shared by the location enricher and the
//! route optimizer.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance in kilometers between two (lat, lng) pairs using the Haversine
/// formula.
pub fn distance_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let lat1 = a.0.to_radians();
    let lat2 = b.0.to_radians();
    let delta_lat = (b.0 - a.0).to_radians();
    let delta_lng = (b.1 - a.1).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    c * EARTH_RADIUS_KM
}

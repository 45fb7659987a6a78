//! Great-circle distance estimation.

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two latitude/longitude points, in kilometers
/// rounded to one decimal place.
///
/// The formula is kept exactly in this shape so identical inputs yield
/// identical output on every platform.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
	let phi1 = lat1.to_radians();
	let phi2 = lat2.to_radians();
	let d_phi = phi2 - phi1;
	let d_lambda = (lng2 - lng1).to_radians();

	let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
	let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

	(EARTH_RADIUS_KM * c * 10.0).round() / 10.0
}

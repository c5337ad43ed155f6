//! Great-circle distance between WGS84 coordinates.
//!
//! Coordinates follow the `geo` convention of `x = longitude` and
//! `y = latitude`, both in degrees.

use geo::Coord;

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between `from` and `to`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use medroute_core::haversine_km;
///
/// let hyderabad = Coord { x: 78.4867, y: 17.3850 };
/// assert_eq!(haversine_km(hyderabad, hyderabad), 0.0);
/// ```
#[must_use]
pub fn haversine_km(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let d_lat = (to.y - from.y).to_radians();
    let d_lng = (to.x - from.x).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.y.to_radians().cos() * to.y.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Display form of a distance: two decimals followed by `" km"`.
///
/// ```
/// assert_eq!(medroute_core::format_km(4.2666), "4.27 km");
/// ```
#[must_use]
pub fn format_km(distance_km: f64) -> String {
    format!("{distance_km:.2} km")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn one_degree_of_latitude() {
        let d = haversine_km(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 });
        assert!((d - 111.194_926_644_558_73).abs() < 1e-9, "got {d}");
    }

    #[rstest]
    fn distance_is_symmetric() {
        let a = Coord { x: 78.4867, y: 17.3850 };
        let b = Coord { x: 80.6480, y: 16.5062 };
        let there = haversine_km(a, b);
        let back = haversine_km(b, a);
        assert!((there - back).abs() < 1e-9);
        assert!(there > 200.0 && there < 300.0, "got {there}");
    }

    #[rstest]
    #[case(0.0, "0.00 km")]
    #[case(4.2666, "4.27 km")]
    #[case(123.456, "123.46 km")]
    fn formats_two_decimals(#[case] km: f64, #[case] expected: &str) {
        assert_eq!(format_km(km), expected);
    }
}

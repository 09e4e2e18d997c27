//! Unit-sphere geometry shared by the aggregators.
//!
//! Averaging is always done on 3-D unit vectors; averaging raw degrees is wrong near the
//! date line and the poles.

use crate::domain::model::Coordinate;
use geo::{Distance, Haversine, Point};
use nalgebra::Vector3;
use serde::Serialize;

/// Mean earth radius, the same one `geo::Haversine` measures with.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// 小於此值的範數或權重視為數值崩潰
pub(crate) const NUMERIC_FLOOR: f64 = 1e-12;

pub(crate) type UnitVector = Vector3<f64>;

pub(crate) fn to_unit_vector(coord: Coordinate) -> UnitVector {
    let lat = coord.lat.to_radians();
    let lng = coord.lng.to_radians();
    Vector3::new(lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin())
}

/// atan2 重建不需要先正規化，但零向量附近結果沒有意義
pub(crate) fn to_coordinate(v: &UnitVector) -> Coordinate {
    let lng = v.y.atan2(v.x);
    let lat = v.z.atan2(v.x.hypot(v.y));
    Coordinate {
        lat: lat.to_degrees(),
        lng: lng.to_degrees(),
    }
}

/// Central angle in radians.
pub(crate) fn central_angle(a: &UnitVector, b: &UnitVector) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

impl From<Coordinate> for Point<f64> {
    fn from(coord: Coordinate) -> Self {
        Point::new(coord.lng, coord.lat)
    }
}

/// Great-circle distance in meters.
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
    Haversine::distance(Point::from(a), Point::from(b))
}

/// 參與者到中心點的距離統計（公尺）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FairnessMetrics {
    pub total_m: f64,
    pub max_m: f64,
}

impl FairnessMetrics {
    pub fn evaluate(participants: &[Coordinate], center: Coordinate) -> Self {
        participants
            .iter()
            .map(|p| haversine_meters(*p, center))
            .fold(
                Self {
                    total_m: 0.0,
                    max_m: 0.0,
                },
                |acc, d| Self {
                    total_m: acc.total_m + d,
                    max_m: acc.max_m.max(d),
                },
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    #[test]
    fn unit_vector_has_unit_norm() {
        for c in [coord(0.0, 0.0), coord(40.7, -74.0), coord(-89.9, 179.9)] {
            let v = to_unit_vector(c);
            assert!((v.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn transform_round_trips_away_from_poles() {
        let c = coord(34.0522, -118.2437);
        let back = to_coordinate(&to_unit_vector(c));
        assert!((back.lat - c.lat).abs() < 1e-9);
        assert!((back.lng - c.lng).abs() < 1e-9);
    }

    #[test]
    fn inverse_ignores_vector_length() {
        let v = to_unit_vector(coord(12.5, 45.0)) * 0.25;
        let back = to_coordinate(&v);
        assert!((back.lat - 12.5).abs() < 1e-9);
        assert!((back.lng - 45.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_rejects_zero_vector() {
        assert!(UnitVector::zeros().try_normalize(NUMERIC_FLOOR).is_none());
        let v = UnitVector::new(3.0, 0.0, 4.0)
            .try_normalize(NUMERIC_FLOOR)
            .unwrap();
        assert!((v.x - 0.6).abs() < 1e-12);
        assert!((v.z - 0.8).abs() < 1e-12);
    }

    #[test]
    fn angle_is_clamped_for_identical_vectors() {
        let v = to_unit_vector(coord(51.5, -0.12));
        assert_eq!(central_angle(&v, &v), 0.0);
        assert!((central_angle(&v, &-v) - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn haversine_quarter_meridian() {
        let d = haversine_meters(coord(0.0, 0.0), coord(90.0, 0.0));
        let expected = EARTH_RADIUS_M * std::f64::consts::FRAC_PI_2;
        assert!((d - expected).abs() < 1.0, "{} vs {}", d, expected);
    }

    #[test]
    fn haversine_nyc_to_la() {
        let d = haversine_meters(coord(40.7128, -74.0060), coord(34.0522, -118.2437));
        assert!((d - 3_935_750.0).abs() < 100.0);
    }

    #[test]
    fn haversine_agrees_with_central_angle() {
        let (a, b) = (coord(48.8566, 2.3522), coord(-33.8688, 151.2093));
        let angle = central_angle(&to_unit_vector(a), &to_unit_vector(b));
        let d = haversine_meters(a, b);
        assert!((d - angle * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn fairness_metrics_sum_and_max() {
        let center = coord(0.0, 0.0);
        let pts = [coord(0.0, 1.0), coord(0.0, -2.0)];
        let m = FairnessMetrics::evaluate(&pts, center);
        let one_degree = haversine_meters(center, coord(0.0, 1.0));
        assert!((m.total_m - 3.0 * one_degree).abs() < 1e-3);
        assert!((m.max_m - 2.0 * one_degree).abs() < 1e-3);
    }
}

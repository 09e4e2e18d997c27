//! Geodesic median (spherical Fermat–Weber point).
//!
//! Weiszfeld-style inverse-distance reweighting carried out on unit vectors. Each step
//! averages the participants weighted by `1 / angle`, then projects back onto the sphere.
//! The iteration decreases the summed distance in practice for well separated inputs, but
//! convergence is a heuristic guarantee, not a proven one; the iteration cap bounds the cost.

use crate::core::centroid::mean_vector;
use crate::core::sphere::{central_angle, to_coordinate, to_unit_vector, UnitVector, NUMERIC_FLOOR};
use crate::domain::model::Coordinate;
use crate::utils::error::{MeetError, Result};
use serde::Serialize;

/// Angular distance (radians) below which the estimate is treated as sitting on a participant.
const COINCIDENCE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedianOptions {
    pub tolerance: f64,
    pub max_iterations: usize,
    /// 估計點與參與者重合時使用的權重，取代發散的 1/d。
    /// 1e9 遠大於任何可達到的 1/d（d >= 1e-9 時 1/d <= 1e9），會把估計點拉向該參與者。
    pub coincidence_weight: f64,
}

impl Default for MedianOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            coincidence_weight: 1e9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    SingleParticipant,
    Converged,
    IterationLimit,
    /// 總權重低於數值下限，保留上一個估計
    WeightCollapse,
    /// 加權平均向量範數低於數值下限，保留上一個估計
    NormCollapse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedianSolution {
    pub center: Coordinate,
    pub iterations: usize,
    pub termination: Termination,
}

#[derive(Debug, Clone, Default)]
pub struct GeodesicMedian {
    options: MedianOptions,
}

impl GeodesicMedian {
    pub fn new(options: MedianOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MedianOptions {
        &self.options
    }

    /// 從質心開始迭代
    pub fn solve(&self, participants: &[Coordinate]) -> Result<MedianSolution> {
        match participants {
            [] => Err(MeetError::invalid_input("no coordinates provided")),
            [only] => Ok(MedianSolution {
                center: *only,
                iterations: 0,
                termination: Termination::SingleParticipant,
            }),
            _ => {
                let start = mean_vector(participants)?;
                Ok(self.iterate(participants, start))
            }
        }
    }

    /// 從指定的初始點開始迭代
    pub fn solve_from(
        &self,
        participants: &[Coordinate],
        initial: Coordinate,
    ) -> Result<MedianSolution> {
        match participants {
            [] => Err(MeetError::invalid_input("no coordinates provided")),
            [only] => Ok(MedianSolution {
                center: *only,
                iterations: 0,
                termination: Termination::SingleParticipant,
            }),
            _ => Ok(self.iterate(participants, to_unit_vector(initial))),
        }
    }

    fn iterate(&self, participants: &[Coordinate], start: UnitVector) -> MedianSolution {
        let vectors: Vec<UnitVector> = participants.iter().copied().map(to_unit_vector).collect();

        // 質心可能幾乎是零向量（對蹠點），這時只能原樣使用
        let mut current = start.try_normalize(NUMERIC_FLOOR).unwrap_or(start);
        let mut termination = Termination::IterationLimit;
        let mut iterations = 0;

        for _ in 0..self.options.max_iterations {
            iterations += 1;

            let mut total_weight = 0.0;
            let mut acc = UnitVector::zeros();
            for v in &vectors {
                let d = central_angle(&current, v);
                let w = if d < COINCIDENCE_EPSILON {
                    self.options.coincidence_weight
                } else {
                    1.0 / d
                };
                acc += v * w;
                total_weight += w;
            }

            if total_weight < NUMERIC_FLOOR {
                tracing::warn!(
                    "⚠️ Geodesic median weight collapsed at iteration {} (total {:.3e})",
                    iterations,
                    total_weight
                );
                termination = Termination::WeightCollapse;
                break;
            }

            let Some(next) = (acc / total_weight).try_normalize(NUMERIC_FLOOR) else {
                tracing::warn!(
                    "⚠️ Geodesic median weighted mean collapsed to zero at iteration {}",
                    iterations
                );
                termination = Termination::NormCollapse;
                break;
            };

            let change = (next - current).norm();
            current = next;
            if change < self.options.tolerance {
                termination = Termination::Converged;
                break;
            }
        }

        tracing::debug!(
            "Geodesic median finished after {} iterations ({:?})",
            iterations,
            termination
        );

        MedianSolution {
            center: to_coordinate(&current),
            iterations,
            termination,
        }
    }
}

/// 使用預設參數求測地中位數
pub fn geodesic_median(participants: &[Coordinate]) -> Result<Coordinate> {
    GeodesicMedian::default()
        .solve(participants)
        .map(|solution| solution.center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::centroid::centroid;
    use crate::core::sphere::FairnessMetrics;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    fn manhattan() -> Vec<Coordinate> {
        vec![
            coord(40.7589, -73.9851),
            coord(40.7614, -73.9776),
            coord(40.7505, -73.9934),
        ]
    }

    fn boroughs() -> Vec<Coordinate> {
        vec![
            coord(40.7589, -73.9851),
            coord(40.6782, -73.9442),
            coord(40.7282, -73.7949),
            coord(40.8448, -73.8648),
        ]
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            geodesic_median(&[]).unwrap_err(),
            MeetError::InvalidInput { .. }
        ));
        assert!(GeodesicMedian::default()
            .solve_from(&[], coord(0.0, 0.0))
            .is_err());
    }

    #[test]
    fn single_participant_is_returned_exactly() {
        let p = coord(-33.8688, 151.2093);
        let solution = GeodesicMedian::default().solve(&[p]).unwrap();
        assert_eq!(solution.center, p);
        assert_eq!(solution.termination, Termination::SingleParticipant);
        assert_eq!(centroid(&[p]).unwrap().lat, p.lat);
    }

    #[test]
    fn two_participants_give_the_great_circle_midpoint() {
        let nyc = coord(40.7128, -74.0060);
        let la = coord(34.0522, -118.2437);
        let median = geodesic_median(&[nyc, la]).unwrap();
        let mid = centroid(&[nyc, la]).unwrap();

        // 中點在大圓弧上：與法向量正交
        let normal = to_unit_vector(nyc)
            .cross(&to_unit_vector(la))
            .try_normalize(NUMERIC_FLOOR)
            .unwrap();
        for c in [median, mid] {
            let v = to_unit_vector(c);
            let cross_track_m = v.dot(&normal).asin().abs() * crate::core::sphere::EARTH_RADIUS_M;
            assert!(cross_track_m < 1.0, "cross-track {} m", cross_track_m);
        }
        let d_nyc = crate::core::sphere::haversine_meters(median, nyc);
        let d_la = crate::core::sphere::haversine_meters(median, la);
        assert!((d_nyc - d_la).abs() < 1.0);
    }

    #[test]
    fn symmetric_ring_around_pole_agrees_with_centroid() {
        let ring: Vec<_> = (0..5).map(|i| coord(70.0, -180.0 + 72.0 * i as f64)).collect();
        let median = geodesic_median(&ring).unwrap();
        let mid = centroid(&ring).unwrap();
        assert!((median.lat - 90.0).abs() < 1e-4);
        assert!((mid.lat - 90.0).abs() < 1e-4);
    }

    #[test]
    fn median_never_increases_total_distance() {
        let triangle = vec![
            coord(40.7589, -73.9851),
            coord(41.8781, -87.6298),
            coord(29.7604, -95.3698),
        ];
        for pts in [manhattan(), boroughs(), triangle] {
            let c = FairnessMetrics::evaluate(&pts, centroid(&pts).unwrap());
            let m = FairnessMetrics::evaluate(&pts, geodesic_median(&pts).unwrap());
            assert!(m.total_m <= c.total_m + 1e-6, "{} > {}", m.total_m, c.total_m);
        }
    }

    #[test]
    fn median_beats_centroid_on_city_scale_groups() {
        // 大範圍分布時這個不等式不保證成立，只在城市尺度上檢查
        let mut rng = StdRng::seed_from_u64(20_251_019);
        for _ in 0..200 {
            let base = coord(rng.gen_range(-60.0..60.0), rng.gen_range(-179.0..179.0));
            let n = rng.gen_range(3..=8);
            let pts: Vec<_> = (0..n)
                .map(|_| {
                    coord(
                        base.lat + rng.gen_range(-0.05..0.05),
                        base.lng + rng.gen_range(-0.05..0.05),
                    )
                })
                .collect();
            let c = FairnessMetrics::evaluate(&pts, centroid(&pts).unwrap());
            let m = FairnessMetrics::evaluate(&pts, geodesic_median(&pts).unwrap());
            assert!(
                m.total_m <= c.total_m + 1e-3,
                "{:?}: {} > {}",
                pts,
                m.total_m,
                c.total_m
            );
        }
    }

    #[test]
    fn continental_triangle_stops_at_iteration_cap() {
        // 收斂很慢，重跑仍會移動，但總距離依然不比質心差
        let pts = vec![
            coord(40.7589, -73.9851),
            coord(41.8781, -87.6298),
            coord(29.7604, -95.3698),
        ];
        let solver = GeodesicMedian::default();
        let solution = solver.solve(&pts).unwrap();
        assert_eq!(solution.termination, Termination::IterationLimit);
        assert_eq!(solution.iterations, solver.options().max_iterations);
    }

    #[test]
    fn outlier_pulls_centroid_more_than_median() {
        let mut pts = manhattan();
        pts.push(coord(40.6782, -73.9442));

        let c = centroid(&pts).unwrap();
        let m = geodesic_median(&pts).unwrap();
        let c_metrics = FairnessMetrics::evaluate(&pts, c);
        let m_metrics = FairnessMetrics::evaluate(&pts, m);
        assert!(m_metrics.total_m < c_metrics.total_m);

        // 中位數停留在曼哈頓群附近
        let cluster_center = centroid(&manhattan()).unwrap();
        let m_shift = crate::core::sphere::haversine_meters(m, cluster_center);
        let c_shift = crate::core::sphere::haversine_meters(c, cluster_center);
        assert!(m_shift < c_shift);
    }

    #[test]
    fn clustered_points_stay_close_together() {
        let pts = manhattan();
        let c = centroid(&pts).unwrap();
        let m = geodesic_median(&pts).unwrap();
        assert!(crate::core::sphere::haversine_meters(c, m) < 500.0);
    }

    #[test]
    fn rerunning_from_converged_point_is_stable() {
        let solver = GeodesicMedian::default();
        let pts = boroughs();
        let first = solver.solve(&pts).unwrap();
        assert_eq!(first.termination, Termination::Converged);

        let second = solver.solve_from(&pts, first.center).unwrap();
        let moved = (to_unit_vector(first.center) - to_unit_vector(second.center)).norm();
        assert!(moved < solver.options().tolerance, "moved {}", moved);
    }

    #[test]
    fn coincident_start_is_pulled_to_participant() {
        let pts = vec![coord(0.0, 0.0), coord(0.0, 10.0), coord(10.0, 0.0)];
        let solution = GeodesicMedian::default()
            .solve_from(&pts, pts[0])
            .unwrap();
        assert!(solution.center.lat.is_finite());
        assert!(crate::core::sphere::haversine_meters(solution.center, pts[0]) < 1.0);
    }

    #[test]
    fn iteration_cap_is_respected() {
        let solver = GeodesicMedian::new(MedianOptions {
            tolerance: 0.0,
            max_iterations: 3,
            ..MedianOptions::default()
        });
        let solution = solver.solve(&boroughs()).unwrap();
        assert_eq!(solution.iterations, 3);
        assert_eq!(solution.termination, Termination::IterationLimit);
    }
}

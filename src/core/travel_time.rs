use crate::domain::model::{Coordinate, DurationMatrix, Venue};
use crate::domain::ports::DurationMatrixSource;

/// 以群體總行車時間重新排序場地。矩陣不可用時原樣返回。
pub struct TravelTimeReranker<M: DurationMatrixSource> {
    matrix_source: M,
}

/// 重排結果；`applied` 表示行車時間訊號是否生效
#[derive(Debug, Clone)]
pub struct RerankOutcome {
    pub venues: Vec<Venue>,
    pub applied: bool,
}

impl<M: DurationMatrixSource> TravelTimeReranker<M> {
    pub fn new(matrix_source: M) -> Self {
        Self { matrix_source }
    }

    pub async fn rerank(
        &self,
        participants: &[Coordinate],
        venues: Vec<Venue>,
        profile: &str,
    ) -> RerankOutcome {
        if venues.is_empty() || participants.is_empty() {
            return RerankOutcome {
                venues,
                applied: false,
            };
        }

        let destinations: Vec<Coordinate> = venues.iter().map(|v| v.location).collect();
        let Some(matrix) = self
            .matrix_source
            .fetch_duration_matrix(profile, participants, &destinations)
            .await
        else {
            tracing::warn!("⏱️ Duration matrix unavailable, keeping candidate order");
            return RerankOutcome {
                venues,
                applied: false,
            };
        };

        match venue_totals(&matrix, participants.len(), venues.len()) {
            Some(totals) => RerankOutcome {
                venues: sort_by_totals(venues, &totals),
                applied: true,
            },
            None => {
                tracing::warn!(
                    "⏱️ Duration matrix shape does not match {}x{}, keeping candidate order",
                    participants.len(),
                    venues.len()
                );
                RerankOutcome {
                    venues,
                    applied: false,
                }
            }
        }
    }
}

/// Column sums of the matrix (total group travel time per venue).
/// Returns `None` when the matrix is not `rows x cols`.
pub fn venue_totals(matrix: &DurationMatrix, rows: usize, cols: usize) -> Option<Vec<f64>> {
    if matrix.len() != rows || matrix.iter().any(|row| row.len() != cols) {
        return None;
    }
    let mut totals = vec![0.0; cols];
    for row in matrix {
        for (total, seconds) in totals.iter_mut().zip(row) {
            *total += seconds;
        }
    }
    Some(totals)
}

fn sort_by_totals(venues: Vec<Venue>, totals: &[f64]) -> Vec<Venue> {
    let mut indexed: Vec<(f64, Venue)> = totals.iter().copied().zip(venues).collect();
    // sort_by 是穩定排序，總時間相同時保留原順序
    indexed.sort_by(|a, b| a.0.total_cmp(&b.0));
    indexed.into_iter().map(|(_, venue)| venue).collect()
}

use crate::core::sphere::{to_coordinate, to_unit_vector, UnitVector, NUMERIC_FLOOR};
use crate::domain::model::Coordinate;
use crate::utils::error::{MeetError, Result};

/// 平均單位向量（未正規化）
pub(crate) fn mean_vector(participants: &[Coordinate]) -> Result<UnitVector> {
    if participants.is_empty() {
        return Err(MeetError::invalid_input("no coordinates provided"));
    }
    let sum: UnitVector = participants.iter().copied().map(to_unit_vector).sum();
    Ok(sum / participants.len() as f64)
}

/// Mean-direction midpoint of the participants.
///
/// The mean vector is converted back without normalization; atan2 only needs its direction.
/// When the participants cancel out (e.g. an antipodal pair) the mean is close to the zero
/// vector and the returned point is numerically meaningless. That case is logged, not repaired.
pub fn centroid(participants: &[Coordinate]) -> Result<Coordinate> {
    let mean = mean_vector(participants)?;
    if mean.norm() < NUMERIC_FLOOR {
        tracing::warn!(
            "⚠️ Centroid of {} participants is degenerate (mean vector norm {:.3e})",
            participants.len(),
            mean.norm()
        );
    }
    Ok(to_coordinate(&mean))
}

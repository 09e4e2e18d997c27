use crate::core::centroid::centroid;
use crate::core::median::GeodesicMedian;
use crate::core::semantic::SemanticRanker;
use crate::core::travel_time::TravelTimeReranker;
use crate::domain::model::{Coordinate, MeetingPlan, Objective, PipelineParams, SignalsApplied};
use crate::domain::ports::{DurationMatrixSource, Embedder, VenueSource};
use crate::utils::error::{MeetError, Result};
use std::fmt;

/// Pipeline 階段，依序執行，不會回頭
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Aggregate,
    Retrieve,
    TimeRerank,
    SemanticRank,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Aggregate => "AGGREGATE",
            Stage::Retrieve => "RETRIEVE",
            Stage::TimeRerank => "TIME_RERANK",
            Stage::SemanticRank => "SEMANTIC_RANK",
            Stage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Orchestrates aggregation, retrieval and the two reranking signals.
///
/// Each invocation owns its intermediate data; the pipeline keeps no state between runs.
pub struct MeetingPipeline<V: VenueSource, M: DurationMatrixSource, E: Embedder> {
    venue_source: V,
    travel_time: TravelTimeReranker<M>,
    semantic: SemanticRanker<E>,
    median: GeodesicMedian,
}

impl<V: VenueSource, M: DurationMatrixSource, E: Embedder> MeetingPipeline<V, M, E> {
    pub fn new(venue_source: V, matrix_source: M, embedder: E) -> Self {
        Self {
            venue_source,
            travel_time: TravelTimeReranker::new(matrix_source),
            semantic: SemanticRanker::new(embedder),
            median: GeodesicMedian::default(),
        }
    }

    pub fn with_median_solver(mut self, median: GeodesicMedian) -> Self {
        self.median = median;
        self
    }

    /// 只計算中心點，不查詢場地
    pub fn aggregate(&self, participants: &[Coordinate], objective: Objective) -> Result<Coordinate> {
        if participants.is_empty() {
            return Err(MeetError::invalid_input("no participants provided"));
        }
        for p in participants {
            p.validate()?;
        }
        match objective {
            Objective::Centroid => centroid(participants),
            Objective::Median => {
                let solution = self.median.solve(participants)?;
                tracing::debug!(
                    "Median solver: {} iterations, {:?}",
                    solution.iterations,
                    solution.termination
                );
                Ok(solution.center)
            }
        }
    }

    pub async fn run(
        &self,
        participants: &[Coordinate],
        query: &str,
        params: &PipelineParams,
    ) -> Result<MeetingPlan> {
        log_stage(Stage::Aggregate);
        let center = self.aggregate(participants, params.objective)?;
        tracing::info!(
            "📍 Center {} from {} participants ({})",
            center,
            participants.len(),
            params.objective
        );

        log_stage(Stage::Retrieve);
        let candidates = self
            .venue_source
            .fetch_candidate_venues(center, params.radius_meters, params.candidate_limit)
            .await;
        tracing::info!(
            "🏪 {} candidate venues within {} m",
            candidates.len(),
            params.radius_meters
        );

        log_stage(Stage::TimeRerank);
        let reranked = self
            .travel_time
            .rerank(participants, candidates, &params.travel_mode)
            .await;

        log_stage(Stage::SemanticRank);
        let ranked = self.semantic.rank(query, reranked.venues).await;

        // 截斷只在最後一個階段之後進行
        let mut venues = ranked.venues;
        venues.truncate(params.result_cap);

        log_stage(Stage::Done);
        tracing::info!(
            "✅ Ranked {} venues (travel time: {}, semantic: {})",
            venues.len(),
            reranked.applied,
            ranked.applied
        );

        Ok(MeetingPlan {
            center,
            objective: params.objective,
            venues,
            signals: SignalsApplied {
                travel_time: reranked.applied,
                semantic: ranked.applied,
            },
            generated_at: chrono::Utc::now(),
        })
    }
}

fn log_stage(stage: Stage) {
    tracing::debug!("Pipeline stage: {}", stage);
}

use crate::core::pipeline::MeetingPipeline;
use crate::domain::model::{Event, MeetingPlan, PipelineParams};
use crate::domain::ports::{DurationMatrixSource, Embedder, EventStore, VenueSource};
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FinalizedEvent {
    pub event: Event,
    #[serde(flatten)]
    pub plan: MeetingPlan,
}

/// 定案活動：標記為 final，並以活動標題作為語意查詢執行 pipeline
pub async fn finalize_event<S, V, M, E>(
    store: &S,
    pipeline: &MeetingPipeline<V, M, E>,
    event_id: &str,
    params: &PipelineParams,
) -> Result<FinalizedEvent>
where
    S: EventStore,
    V: VenueSource,
    M: DurationMatrixSource,
    E: Embedder,
{
    let event = store.finalize(event_id).await?;
    tracing::info!(
        "🏁 Finalizing event {} with {} participants",
        event.id,
        event.participants.len()
    );

    let plan = pipeline
        .run(&event.coordinates(), &event.title, params)
        .await?;

    Ok(FinalizedEvent { event, plan })
}

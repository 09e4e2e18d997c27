use crate::adapters::embedding::{EmbeddingBackend, HashEmbedder, HttpEmbedder};
use crate::adapters::osrm::{DisabledMatrixSource, MatrixBackend, OsrmMatrixSource};
use crate::adapters::overpass::OverpassVenueSource;
use crate::config::toml_config::ServiceConfig;
use crate::core::median::GeodesicMedian;
use crate::core::pipeline::MeetingPipeline;
use crate::utils::error::Result;

pub type ConfiguredPipeline = MeetingPipeline<OverpassVenueSource, MatrixBackend, EmbeddingBackend>;

/// 依服務設定建立各個 adapter 與 pipeline
pub fn build_pipeline(config: &ServiceConfig) -> Result<ConfiguredPipeline> {
    let overpass = config.overpass();
    tracing::info!("🗺️ Venue source: {}", overpass.endpoint);
    let venue_source = OverpassVenueSource::new(overpass.endpoint, overpass.timeout)?;

    let matrix = match config.osrm() {
        Some(osrm) => {
            tracing::info!("⏱️ Travel-time matrix: {}", osrm.endpoint);
            MatrixBackend::Osrm(OsrmMatrixSource::new(osrm.endpoint, osrm.timeout)?)
        }
        None => {
            tracing::info!("⏱️ Travel-time matrix disabled");
            MatrixBackend::Disabled(DisabledMatrixSource)
        }
    };

    let embedder = match config.embedding() {
        Some(embedding) => {
            tracing::info!("🧠 Embedding service: {}", embedding.endpoint);
            EmbeddingBackend::Http(HttpEmbedder::new(&embedding.endpoint, embedding.timeout)?)
        }
        None => {
            let hash = HashEmbedder::new(config.hash_dimensions());
            tracing::info!(
                "🧠 Using local hash embeddings ({} dimensions)",
                hash.dimensions()
            );
            EmbeddingBackend::Hash(hash)
        }
    };

    let median = GeodesicMedian::new(config.median_options());
    tracing::debug!(
        "Geodesic median: tolerance {:e}, at most {} iterations",
        median.options().tolerance,
        median.options().max_iterations
    );

    Ok(MeetingPipeline::new(venue_source, matrix, embedder).with_median_solver(median))
}

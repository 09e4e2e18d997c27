// Adapters layer: concrete implementations of the domain ports (map data, routing,
// embeddings, event storage).

pub mod embedding;
pub mod osrm;
pub mod overpass;
pub mod store;

pub use embedding::{EmbeddingBackend, HashEmbedder, HttpEmbedder};
pub use osrm::{DisabledMatrixSource, MatrixBackend, OsrmMatrixSource};
pub use overpass::OverpassVenueSource;
pub use store::MemoryEventStore;

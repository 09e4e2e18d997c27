pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ServiceConfig;

pub use adapters::{MemoryEventStore, OverpassVenueSource};
pub use crate::core::centroid::centroid;
pub use crate::core::median::{geodesic_median, GeodesicMedian, MedianOptions};
pub use crate::core::pipeline::MeetingPipeline;
pub use domain::model::{Coordinate, MeetingPlan, Objective, PipelineParams, Venue};
pub use utils::error::{MeetError, Result};

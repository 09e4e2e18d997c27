pub mod centroid;
pub mod median;
pub mod pipeline;
pub mod semantic;
pub mod sphere;
pub mod travel_time;

pub use crate::domain::model::{Coordinate, MeetingPlan, Objective, PipelineParams, Venue};
pub use crate::domain::ports::{DurationMatrixSource, Embedder, EventStore, VenueSource};
pub use crate::utils::error::Result;

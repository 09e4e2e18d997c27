// Domain layer: value types and ports (interfaces) to the external services.

pub mod model;
pub mod ports;

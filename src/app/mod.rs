pub mod finalize;
pub mod report;
pub mod service;

pub mod aggregation_service;
pub mod catalog;
pub mod metrics;
pub mod query_service;
pub mod youtube_service;

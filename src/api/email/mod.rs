pub mod extraction;
pub mod handlers;
pub mod service;

pub use service::EmailIngestionPipeline;

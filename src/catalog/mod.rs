pub mod evaluator;
pub mod filters;
pub mod options;
pub mod planner;
pub mod ranking;
pub mod service;

pub use filters::FilterSpecification;
pub use service::CatalogService;

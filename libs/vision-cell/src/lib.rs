pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AnalysisReport, Detection, VisionAnalysisRecord, VisionError};
pub use router::vision_routes;
pub use services::*;

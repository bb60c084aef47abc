pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Emotion, MentalHealthRecord, WellbeingMetrics};
pub use router::haven_routes;
pub use services::*;

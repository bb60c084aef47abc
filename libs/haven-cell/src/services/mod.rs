pub mod companion;
pub mod emotion;
pub mod metrics;
pub mod records;

pub use companion::{shape_conversation, shorten_reply, CompanionService};
pub use emotion::{classify, estimate_pitch, EmotionAnalyzer, FrameReading};
pub use metrics::{wellbeing_metrics, WellbeingService};
pub use records::MentalHealthRecordService;

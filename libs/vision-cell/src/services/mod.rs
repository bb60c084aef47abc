pub mod analysis;
pub mod catalog;
pub mod parsing;
pub mod records;
pub mod upload;

pub use analysis::{ImageAnalysisService, ImageClassifier, DISCLAIMER};
pub use catalog::{detect_model_from_filename, find_model, MedicalModel, MEDICAL_MODELS};
pub use parsing::{parse_detection, parse_explanation, parse_findings};
pub use records::VisionAnalysisStore;
pub use upload::{read_image_upload, validate_image, MAX_IMAGE_BYTES, MAX_UPLOAD_BODY_BYTES};

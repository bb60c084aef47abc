pub mod clinics;
pub mod directory;
pub mod recommendation;
pub mod specialization;

pub use clinics::ClinicLocator;
pub use directory::DoctorDirectory;
pub use recommendation::RecommendationService;
pub use specialization::{infer_specialization, specialization_aliases, Specialization};

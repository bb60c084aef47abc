pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Appointment, AppointmentError, AppointmentStatus};
pub use router::{doctor_appointment_routes, patient_appointment_routes};

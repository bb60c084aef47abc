pub mod password;
pub mod user;
pub mod validation;

pub use password::PasswordService;
pub use user::UserService;

pub mod password_reset_token;
pub mod sample;
pub mod user;

pub use password_reset_token::PasswordResetToken;
pub use sample::{Sample, SampleChanges, SampleResponse};
pub use user::User;

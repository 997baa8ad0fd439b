pub mod password_reset_tokens;
pub mod samples;
pub mod users;

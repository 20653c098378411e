pub mod conversations;
pub mod health;
pub mod stream;
pub mod upload;

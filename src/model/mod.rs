pub mod admin;
pub mod auth;
pub mod candidate;
mod id;
pub mod settings;
pub mod voter;

pub use id::Id;

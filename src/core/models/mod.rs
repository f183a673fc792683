//! Data model for the onboarding pipeline

pub mod batch;
pub mod trainee;

pub use batch::*;
pub use trainee::*;

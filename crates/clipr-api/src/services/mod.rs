//! Business logic services.

pub mod clip;

pub use clip::{start_clip, ClipJob};

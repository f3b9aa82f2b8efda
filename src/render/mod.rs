//! Text render caching
//!
//! Memoizes the layout/vertex work for repeatedly drawn strings behind
//! a 64-bit request fingerprint.

pub mod cache;

pub use cache::{TextRenderCache, NO_TEXT};

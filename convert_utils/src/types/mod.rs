//! Type-Safe Wrappers Module
//!
//! - `quality`: 0-100 encoder quality hint

pub mod quality;

pub use quality::{Quality, QUALITY_MAX, QUALITY_MIN};

// ============================================================================
// Property-Based Tests
// ============================================================================

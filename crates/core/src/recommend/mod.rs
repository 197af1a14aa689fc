//! Purpose-driven format recommendation.

mod engine;
mod types;

pub use engine::RecommendationEngine;
pub use types::{FormatRecommendation, Platform, Purpose, QualityPreference, UserIntent};

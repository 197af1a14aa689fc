//! Named quality presets.
//!
//! Four presets ship built in (`fast`, `balanced`, `high_quality`,
//! `original`). Configuration can override any field of a built-in preset
//! or add new ones; lookups of unknown names fall back to `balanced`.

mod catalog;
mod types;

pub use catalog::{PresetCatalog, DEFAULT_PRESET};
pub use types::{GifPresetSettings, PresetOverride, QualityPreset, WebmPresetSettings};

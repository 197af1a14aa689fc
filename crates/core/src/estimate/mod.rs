//! Heuristic size, time and timeout estimation.
//!
//! Two families of estimators live here and are intentionally separate:
//!
//! - [`gif_size_bytes`] / [`webm_size_bytes`]: advisory estimates used when
//!   recommending a format, before any settings are chosen.
//! - [`gif_engine_estimate`] / [`webm_engine_estimate`]: coarser per-engine
//!   estimates for a concrete settings choice.
//!
//! Everything is pure. Repeated advisory lookups can go through an
//! [`EstimateCache`], which is owned by whoever needs it and cleared
//! explicitly.

mod cache;
mod formulas;
mod timing;
mod types;

pub use cache::{EstimateCache, DEFAULT_CACHE_CAPACITY};
pub use formulas::{
    estimate_gif_size, estimate_webm_size, format_file_size, gif_engine_estimate, gif_size_bytes,
    webm_engine_estimate, webm_size_bytes,
};
pub use timing::{calculate_timeout, calculate_timeout_default, predict_conversion_time};
pub use types::{EstimateResult, QualityClass};

pub(crate) const MIB: f64 = 1024.0 * 1024.0;
pub(crate) const FULL_HD_PIXELS: f64 = 1920.0 * 1080.0;

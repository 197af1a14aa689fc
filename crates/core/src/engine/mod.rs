//! Per-format conversion engines.
//!
//! Each engine owns a lazily loaded [`Transcoder`](crate::transcoder::Transcoder)
//! handle for its whole lifetime and keeps no state between conversions.
//!
//! # Example
//!
//! ```rust,ignore
//! use shareclip_core::engine::{ConversionEngine, GifEngine};
//! use shareclip_core::format::GifSettings;
//!
//! let engine = GifEngine::new(Arc::new(FfmpegTranscoder::new(&config.transcoder)));
//! let observer: ProgressObserver = Arc::new(|pct| println!("{}%", pct));
//! let gif = engine.convert(&resource, &GifSettings::default().into(), Some(observer)).await?;
//! ```

mod error;
mod gif;
mod runtime;
mod traits;
mod webm;

pub use error::ConversionError;
pub use gif::GifEngine;
pub use traits::{ConversionEngine, EngineState, ProgressObserver};
pub use webm::WebmEngine;

pub mod command;
pub mod config;
pub mod engine;
pub mod estimate;
pub mod format;
pub mod metadata;
pub mod presets;
pub mod recommend;
pub mod session;
pub mod testing;
pub mod transcoder;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use engine::{
    ConversionEngine, ConversionError, EngineState, GifEngine, ProgressObserver, WebmEngine,
};
pub use estimate::{EstimateCache, EstimateResult, QualityClass};
pub use format::{
    ConversionSettings, FormatMap, GifQuality, GifSettings, OutputFormat, VideoCodec,
    WebmSettings,
};
pub use metadata::{
    AnalyzedMetadata, FileResource, MetadataAnalyzer, MetadataError, UploadError, VideoMetadata,
};
pub use presets::{PresetCatalog, QualityPreset};
pub use recommend::{FormatRecommendation, Purpose, RecommendationEngine, UserIntent};
pub use session::{
    ConversionJobState, ConversionRequest, ConversionResults, JobStatus, SessionHandle,
    SessionOrchestrator, SessionStatus,
};
pub use transcoder::{FfmpegTranscoder, Transcoder, TranscoderError};

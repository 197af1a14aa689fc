//! Conversion sessions.
//!
//! A session converts one upload into every requested format, one job at a
//! time, GIF before WebM. Job failures never escape: each one becomes a
//! terminal job state and the session still assembles a result.

mod handle;
mod orchestrator;
mod race;
mod types;

pub use handle::SessionHandle;
pub use orchestrator::{CompletionCallback, SessionOrchestrator};
pub use race::{race, Raced};
pub use types::{
    ConversionJobState, ConversionRequest, ConversionResults, JobStatus, ResultMetadata,
    SessionPhase, SessionStatus,
};

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::types::{
    ConversionJobState, ConversionResults, SessionPhase, SessionStatus,
};
use crate::format::OutputFormat;

#[derive(Debug)]
struct HandleState {
    phase: SessionPhase,
    jobs: Vec<ConversionJobState>,
    result: Option<Arc<ConversionResults>>,
    finished_at: Option<DateTime<Utc>>,
}

/// Shared view of one running session.
///
/// Job state is behind a std mutex because engine progress observers run
/// synchronously and must not await.
#[derive(Debug)]
pub struct SessionHandle {
    id: String,
    created_at: DateTime<Utc>,
    cancelled: AtomicBool,
    state: Mutex<HandleState>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            cancelled: AtomicBool::new(false),
            state: Mutex::new(HandleState {
                phase: SessionPhase::Running,
                jobs: Vec::new(),
                result: None,
                finished_at: None,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> SessionStatus {
        let state = self.lock();
        SessionStatus {
            id: self.id.clone(),
            phase: state.phase,
            jobs: state.jobs.clone(),
            overall_progress: mean_progress(&state.jobs),
            created_at: self.created_at,
            finished_at: state.finished_at,
            result: state.result.as_ref().map(|r| r.metadata.clone()),
        }
    }

    /// Arithmetic mean of per-job progress.
    pub fn overall_progress(&self) -> u8 {
        mean_progress(&self.lock().jobs)
    }

    pub fn job(&self, format: OutputFormat) -> Option<ConversionJobState> {
        self.lock().jobs.iter().find(|j| j.format == format).cloned()
    }

    /// Request cooperative cancellation.
    ///
    /// The job in flight runs to completion; remaining jobs are skipped and
    /// the session result is discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let mut state = self.lock();
        if state.phase == SessionPhase::Running {
            state.phase = SessionPhase::Cancelled;
            state.finished_at = Some(Utc::now());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the session ended at least `retention` before `now`.
    /// Running sessions never expire.
    pub fn is_expired(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        self.lock()
            .finished_at
            .is_some_and(|finished| finished + retention <= now)
    }

    /// Results of a session that completed without being cancelled.
    pub fn result(&self) -> Option<Arc<ConversionResults>> {
        self.lock().result.clone()
    }

    pub(crate) fn reset_jobs(&self, formats: &[OutputFormat]) {
        self.lock().jobs = formats
            .iter()
            .map(|f| ConversionJobState::pending(*f))
            .collect();
    }

    pub(crate) fn update_job(&self, format: OutputFormat, f: impl FnOnce(&mut ConversionJobState)) {
        if let Some(job) = self.lock().jobs.iter_mut().find(|j| j.format == format) {
            f(job);
        }
    }

    /// Store the result unless the session was cancelled. Returns whether it
    /// was accepted.
    pub(crate) fn finish(&self, result: Arc<ConversionResults>) -> bool {
        let mut state = self.lock();
        if self.is_cancelled() {
            return false;
        }
        state.phase = SessionPhase::Completed;
        state.result = Some(result);
        state.finished_at = Some(Utc::now());
        true
    }

    fn lock(&self) -> MutexGuard<'_, HandleState> {
        // A panicking observer must not wedge the session.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn mean_progress(jobs: &[ConversionJobState]) -> u8 {
    if jobs.is_empty() {
        return 0;
    }
    let total: u32 = jobs.iter().map(|j| u32::from(j.progress)).sum();
    (total as f64 / jobs.len() as f64).round() as u8
}

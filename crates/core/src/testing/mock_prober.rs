//! Mock duration prober for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::converter::{ConversionStage, ConverterError, DurationProber};

/// What the mock reports when probed.
#[derive(Debug, Clone)]
pub enum ProbeBehavior {
    /// Report this many seconds.
    Duration(f64),
    /// Fail with a probe error.
    Fail(String),
    /// Block until cancelled.
    Hang,
}

/// Mock implementation of the DurationProber trait.
#[derive(Debug, Clone)]
pub struct MockDurationProber {
    behavior: Arc<RwLock<ProbeBehavior>>,
    calls: Arc<RwLock<usize>>,
}

impl Default for MockDurationProber {
    fn default() -> Self {
        Self::with_duration_secs(60.0)
    }
}

impl MockDurationProber {
    pub fn new(behavior: ProbeBehavior) -> Self {
        Self {
            behavior: Arc::new(RwLock::new(behavior)),
            calls: Arc::new(RwLock::new(0)),
        }
    }

    pub fn with_duration_secs(seconds: f64) -> Self {
        Self::new(ProbeBehavior::Duration(seconds))
    }

    pub fn with_duration_minutes(minutes: f64) -> Self {
        Self::with_duration_secs(minutes * 60.0)
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(ProbeBehavior::Fail(reason.into()))
    }

    pub fn hanging() -> Self {
        Self::new(ProbeBehavior::Hang)
    }

    /// Get the number of probes performed.
    pub async fn call_count(&self) -> usize {
        *self.calls.read().await
    }
}

#[async_trait]
impl DurationProber for MockDurationProber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe_duration(
        &self,
        _input: &Path,
        cancel: &CancellationToken,
    ) -> Result<f64, ConverterError> {
        *self.calls.write().await += 1;
        let behavior = self.behavior.read().await.clone();

        match behavior {
            ProbeBehavior::Duration(seconds) => Ok(seconds),
            ProbeBehavior::Fail(reason) => Err(ConverterError::probe_failed(reason)),
            ProbeBehavior::Hang => {
                cancel.cancelled().await;
                Err(ConverterError::Cancelled {
                    stage: ConversionStage::ProbingDuration,
                })
            }
        }
    }
}

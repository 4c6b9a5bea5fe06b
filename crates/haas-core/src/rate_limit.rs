// ── Creation rate limiter ──
//
// Minimum spacing between successive create calls of the same kind.
// Blocking, never dropping: a gated call waits, then proceeds.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::trace;

use crate::model::ResourceKind;

/// Default spacing between dataset creations.
pub const DEFAULT_DATASET_SPACING: Duration = Duration::from_millis(500);

/// Per-kind delay gate for the creation path.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    spacing: HashMap<ResourceKind, Duration>,
    last_call: HashMap<ResourceKind, Instant>,
}

impl RateLimiter {
    /// A limiter with no spacing for any kind.
    pub fn unlimited() -> Self {
        Self {
            spacing: HashMap::new(),
            last_call: HashMap::new(),
        }
    }

    /// Set the minimum spacing for `kind`. `Duration::ZERO` disables the gate.
    #[must_use]
    pub fn with_spacing(mut self, kind: ResourceKind, spacing: Duration) -> Self {
        if spacing.is_zero() {
            self.spacing.remove(&kind);
        } else {
            self.spacing.insert(kind, spacing);
        }
        self
    }

    pub fn spacing(&self, kind: ResourceKind) -> Duration {
        self.spacing.get(&kind).copied().unwrap_or(Duration::ZERO)
    }

    /// Wait until a create call of `kind` may proceed, then mark it as issued.
    pub async fn acquire(&mut self, kind: ResourceKind) {
        let spacing = self.spacing(kind);
        if spacing.is_zero() {
            return;
        }

        if let Some(&last) = self.last_call.get(&kind) {
            let ready_at = last + spacing;
            if ready_at > Instant::now() {
                let wait_ms = (ready_at - Instant::now()).as_millis();
                trace!(%kind, wait_ms, "rate limiting create");
                sleep_until(ready_at).await;
            }
        }

        self.last_call.insert(kind, Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::unlimited().with_spacing(ResourceKind::Dataset, DEFAULT_DATASET_SPACING)
    }
}

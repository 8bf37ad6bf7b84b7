//! Modifier/LED reconcile timer (C6), scoped to one [`crate::channel::Channel`]
//! instance rather than the process-wide global variable the donor source
//! uses — the spec's REDESIGN FLAG calls this out explicitly (§9).
//!
//! Mirrors the `reds_core_timer_add`/`reds_core_timer_start` collaborator
//! pair (§6): the channel owns a [`TimerDriver`] and re-arms it on every
//! lock-key press or `KEY_MODIFIERS` message. Re-arming before expiry
//! restarts the one-shot countdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// TTL for the LED-reconcile timer (§4.6).
pub const LED_RECONCILE_TTL: Duration = Duration::from_secs(2);

/// A one-shot, re-armable timer collaborator. Implementations must make
/// `arm` cancel any previously scheduled firing for the same driver
/// instance (the spec's "re-arming before expiry restarts the countdown").
pub trait TimerDriver: Send + Sync {
    fn arm(&self, ttl: Duration, on_fire: Arc<dyn Fn() + Send + Sync>);
}

/// Tokio-backed [`TimerDriver`]. Each `arm` call bumps a shared generation
/// counter; a previously spawned sleep that wakes up holding a stale
/// generation is a no-op, which is how re-arming "cancels" it without
/// needing an explicit `JoinHandle`.
#[derive(Clone, Default)]
pub struct TokioTimerDriver {
    generation: Arc<AtomicU64>,
}

impl TokioTimerDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerDriver for TokioTimerDriver {
    fn arm(&self, ttl: Duration, on_fire: Arc<dyn Fn() + Send + Sync>) {
        let generation = Arc::clone(&self.generation);
        let my_generation = generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if generation.load(Ordering::SeqCst) == my_generation {
                on_fire();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_ttl() {
        // Arrange
        let driver = TokioTimerDriver::new();
        let fired = Arc::new(Mutex::new(0u32));
        let fired_clone = Arc::clone(&fired);

        // Act
        driver.arm(
            Duration::from_millis(50),
            Arc::new(move || {
                *fired_clone.lock().unwrap() += 1;
            }),
        );
        tokio::time::advance(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;

        // Assert
        assert_eq!(*fired.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_before_expiry_suppresses_the_earlier_firing() {
        // Arrange
        let driver = TokioTimerDriver::new();
        let fired = Arc::new(Mutex::new(Vec::<&'static str>::new()));

        // Act: arm once, then re-arm before it would fire
        let f1 = Arc::clone(&fired);
        driver.arm(Duration::from_millis(100), Arc::new(move || f1.lock().unwrap().push("first")));
        tokio::time::advance(Duration::from_millis(50)).await;
        let f2 = Arc::clone(&fired);
        driver.arm(Duration::from_millis(100), Arc::new(move || f2.lock().unwrap().push("second")));
        tokio::time::advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        // Assert: only the re-armed firing happened
        assert_eq!(*fired.lock().unwrap(), vec!["second"]);
    }
}

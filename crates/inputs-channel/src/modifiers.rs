//! Lock-key LED bits and the reconciliation logic driven by `KEY_MODIFIERS`
//! (§4.6). The scheduling half (arm/fire) lives in [`crate::timer`]; this
//! module is the pure diff-and-inject logic plus the scoped timer wrapper
//! that the channel owns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use inputs_core::protocol::messages::{SCANCODE_CAPS_LOCK, SCANCODE_NUM_LOCK, SCANCODE_SCROLL_LOCK};

use crate::timer::{TimerDriver, LED_RECONCILE_TTL};

/// Keyboard LED bits, VT-ioctl ordering (scroll, num, caps).
pub const LED_SCROLL: u8 = 0x01;
pub const LED_NUM: u8 = 0x02;
pub const LED_CAPS: u8 = 0x04;

/// Per-channel LED-reconcile timer (C6). Scoped to the owning `Channel`
/// instance — see the REDESIGN FLAG note in `timer.rs`.
pub struct LedReconciler {
    driver: Box<dyn TimerDriver>,
    due: Arc<AtomicBool>,
}

impl LedReconciler {
    pub fn new(driver: Box<dyn TimerDriver>) -> Self {
        Self {
            driver,
            due: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Arms (or re-arms) the one-shot countdown. Re-arming before expiry
    /// restarts it, per §4.6.
    pub fn arm(&self) {
        let due = Arc::clone(&self.due);
        self.driver.arm(
            LED_RECONCILE_TTL,
            Arc::new(move || {
                due.store(true, Ordering::SeqCst);
            }),
        );
    }

    /// Polled by the embedding event loop each tick. Returns true exactly
    /// once per firing, so the caller can push current LEDs to every client.
    pub fn poll_and_clear(&self) -> bool {
        self.due.swap(false, Ordering::SeqCst)
    }
}

/// For each of the three lock bits whose client-requested value differs
/// from `current_leds`, returns the press-then-release scancode pair to
/// inject, in order scroll-lock, num-lock, caps-lock (§4.6).
pub fn modifiers_diff(requested: u8, current_leds: u8) -> Vec<(u8, u8)> {
    let mut pairs = Vec::new();
    for (bit, code) in [
        (LED_SCROLL, SCANCODE_SCROLL_LOCK),
        (LED_NUM, SCANCODE_NUM_LOCK),
        (LED_CAPS, SCANCODE_CAPS_LOCK),
    ] {
        if (requested & bit) != (current_leds & bit) {
            let code = code as u8;
            pairs.push((code, code | 0x80));
        }
    }
    pairs
}

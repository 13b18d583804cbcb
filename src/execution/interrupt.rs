//! Ctrl-C handling around interactive children.
//!
//! The terminal delivers SIGINT to the whole foreground process group.
//! While an interactive child runs we survive it and let the child decide;
//! outside of that window Ctrl-C exits the tool as usual.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

use tracing::warn;

static INSTALL: Once = Once::new();
static ACTIVE: AtomicBool = AtomicBool::new(false);
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Exit code used when Ctrl-C arrives with no interactive child running.
const SIGINT_EXIT_CODE: i32 = 130;

fn install() {
    INSTALL.call_once(|| {
        let result = ctrlc::set_handler(|| {
            if ACTIVE.load(Ordering::SeqCst) {
                INTERRUPTED.store(true, Ordering::SeqCst);
            } else {
                std::process::exit(SIGINT_EXIT_CODE);
            }
        });
        if let Err(e) = result {
            warn!("could not install interrupt handler: {}", e);
        }
    });
}

/// Marks an interactive child as running for as long as it lives.
pub(crate) struct InterruptGuard {
    active: bool,
}

impl InterruptGuard {
    /// Install the process-wide handler (once) and mark a child as running.
    pub(crate) fn begin() -> Self {
        install();
        INTERRUPTED.store(false, Ordering::SeqCst);
        ACTIVE.store(true, Ordering::SeqCst);
        Self { active: true }
    }

    /// A guard that leaves SIGINT handling to the embedding program.
    pub(crate) fn passive() -> Self {
        Self { active: false }
    }

    /// Whether Ctrl-C arrived since [`begin`](Self::begin).
    pub(crate) fn interrupted(&self) -> bool {
        self.active && INTERRUPTED.load(Ordering::SeqCst)
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if self.active {
            ACTIVE.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_starts_uninterrupted() {
        let guard = InterruptGuard::begin();
        assert!(!guard.interrupted());
    }

    #[test]
    fn test_passive_guard_never_reports_interrupt() {
        INTERRUPTED.store(true, Ordering::SeqCst);
        let guard = InterruptGuard::passive();
        assert!(!guard.interrupted());
        drop(guard);
        INTERRUPTED.store(false, Ordering::SeqCst);
    }
}

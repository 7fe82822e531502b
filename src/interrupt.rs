//! Ctrl+C handling
//!
//! Before dispatch starts, a press exits right away. While tasks run, the
//! first press asks workers to stop taking new tasks and the second one
//! forces an exit. Presses are tracked apart from the dispatcher's own stop
//! flag, so a strict-mode abort never counts as a press.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit code used when the process is stopped by Ctrl+C
pub const FORCED_EXIT_CODE: i32 = 130;

/// What a Ctrl+C press should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// Nothing is running yet
    Exit,
    /// Let running tasks finish, start no new ones
    Graceful,
    /// Second press while tasks run
    Force,
}

/// User interrupt state shared between the signal handler and workers
#[derive(Debug, Default)]
pub struct Interrupt {
    armed: AtomicBool,
    requested: AtomicBool,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark that tasks are about to run
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Whether the user asked to stop
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Register one press
    pub fn press(&self) -> Press {
        if !self.armed.load(Ordering::SeqCst) {
            return Press::Exit;
        }
        if self.requested.swap(true, Ordering::SeqCst) {
            Press::Force
        } else {
            Press::Graceful
        }
    }
}

/// Install the process-wide Ctrl+C handler for `interrupt`
pub fn install_handler(interrupt: Arc<Interrupt>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || match interrupt.press() {
        Press::Exit => process::exit(FORCED_EXIT_CODE),
        Press::Graceful => {
            eprintln!("\nInterrupt received, finishing running tasks... (press Ctrl+C again to force)");
        }
        Press::Force => {
            eprintln!("\nForce shutdown!");
            process::exit(FORCED_EXIT_CODE);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_before_dispatch_exits() {
        let interrupt = Interrupt::new();
        assert_eq!(interrupt.press(), Press::Exit);
        assert!(!interrupt.is_requested());
    }

    #[test]
    fn test_second_press_forces() {
        let interrupt = Interrupt::new();
        interrupt.arm();
        assert_eq!(interrupt.press(), Press::Graceful);
        assert!(interrupt.is_requested());
        assert_eq!(interrupt.press(), Press::Force);
    }
}

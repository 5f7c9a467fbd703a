//! Best-effort batch cancellation, checked between files only. An encode
//! already in flight always runs to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Routes Ctrl+C to `flag`. Can only be installed once per process.
pub fn install_ctrlc_handler(flag: &CancelFlag) -> Result<(), ctrlc::Error> {
    let flag = flag.clone();
    ctrlc::set_handler(move || {
        if !flag.is_cancelled() {
            eprintln!("\n⚠️  Interrupt received: finishing current file, skipping the rest...");
        }
        flag.cancel();
    })
}

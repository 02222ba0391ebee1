use anyhow::Result;
use heatsweep_core::SweepError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Shared "stop now" flag. The CLI hands [`Interrupt::flag`] to a SIGINT
/// handler; passes poll it between grid points.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_set() {
            return Err(SweepError::Interrupted.into());
        }
        Ok(())
    }

    /// Sleeps for `duration`, waking early with an error if interrupted.
    pub fn sleep(&self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_fails_once_triggered() {
        let interrupt = Interrupt::new();
        assert!(interrupt.check().is_ok());
        interrupt.flag().store(true, Ordering::SeqCst);
        let err = interrupt.check().expect_err("interrupted");
        assert!(SweepError::is_interrupted(&err));
    }

    #[test]
    fn sleep_returns_early_when_interrupted() {
        let interrupt = Interrupt::new();
        let remote = interrupt.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(60));
            remote.trigger();
        });
        let started = Instant::now();
        let result = interrupt.sleep(Duration::from_secs(10));
        handle.join().expect("join");
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn zero_sleep_is_immediate() {
        assert!(Interrupt::new().sleep(Duration::ZERO).is_ok());
    }
}

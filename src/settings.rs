//! The two externally-owned scalar settings and their change observer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::engine::Command;

pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 5000;

/// Uniform read access to the poll interval and logging toggle, regardless
/// of where the values are persisted.
pub trait SettingsProvider {
    fn interval(&self) -> Duration;
    fn logging_enabled(&self) -> bool;
}

pub fn clamp_interval_ms(ms: u64) -> u64 {
    ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
}

/// In-process settings store. Interval changes are published on a watch
/// channel so the engine can restart its timer; the logging toggle is a
/// shared flag read by the client on every fetch.
pub struct Settings {
    interval_tx: watch::Sender<Duration>,
    logging: Arc<AtomicBool>,
}

impl Settings {
    pub fn new(interval_ms: u64, logging_enabled: bool) -> Self {
        let interval = Duration::from_millis(clamp_interval_ms(interval_ms));
        let (interval_tx, _) = watch::channel(interval);
        Self {
            interval_tx,
            logging: Arc::new(AtomicBool::new(logging_enabled)),
        }
    }

    pub fn set_interval_ms(&self, ms: u64) {
        let interval = Duration::from_millis(clamp_interval_ms(ms));
        self.interval_tx.send_if_modified(|current| {
            if *current == interval {
                false
            } else {
                *current = interval;
                true
            }
        });
    }

    pub fn set_logging_enabled(&self, enabled: bool) {
        self.logging.store(enabled, Ordering::Relaxed);
    }

    /// Flag handle for collaborators that gate diagnostics per call.
    pub fn logging_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.logging)
    }

    pub fn subscribe_interval(&self) -> watch::Receiver<Duration> {
        self.interval_tx.subscribe()
    }
}

impl SettingsProvider for Settings {
    fn interval(&self) -> Duration {
        *self.interval_tx.borrow()
    }

    fn logging_enabled(&self) -> bool {
        self.logging.load(Ordering::Relaxed)
    }
}

/// Forward interval changes to the engine as commands. Runs until either
/// side of the channel pair goes away.
pub async fn forward_interval_changes(
    mut interval_rx: watch::Receiver<Duration>,
    commands: mpsc::Sender<Command>,
) {
    while interval_rx.changed().await.is_ok() {
        let interval = *interval_rx.borrow_and_update();
        if commands
            .send(Command::IntervalChanged(interval))
            .await
            .is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_clamped_to_range() {
        assert_eq!(clamp_interval_ms(50), MIN_INTERVAL_MS);
        assert_eq!(clamp_interval_ms(100), 100);
        assert_eq!(clamp_interval_ms(1000), 1000);
        assert_eq!(clamp_interval_ms(9999), MAX_INTERVAL_MS);
    }

    #[test]
    fn out_of_range_construction_is_clamped() {
        let settings = Settings::new(7000, false);
        assert_eq!(settings.interval(), Duration::from_millis(MAX_INTERVAL_MS));
    }

    #[tokio::test]
    async fn interval_change_reaches_subscriber() {
        let settings = Settings::new(1000, false);
        let mut rx = settings.subscribe_interval();
        settings.set_interval_ms(500);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn unchanged_interval_is_not_republished() {
        let settings = Settings::new(1000, false);
        let mut rx = settings.subscribe_interval();
        settings.set_interval_ms(1000);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn logging_flag_is_shared() {
        let settings = Settings::new(1000, false);
        let flag = settings.logging_flag();
        settings.set_logging_enabled(true);
        assert!(flag.load(Ordering::Relaxed));
        assert!(settings.logging_enabled());
    }
}

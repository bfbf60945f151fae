//! Best-effort alerts for qualifying symbols.
//!
//! Alerts are fire-and-forget: a notifier never returns an error and never
//! blocks the scan. Cooldown state is owned by the notifier instance, which the
//! session owns, so nothing is shared across connections.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::AlertConfig;

/// Sink for alerts raised during a scan.
pub trait Notifier: Send {
    /// Raise an alert for `symbol`. Returns whether it was delivered.
    fn notify(&mut self, symbol: &str, message: &str) -> bool;
}

/// Writes alerts to the log, at most once per symbol per cooldown.
#[derive(Debug)]
pub struct LogNotifier {
    enabled: bool,
    cooldown: Duration,
    /// symbol -> last delivered alert
    last_alert: HashMap<String, Instant>,
}

impl LogNotifier {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            enabled: config.enabled,
            cooldown: Duration::from_secs(config.cooldown_secs),
            last_alert: HashMap::new(),
        }
    }

    /// Deliver unless the symbol alerted within the cooldown before `now`.
    pub fn notify_at(&mut self, symbol: &str, message: &str, now: Instant) -> bool {
        if !self.enabled {
            return false;
        }

        if let Some(last) = self.last_alert.get(symbol) {
            if now.saturating_duration_since(*last) < self.cooldown {
                debug!(symbol, "Alert suppressed by cooldown");
                return false;
            }
        }

        warn!(symbol, "🔔 ALERT: {}", message);
        self.last_alert.insert(symbol.to_string(), now);
        true
    }
}

impl Notifier for LogNotifier {
    fn notify(&mut self, symbol: &str, message: &str) -> bool {
        self.notify_at(symbol, message, Instant::now())
    }
}

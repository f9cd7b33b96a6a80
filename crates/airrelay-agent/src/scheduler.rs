// ============================================
// File: crates/airrelay-agent/src/scheduler.rs
// ============================================
//! # Cycle Scheduler
//!
//! ## Creation Reason
//! Drives the fetch-then-forward cycle: once at startup, then on a fixed
//! interval. A failed cycle is logged and the loop waits for the next
//! tick; only a shutdown signal ends the loop.
//!
//! ## Main Functionality
//! - `Cycle`: trait for one unit of work (lets tests script failures)
//! - `Relay`: the real cycle - sensor fetch, then forward
//! - `CycleReport`: structured outcome, printed as JSON in one-shot mode
//! - `Scheduler`: interval loop with shutdown handling
//!
//! ## Loop Shape
//! ```text
//! ┌──────── Idle (await tick / shutdown) ◄──────┐
//! │                                             │
//! ▼ tick                                        │
//! Running: cycle.run().await  ── log outcome ───┘
//! ```
//! Ticks are awaited inline, so cycles never overlap. The first tick of
//! `tokio::time::interval` fires immediately, which is what realizes
//! "run one cycle on startup".
//!
//! ## ⚠️ Important Note for Next Developer
//! - Nothing inside a cycle may panic the loop: all failure paths return
//!   a failure `CycleReport`
//! - The interval is minutes against cycles of seconds; `Delay` missed
//!   tick behavior keeps a slow cycle from causing a tick burst
//!
//! ## Last Modified
//! v0.1.0 - Initial scheduler implementation

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use airrelay_core::{Forwarder, Reading, SensorClient};

use crate::config::AgentConfig;

// ============================================
// CycleReport
// ============================================

/// Outcome of one fetch-then-forward cycle.
///
/// This is the externally observable contract of one-shot mode: the
/// `once` subcommand prints it as JSON and maps it to the process exit
/// code.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// `"success"` or `"failure"`.
    pub status: &'static str,
    /// The forwarded reading, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<Reading>,
    /// Failure description, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the failure class is plausibly transient.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub transient: bool,
}

impl CycleReport {
    /// Builds a success report carrying the forwarded reading.
    #[must_use]
    pub fn success(reading: Reading) -> Self {
        Self {
            status: "success",
            reading: Some(reading),
            error: None,
            transient: false,
        }
    }

    /// Builds a failure report.
    #[must_use]
    pub fn failure(error: impl Into<String>, transient: bool) -> Self {
        Self {
            status: "failure",
            reading: None,
            error: Some(error.into()),
            transient,
        }
    }

    /// Returns `true` for a success report.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================
// Cycle
// ============================================

/// One schedulable unit of work.
///
/// The scheduler is generic over this trait so its resilience can be
/// tested with scripted cycles instead of live HTTP.
pub trait Cycle: Send + Sync {
    /// Runs one cycle. Must not panic; failures are reported.
    fn run(&self) -> impl Future<Output = CycleReport> + Send;
}

// ============================================
// Relay
// ============================================

/// The production cycle: fetch one sensor status, forward it.
#[derive(Debug)]
pub struct Relay {
    sensor: SensorClient,
    forwarder: Forwarder,
}

impl Relay {
    /// Builds the relay from validated configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            sensor: SensorClient::new(config.credentials()),
            forwarder: Forwarder::new(config.thingspeak.api_key.clone()),
        }
    }
}

impl Cycle for Relay {
    async fn run(&self) -> CycleReport {
        let reading = match self.sensor.fetch_status().await {
            Ok(reading) => reading,
            Err(e) => {
                return CycleReport::failure(
                    format!("sensor fetch failed: {}", e),
                    e.is_transient(),
                );
            }
        };

        if reading.is_empty() {
            // 2xx with none of the expected fields: skip forwarding so
            // ThingSpeak never records a phantom data point.
            return CycleReport::failure("sensor reported no usable fields", false);
        }

        match self.forwarder.forward(&reading).await {
            Ok(()) => CycleReport::success(reading),
            Err(e) => {
                CycleReport::failure(format!("forward failed: {}", e), e.is_transient())
            }
        }
    }
}

// ============================================
// Scheduler
// ============================================

/// Interval-driven cycle runner.
#[derive(Debug)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    /// Creates a scheduler with the given tick interval.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Creates a scheduler from the configured interval in minutes.
    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        // Saturate rather than overflow on absurd configured intervals.
        Self::new(Duration::from_secs(
            config.scheduler.interval_minutes.saturating_mul(60),
        ))
    }

    /// Runs cycles until a shutdown signal is received.
    ///
    /// The first cycle runs immediately; afterwards one cycle per tick.
    /// Cycle failures are logged and never terminate the loop.
    pub async fn run<C: Cycle>(self, cycle: C, mut shutdown: broadcast::Receiver<()>) {
        info!(
            "Scheduler started (interval {}s)",
            self.interval.as_secs()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_failures = 0u32;

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let report = cycle.run().await;
                    if report.is_success() {
                        consecutive_failures = 0;
                    } else {
                        consecutive_failures += 1;
                        let reason = report.error.as_deref().unwrap_or("unknown");
                        if report.transient && consecutive_failures < 3 {
                            warn!("Cycle failed: {}", reason);
                        } else {
                            error!(
                                "Cycle failed ({} consecutive): {}",
                                consecutive_failures, reason
                            );
                        }
                    }
                }
            }
        }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct Scripted {
        runs: Arc<AtomicU32>,
        succeed: bool,
    }

    impl Cycle for Scripted {
        async fn run(&self) -> CycleReport {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                CycleReport::success(Reading {
                    temperature: Some(21.0),
                    humidity: Some(50.0),
                    co2: Some(450.0),
                })
            } else {
                CycleReport::failure("scripted failure", true)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_runs_immediately() {
        let runs = Arc::new(AtomicU32::new(0));
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(Scheduler::new(Duration::from_secs(600)).run(
            Scripted {
                runs: Arc::clone(&runs),
                succeed: true,
            },
            rx,
        ));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_the_loop() {
        let runs = Arc::new(AtomicU32::new(0));
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(Scheduler::new(Duration::from_secs(60)).run(
            Scripted {
                runs: Arc::clone(&runs),
                succeed: false,
            },
            rx,
        ));

        // Startup tick plus two interval ticks, every one failing.
        tokio::time::sleep(Duration::from_secs(121)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_ticking() {
        let runs = Arc::new(AtomicU32::new(0));
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(Scheduler::new(Duration::from_secs(60)).run(
            Scripted {
                runs: Arc::clone(&runs),
                succeed: true,
            },
            rx,
        ));

        tokio::time::sleep(Duration::from_millis(1)).await;
        tx.send(()).unwrap();
        handle.await.unwrap();

        let after_shutdown = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_shutdown);
    }

    #[test]
    fn test_from_config_saturates_huge_intervals() {
        let mut config = AgentConfig::default();
        config.scheduler.interval_minutes = u64::MAX;

        let scheduler = Scheduler::from_config(&config);
        assert_eq!(scheduler.interval, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_from_config_interval_in_minutes() {
        let mut config = AgentConfig::default();
        config.scheduler.interval_minutes = 5;

        let scheduler = Scheduler::from_config(&config);
        assert_eq!(scheduler.interval, Duration::from_secs(300));
    }

    #[test]
    fn test_report_json_shape_success() {
        let report = CycleReport::success(Reading {
            temperature: Some(22.1),
            humidity: None,
            co2: Some(410.0),
        });
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["reading"]["temperature"], 22.1);
        assert!(json.get("error").is_none());
        assert!(json.get("transient").is_none());
    }

    #[test]
    fn test_report_json_shape_failure() {
        let report = CycleReport::failure("sensor fetch failed: timeout", true);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "failure");
        assert_eq!(json["error"], "sensor fetch failed: timeout");
        assert_eq!(json["transient"], true);
        assert!(json.get("reading").is_none());
    }
}

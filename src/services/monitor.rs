//! Alert monitor loop
//!
//! Polls the sample source, steps the engine and forwards visibility changes
//! to the sink at a fixed interval.

use crate::config::ObsConfig;
use crate::domain::Sample;
use crate::engine::{AlertEngine, Phase, Transition, POLL_INTERVAL};
use crate::sink::AlertSink;
use crate::source::SampleSource;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Granularity of shutdown checks while waiting between ticks
const WAIT_SLICE: Duration = Duration::from_millis(100);

/// Configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between ticks
    pub interval: Duration,
    /// Whether to exit after one tick
    pub single_use: bool,
    /// Overlay source name, for log lines
    pub overlay: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            single_use: false,
            overlay: ObsConfig::default().source,
        }
    }
}

/// Alert monitor
///
/// Owns the engine and both collaborators. The sink is called only when the
/// decision differs from the last value it accepted.
pub struct Monitor<S, K> {
    config: MonitorConfig,
    engine: AlertEngine,
    source: S,
    sink: K,
    applied: Option<bool>,
    sink_failures: u32,
}

impl<S: SampleSource, K: AlertSink> Monitor<S, K> {
    /// Create a new monitor
    pub fn new(config: MonitorConfig, engine: AlertEngine, source: S, sink: K) -> Self {
        Self {
            config,
            engine,
            source,
            sink,
            applied: None,
            sink_failures: 0,
        }
    }

    /// Poll once and apply the decision
    pub fn tick(&mut self) -> bool {
        let sample = self.source.poll();
        self.process(&sample, sample.timestamp)
    }

    /// Step the engine with a sample and apply the decision
    pub fn process(&mut self, sample: &Sample, now: Instant) -> bool {
        let step = self.engine.advance(sample, now);
        for transition in &step.transitions {
            self.log_transition(transition);
        }
        self.apply(step.visible);
        step.visible
    }

    /// Run until `running` is cleared, then hide the overlay
    pub fn run(&mut self, running: &AtomicBool) {
        log::info!(
            "Monitoring started (poll every {:?}, sink: {})",
            self.config.interval,
            self.sink.name()
        );

        while running.load(Ordering::SeqCst) {
            self.tick();

            if self.config.single_use {
                log::info!("Single-use mode: exiting after one tick");
                break;
            }

            self.wait(running);
        }

        self.shutdown();
    }

    /// Hide the overlay if it is showing
    pub fn shutdown(&mut self) {
        if self.applied == Some(true) {
            log::info!("Hiding overlay before exit");
            self.apply(false);
        }
    }

    /// Delay before the next tick
    pub fn next_delay(&self) -> Duration {
        self.source
            .retry_delay()
            .map_or(self.config.interval, |d| d.max(self.config.interval))
    }

    fn wait(&self, running: &AtomicBool) {
        let delay = self.next_delay();
        let started = Instant::now();
        while running.load(Ordering::SeqCst) {
            let elapsed = started.elapsed();
            if elapsed >= delay {
                break;
            }
            std::thread::sleep(WAIT_SLICE.min(delay - elapsed));
        }
    }

    fn apply(&mut self, visible: bool) {
        if self.applied == Some(visible) {
            return;
        }

        match self.sink.set_visible(visible) {
            Ok(()) => {
                if self.sink_failures > 0 {
                    log::info!(
                        "Overlay updates via {} recovered after {} failed attempts",
                        self.sink.name(),
                        self.sink_failures
                    );
                }
                self.sink_failures = 0;
                self.applied = Some(visible);
            }
            Err(e) => {
                self.sink_failures = self.sink_failures.saturating_add(1);
                log::log!(
                    failure_log_level(self.sink_failures),
                    "Failed to {} overlay via {}: {}",
                    if visible { "show" } else { "hide" },
                    self.sink.name(),
                    e
                );
            }
        }
    }

    fn log_transition(&self, transition: &Transition) {
        let (level, message) = self.describe(transition);
        log::log!(level, "{}", message);
    }

    /// Operator log line for a transition
    fn describe(&self, transition: &Transition) -> (log::Level, String) {
        let config = self.engine.config();
        let overlay = &self.config.overlay;
        match transition {
            Transition::Connected => (
                log::Level::Info,
                format!(
                    "Stream detected. Skipping quality checks for the first {} seconds...",
                    config.warmup().as_secs()
                ),
            ),
            Transition::WarmupComplete => (
                log::Level::Info,
                "Warmup complete, monitoring stream quality".to_string(),
            ),
            Transition::Triggered(reason) => (
                log::Level::Warn,
                format!(
                    "Stream quality warning - {} (shown for {} seconds, next alert in {} seconds) [{} shown]",
                    reason,
                    config.display().as_secs_f64(),
                    config.display().as_secs_f64() + config.cooldown().as_secs_f64(),
                    overlay
                ),
            ),
            Transition::DisplayEnded => (
                log::Level::Info,
                format!("Stream quality warning ended [{} hidden]", overlay),
            ),
            Transition::CooldownEnded => {
                (log::Level::Debug, "Cooldown over, alerts re-armed".to_string())
            }
            Transition::Disconnected { from: Phase::Active } => (
                log::Level::Warn,
                format!("Stream lost while warning was shown [{} hidden]", overlay),
            ),
            Transition::Disconnected { from } => {
                (log::Level::Info, format!("Stream lost during {}", from))
            }
        }
    }

    /// Engine state
    pub fn engine(&self) -> &AlertEngine {
        &self.engine
    }

    /// Sample source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Alert sink
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Last value the sink accepted
    pub fn applied(&self) -> Option<bool> {
        self.applied
    }

    /// Consecutive failed sink calls since the last success
    pub fn sink_failures(&self) -> u32 {
        self.sink_failures
    }

    /// Get the monitor configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}

/// Only the first failure in a run is a warning; the sink logs its own
/// reconnect attempts, so repeats go to debug.
fn failure_log_level(consecutive: u32) -> log::Level {
    if consecutive <= 1 {
        log::Level::Warn
    } else {
        log::Level::Debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Degradation;
    use crate::engine::EngineConfig;
    use crate::mock::{timeline, RecordingSink, ScriptedSource};

    fn engine() -> AlertEngine {
        AlertEngine::new(EngineConfig::new(2000.0, 700.0, 30.0, 600.0).unwrap())
    }

    fn monitor(samples: Vec<Sample>) -> Monitor<ScriptedSource, RecordingSink> {
        Monitor::new(
            MonitorConfig::default(),
            engine(),
            ScriptedSource::new(samples),
            RecordingSink::new(),
        )
    }

    const GOOD: Option<(f64, f64)> = Some((5000.0, 50.0));
    const LOW: Option<(f64, f64)> = Some((1000.0, 50.0));

    #[test]
    fn test_monitor_config_default() {
        let config = MonitorConfig::default();
        assert_eq!(config.interval, Duration::from_secs(2));
        assert!(!config.single_use);
    }

    #[test]
    fn test_first_tick_syncs_hidden() {
        let mut monitor = monitor(timeline(Instant::now(), &[(0, None)]));
        assert!(!monitor.tick());
        assert_eq!(monitor.sink().calls(), &[false]);
        assert_eq!(monitor.applied(), Some(false));
    }

    #[test]
    fn test_sink_called_only_on_change() {
        let t0 = Instant::now();
        let mut points = vec![(0, GOOD)];
        points.extend((16..=50).step_by(2).map(|s| (s, LOW)));
        let mut monitor = monitor(timeline(t0, &points));

        for _ in 0..points.len() {
            monitor.tick();
        }

        // hidden at startup, shown at 16, hidden at 46
        assert_eq!(monitor.sink().calls(), &[false, true, false]);
        assert_eq!(monitor.engine().phase(), Phase::Cooldown);
    }

    #[test]
    fn test_no_consecutive_duplicate_calls() {
        let t0 = Instant::now();
        let points: Vec<(u64, Option<(f64, f64)>)> = (0..400)
            .map(|i| {
                let reading = match i % 7 {
                    0 => None,
                    1 | 2 => LOW,
                    _ => GOOD,
                };
                (i * 2, reading)
            })
            .collect();
        let mut monitor = monitor(timeline(t0, &points));
        for _ in 0..points.len() {
            monitor.tick();
        }

        let calls = monitor.sink().calls();
        assert!(calls.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn test_failed_apply_is_retried() {
        let t0 = Instant::now();
        let mut failing = Monitor::new(
            MonitorConfig::default(),
            engine(),
            ScriptedSource::new(timeline(t0, &[(0, GOOD), (16, LOW), (18, LOW)])),
            {
                let mut sink = RecordingSink::new();
                sink.fail_next(2);
                sink
            },
        );
        failing.tick(); // hide fails
        failing.tick(); // show fails
        assert_eq!(failing.applied(), None);
        failing.tick(); // show succeeds
        assert_eq!(failing.sink().calls(), &[true]);
        assert_eq!(failing.applied(), Some(true));
    }

    #[test]
    fn test_disconnect_hides_immediately() {
        let t0 = Instant::now();
        let mut monitor = monitor(timeline(t0, &[(0, GOOD), (16, LOW), (20, None)]));
        monitor.tick();
        assert!(monitor.tick());
        assert!(!monitor.tick());
        assert_eq!(monitor.sink().calls(), &[false, true, false]);
    }

    #[test]
    fn test_shutdown_hides_visible_overlay() {
        let t0 = Instant::now();
        let mut monitor = monitor(timeline(t0, &[(0, GOOD), (16, LOW)]));
        monitor.tick();
        monitor.tick();
        monitor.shutdown();
        assert_eq!(monitor.sink().calls(), &[false, true, false]);
    }

    #[test]
    fn test_shutdown_when_hidden_is_noop() {
        let mut monitor = monitor(timeline(Instant::now(), &[(0, GOOD)]));
        monitor.tick();
        monitor.shutdown();
        assert_eq!(monitor.sink().calls(), &[false]);
    }

    #[test]
    fn test_run_single_use() {
        let mut monitor = Monitor::new(
            MonitorConfig {
                interval: Duration::from_millis(10),
                single_use: true,
                ..Default::default()
            },
            engine(),
            ScriptedSource::new(timeline(Instant::now(), &[(0, GOOD)])),
            RecordingSink::new(),
        );
        let running = AtomicBool::new(true);
        monitor.run(&running);
        assert_eq!(monitor.engine().phase(), Phase::Warmup);
        assert_eq!(monitor.sink().calls(), &[false]);
    }

    #[test]
    fn test_run_stops_when_flag_cleared() {
        let mut monitor = monitor(Vec::new());
        let running = AtomicBool::new(false);
        monitor.run(&running);
        assert!(monitor.sink().calls().is_empty());
    }

    #[test]
    fn test_next_delay_honors_backoff() {
        let monitor = Monitor::new(
            MonitorConfig::default(),
            engine(),
            ScriptedSource::default().with_retry_delay(Duration::from_secs(8)),
            RecordingSink::new(),
        );
        assert_eq!(monitor.next_delay(), Duration::from_secs(8));

        let monitor = Monitor::new(
            MonitorConfig::default(),
            engine(),
            ScriptedSource::default().with_retry_delay(Duration::from_secs(1)),
            RecordingSink::new(),
        );
        assert_eq!(monitor.next_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_persistent_sink_failure_warns_once() {
        let t0 = Instant::now();
        let points: Vec<(u64, Option<(f64, f64)>)> = (0..10).map(|i| (i * 2, GOOD)).collect();
        let mut monitor = Monitor::new(
            MonitorConfig::default(),
            engine(),
            ScriptedSource::new(timeline(t0, &points)),
            {
                let mut sink = RecordingSink::new();
                sink.fail_next(10);
                sink
            },
        );

        let mut levels = Vec::new();
        for _ in 0..points.len() {
            monitor.tick();
            levels.push(failure_log_level(monitor.sink_failures()));
        }

        assert_eq!(monitor.sink_failures(), 10);
        assert_eq!(
            levels.iter().filter(|l| **l == log::Level::Warn).count(),
            1
        );
        assert_eq!(monitor.applied(), None);

        // next attempt succeeds and clears the run
        monitor.tick();
        assert_eq!(monitor.sink_failures(), 0);
        assert_eq!(monitor.sink().calls(), &[false]);
    }

    #[test]
    fn test_failure_log_level() {
        assert_eq!(failure_log_level(1), log::Level::Warn);
        assert_eq!(failure_log_level(2), log::Level::Debug);
        assert_eq!(failure_log_level(u32::MAX), log::Level::Debug);
    }

    #[test]
    fn test_monitor_config_default_overlay() {
        assert_eq!(MonitorConfig::default().overlay, "LowBitrateWarning");
    }

    #[test]
    fn test_transition_lines_name_the_overlay() {
        let monitor = Monitor::new(
            MonitorConfig {
                overlay: "BadLink".to_string(),
                ..Default::default()
            },
            engine(),
            ScriptedSource::default(),
            RecordingSink::new(),
        );

        let (level, line) = monitor.describe(&Transition::DisplayEnded);
        assert_eq!(level, log::Level::Info);
        assert_eq!(line, "Stream quality warning ended [BadLink hidden]");

        let reason = Degradation::detect(&Sample::connected(1000.0, 50.0, Instant::now()), 2000.0, 700.0)
            .unwrap();
        let (level, line) = monitor.describe(&Transition::Triggered(reason));
        assert_eq!(level, log::Level::Warn);
        assert!(line.contains("Low bitrate: 1000 kbps"));
        assert!(line.contains("next alert in 630 seconds"));
        assert!(line.ends_with("[BadLink shown]"));

        let (_, line) = monitor.describe(&Transition::Disconnected { from: Phase::Active });
        assert!(line.ends_with("[BadLink hidden]"));
    }
}

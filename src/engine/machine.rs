//! Alert state machine
//!
//! Turns a noisy series of link samples into a debounced, rate-limited
//! visibility signal for the warning overlay.
//!
//! # State Machine
//!
//! ```text
//!               connected              warmup elapsed
//! Disconnected ──────────► Warmup ───────────────────► Monitoring
//!      ▲                                                 │     ▲
//!      │                                       degraded  │     │ cooldown elapsed
//!      │   any phase,                                    ▼     │
//!      └── !connected ─────────────────────────────── Active  Cooldown
//!                                                        │     ▲
//!                                                        └─────┘
//!                                                     display elapsed
//! ```
//!
//! Time-driven transitions cascade within a single [`AlertEngine::step`]:
//! the tick that ends Warmup or Cooldown also runs the degradation check.
//! The engine never reads a clock; `now` is always supplied by the caller.

use super::config::EngineConfig;
use crate::domain::{Degradation, Sample};
use std::fmt;
use std::time::Instant;

/// Externally visible phase of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No publisher; waiting for a connected sample
    Disconnected,
    /// Freshly connected; samples are discarded
    Warmup,
    /// Watching for degradation
    Monitoring,
    /// Alert is visible
    Active,
    /// Alert ended; re-triggering is suppressed
    Cooldown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Warmup => write!(f, "warmup"),
            Self::Monitoring => write!(f, "monitoring"),
            Self::Active => write!(f, "active"),
            Self::Cooldown => write!(f, "cooldown"),
        }
    }
}

/// Phase change produced by a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Disconnected -> Warmup
    Connected,
    /// Warmup -> Monitoring
    WarmupComplete,
    /// Monitoring -> Active
    Triggered(Degradation),
    /// Active -> Cooldown
    DisplayEnded,
    /// Cooldown -> Monitoring
    CooldownEnded,
    /// Any phase -> Disconnected
    Disconnected { from: Phase },
}

impl Transition {
    /// Phase entered by this transition
    pub fn to(&self) -> Phase {
        match self {
            Self::Connected => Phase::Warmup,
            Self::WarmupComplete | Self::CooldownEnded => Phase::Monitoring,
            Self::Triggered(_) => Phase::Active,
            Self::DisplayEnded => Phase::Cooldown,
            Self::Disconnected { .. } => Phase::Disconnected,
        }
    }
}

/// Result of one engine step
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Whether the overlay should be visible now
    pub visible: bool,
    /// Transitions taken during this step, in order
    pub transitions: Vec<Transition>,
}

// Each timed phase keeps its own start instant, so a stale `active_until`
// can never coexist with a `cooldown_until`. Expiry compares elapsed time
// against the configured duration and never adds to an `Instant`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Disconnected,
    Warmup { since: Instant },
    Monitoring,
    Active { since: Instant },
    Cooldown { since: Instant },
}

/// Alert decision engine
///
/// Owns all timing state. Mutated only by [`step`](Self::step); one caller
/// per tick.
#[derive(Debug, Clone)]
pub struct AlertEngine {
    config: EngineConfig,
    state: State,
    connected_since: Option<Instant>,
}

impl AlertEngine {
    /// Create an engine in the Disconnected phase
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: State::Disconnected,
            connected_since: None,
        }
    }

    /// Consume one sample and return whether the alert is visible
    pub fn step(&mut self, sample: &Sample, now: Instant) -> bool {
        self.advance(sample, now).visible
    }

    /// Consume one sample and report every transition taken
    pub fn advance(&mut self, sample: &Sample, now: Instant) -> Step {
        let mut transitions = Vec::new();

        if !sample.connected {
            if self.state != State::Disconnected {
                transitions.push(Transition::Disconnected { from: self.phase() });
                self.state = State::Disconnected;
            }
            self.connected_since = None;
            return Step {
                visible: false,
                transitions,
            };
        }

        while let Some((next, transition)) = self.next_state(sample, now) {
            self.state = next;
            transitions.push(transition);
        }

        Step {
            visible: self.is_visible(),
            transitions,
        }
    }

    /// Single transition out of the current state for a connected sample
    fn next_state(&mut self, sample: &Sample, now: Instant) -> Option<(State, Transition)> {
        match self.state {
            State::Disconnected => {
                self.connected_since = Some(now);
                Some((State::Warmup { since: now }, Transition::Connected))
            }
            State::Warmup { since } => (now.saturating_duration_since(since)
                >= self.config.warmup())
            .then_some((State::Monitoring, Transition::WarmupComplete)),
            State::Monitoring => Degradation::detect(
                sample,
                self.config.bitrate_threshold_kbps(),
                self.config.rtt_threshold_ms(),
            )
            .map(|reason| (State::Active { since: now }, Transition::Triggered(reason))),
            State::Active { since } => (now.saturating_duration_since(since)
                >= self.config.display())
            .then_some((State::Cooldown { since: now }, Transition::DisplayEnded)),
            State::Cooldown { since } => (now.saturating_duration_since(since)
                >= self.config.cooldown())
            .then_some((State::Monitoring, Transition::CooldownEnded)),
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Disconnected => Phase::Disconnected,
            State::Warmup { .. } => Phase::Warmup,
            State::Monitoring => Phase::Monitoring,
            State::Active { .. } => Phase::Active,
            State::Cooldown { .. } => Phase::Cooldown,
        }
    }

    /// Visibility is true iff the phase is Active
    #[inline]
    pub fn is_visible(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }

    /// When the current connection started
    pub fn connected_since(&self) -> Option<Instant> {
        self.connected_since
    }

    /// When the visible alert will hide
    ///
    /// `None` outside Active, or if the deadline is past what `Instant` can
    /// represent.
    pub fn active_until(&self) -> Option<Instant> {
        match self.state {
            State::Active { since } => since.checked_add(self.config.display()),
            _ => None,
        }
    }

    /// When re-triggering becomes possible again
    pub fn cooldown_until(&self) -> Option<Instant> {
        match self.state {
            State::Cooldown { since } => since.checked_add(self.config.cooldown()),
            _ => None,
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn engine() -> AlertEngine {
        AlertEngine::new(EngineConfig::new(2000.0, 700.0, 30.0, 600.0).unwrap())
    }

    fn at(t0: Instant, secs: u64) -> Instant {
        t0 + Duration::from_secs(secs)
    }

    fn healthy(now: Instant) -> Sample {
        Sample::connected(5000.0, 50.0, now)
    }

    fn low(now: Instant) -> Sample {
        Sample::connected(1000.0, 50.0, now)
    }

    fn feed(engine: &mut AlertEngine, sample: Sample) -> bool {
        engine.step(&sample, sample.timestamp)
    }

    #[test]
    fn test_starts_disconnected() {
        let engine = engine();
        assert_eq!(engine.phase(), Phase::Disconnected);
        assert!(!engine.is_visible());
        assert_eq!(engine.connected_since(), None);
    }

    #[test]
    fn test_connect_enters_warmup() {
        let t0 = Instant::now();
        let mut engine = engine();
        let step = engine.advance(&healthy(t0), t0);
        assert_eq!(step.transitions, vec![Transition::Connected]);
        assert_eq!(engine.phase(), Phase::Warmup);
        assert_eq!(engine.connected_since(), Some(t0));
    }

    #[test]
    fn test_warmup_ignores_degraded_samples() {
        let t0 = Instant::now();
        let mut engine = engine();
        for s in 0..15 {
            assert!(!feed(&mut engine, low(at(t0, s))));
        }
        assert_eq!(engine.phase(), Phase::Warmup);
    }

    #[test]
    fn test_warmup_end_cascades_into_trigger() {
        let t0 = Instant::now();
        let mut engine = engine();
        feed(&mut engine, healthy(t0));

        let step = engine.advance(&low(at(t0, 15)), at(t0, 15));
        assert!(step.visible);
        assert_eq!(step.transitions.len(), 2);
        assert_eq!(step.transitions[0], Transition::WarmupComplete);
        assert!(matches!(step.transitions[1], Transition::Triggered(_)));
        assert_eq!(engine.active_until(), Some(at(t0, 45)));
    }

    #[test]
    fn test_active_holds_while_link_recovers() {
        let t0 = Instant::now();
        let mut engine = engine();
        feed(&mut engine, healthy(t0));
        feed(&mut engine, healthy(at(t0, 15)));
        assert!(feed(&mut engine, low(at(t0, 16))));

        for s in 17..46 {
            assert!(feed(&mut engine, healthy(at(t0, s))), "hidden early at t={}", s);
        }
        assert!(!feed(&mut engine, healthy(at(t0, 46))));
        assert_eq!(engine.phase(), Phase::Cooldown);
        assert_eq!(engine.cooldown_until(), Some(at(t0, 646)));
        assert_eq!(engine.active_until(), None);
    }

    #[test]
    fn test_cooldown_suppresses_retrigger() {
        let t0 = Instant::now();
        let mut engine = engine();
        feed(&mut engine, healthy(t0));
        feed(&mut engine, low(at(t0, 16)));
        feed(&mut engine, low(at(t0, 46)));
        assert_eq!(engine.phase(), Phase::Cooldown);

        assert!(!feed(&mut engine, low(at(t0, 645))));
        assert!(feed(&mut engine, low(at(t0, 646))));
    }

    #[test]
    fn test_cooldown_returns_to_monitoring_when_healthy() {
        let t0 = Instant::now();
        let mut engine = engine();
        feed(&mut engine, healthy(t0));
        feed(&mut engine, low(at(t0, 16)));
        feed(&mut engine, healthy(at(t0, 46)));

        let step = engine.advance(&healthy(at(t0, 700)), at(t0, 700));
        assert_eq!(step.transitions, vec![Transition::CooldownEnded]);
        assert_eq!(engine.phase(), Phase::Monitoring);
    }

    #[test]
    fn test_rtt_alone_triggers() {
        let t0 = Instant::now();
        let mut engine = engine();
        feed(&mut engine, healthy(t0));
        feed(&mut engine, healthy(at(t0, 16)));

        let step = engine.advance(&Sample::connected(5000.0, 700.0, at(t0, 18)), at(t0, 18));
        assert!(step.visible);
        match step.transitions[0] {
            Transition::Triggered(reason) => {
                assert!(reason.high_rtt);
                assert!(!reason.low_bitrate);
            }
            other => panic!("Expected trigger, got {:?}", other),
        }
    }

    #[test]
    fn test_disconnect_from_every_phase() {
        let t0 = Instant::now();
        let cases: Vec<(Vec<Sample>, Phase)> = vec![
            (vec![healthy(t0)], Phase::Warmup),
            (vec![healthy(t0), healthy(at(t0, 16))], Phase::Monitoring),
            (vec![healthy(t0), low(at(t0, 16))], Phase::Active),
            (
                vec![healthy(t0), low(at(t0, 16)), healthy(at(t0, 46))],
                Phase::Cooldown,
            ),
        ];

        for (samples, expected) in cases {
            let mut engine = engine();
            let mut last = t0;
            for sample in samples {
                last = sample.timestamp;
                feed(&mut engine, sample);
            }
            assert_eq!(engine.phase(), expected);

            let now = last + Duration::from_secs(1);
            let step = engine.advance(&Sample::disconnected(now), now);
            assert!(!step.visible);
            assert_eq!(step.transitions, vec![Transition::Disconnected { from: expected }]);
            assert_eq!(engine.phase(), Phase::Disconnected);
            assert_eq!(engine.connected_since(), None);
            assert_eq!(engine.active_until(), None);
            assert_eq!(engine.cooldown_until(), None);
        }
    }

    #[test]
    fn test_repeated_disconnect_is_quiet() {
        let t0 = Instant::now();
        let mut engine = engine();
        let step = engine.advance(&Sample::disconnected(t0), t0);
        assert!(step.transitions.is_empty());
    }

    #[test]
    fn test_disconnect_ignores_stale_numbers() {
        let t0 = Instant::now();
        let mut engine = engine();
        feed(&mut engine, healthy(t0));
        feed(&mut engine, healthy(at(t0, 16)));

        let stale = Sample {
            bitrate_kbps: 10.0,
            rtt_ms: 9999.0,
            connected: false,
            timestamp: at(t0, 18),
        };
        assert!(!feed(&mut engine, stale));
        assert_eq!(engine.phase(), Phase::Disconnected);
    }

    #[test]
    fn test_reconnect_clears_cooldown() {
        let t0 = Instant::now();
        let mut engine = engine();
        feed(&mut engine, healthy(t0));
        feed(&mut engine, low(at(t0, 16)));
        feed(&mut engine, low(at(t0, 46)));
        assert_eq!(engine.phase(), Phase::Cooldown);

        feed(&mut engine, Sample::disconnected(at(t0, 50)));
        feed(&mut engine, healthy(at(t0, 52)));
        assert_eq!(engine.phase(), Phase::Warmup);
        assert!(!feed(&mut engine, low(at(t0, 60))));
        assert!(feed(&mut engine, low(at(t0, 67))));
    }

    #[test]
    fn test_transition_targets() {
        assert_eq!(Transition::Connected.to(), Phase::Warmup);
        assert_eq!(Transition::DisplayEnded.to(), Phase::Cooldown);
        assert_eq!(
            Transition::Disconnected {
                from: Phase::Active
            }
            .to(),
            Phase::Disconnected
        );
    }

    #[test]
    fn test_longest_timers_never_overflow() {
        let max = crate::engine::MAX_TIMER.as_secs_f64();
        let mut engine = AlertEngine::new(EngineConfig::new(2000.0, 700.0, max - 1.0, max).unwrap());
        let t0 = Instant::now();

        feed(&mut engine, healthy(t0));
        assert!(feed(&mut engine, low(at(t0, 16))));
        assert!(feed(&mut engine, low(at(t0, 10_000))));
        assert_eq!(engine.phase(), Phase::Active);
        assert_eq!(engine.active_until(), at(t0, 16).checked_add(engine.config().display()));
    }
}

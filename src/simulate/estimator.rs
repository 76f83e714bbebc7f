//! Simulated telemetry & risk estimator.
//!
//! `SimulationState` holds the synchronous core: one drift step, one
//! scenario reselection, and the snapshot they produce. `Estimator` owns a
//! state behind a mutex and drives it from two tokio tasks (drift tick and
//! scenario timer) between `start()` and `stop()`.
//!
//! Each task takes the lock, applies a whole update and publishes it before
//! releasing, so consumers never observe a half-updated reading. `stop()`
//! takes the same lock to retire the running generation, so nothing is
//! published once it returns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::alert::thresholds::recompute;
use crate::config::EstimatorSettings;
use crate::logging::{self, Component};
use crate::model::{
    RiskAssessment, RiskScenario, SensorReading, Snapshot, WeatherReading,
};
use crate::simulate::drift::{drift_reading, drift_weather};
use crate::simulate::scenario::{next_delay, select_scenario};

// ---------------------------------------------------------------------------
// Synchronous core
// ---------------------------------------------------------------------------

pub struct SimulationState {
    reading: SensorReading,
    weather: WeatherReading,
    scenario: RiskScenario,
    assessment: RiskAssessment,
    tick: u64,
    updated_at: DateTime<Utc>,
    rng: StdRng,
    /// Which `start()` the live tasks belong to; `None` while stopped.
    generation: Option<u64>,
}

impl SimulationState {
    pub fn new(mut rng: StdRng) -> Self {
        let reading = SensorReading::initial();
        let assessment = recompute(&reading, &mut rng);
        SimulationState {
            reading,
            weather: WeatherReading::initial(),
            scenario: RiskScenario::Normal,
            assessment,
            tick: 0,
            updated_at: Utc::now(),
            rng,
            generation: None,
        }
    }

    /// Seeded state, or entropy-seeded when `seed` is `None`.
    pub fn with_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SimulationState::new(rng)
    }

    /// One drift tick: sensors, weather, then a fresh assessment.
    pub fn step(&mut self) -> Snapshot {
        self.reading = drift_reading(&self.reading, self.scenario, &mut self.rng);
        self.weather = drift_weather(&self.weather, &mut self.rng);
        self.assessment = recompute(&self.reading, &mut self.rng);
        self.tick += 1;
        self.updated_at = Utc::now();
        self.snapshot()
    }

    /// Draws a scenario and applies `ticks` drift steps at once, without
    /// timers. For one-off assessments outside a running estimator.
    pub fn fast_forward(&mut self, ticks: u64) -> Snapshot {
        self.reselect_scenario();
        for _ in 0..ticks {
            self.step();
        }
        self.snapshot()
    }

    pub fn reselect_scenario(&mut self) -> RiskScenario {
        self.scenario = select_scenario(&mut self.rng);
        self.scenario
    }

    pub fn next_scenario_delay(&mut self, min: Duration, max: Duration) -> Duration {
        next_delay(&mut self.rng, min, max)
    }

    pub fn force_scenario(&mut self, scenario: RiskScenario) {
        self.scenario = scenario;
    }

    pub fn scenario(&self) -> RiskScenario {
        self.scenario
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            reading: self.reading,
            weather: self.weather,
            assessment: self.assessment,
            scenario: self.scenario,
            tick: self.tick,
            updated_at: self.updated_at,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == Some(generation)
    }
}

fn lock(state: &Mutex<SimulationState>) -> MutexGuard<'_, SimulationState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Owned estimator
// ---------------------------------------------------------------------------

/// Owns the simulation and its two timers.
///
/// `start()` must be called from within a tokio runtime. Dropping the
/// estimator stops it.
pub struct Estimator {
    settings: EstimatorSettings,
    state: Arc<Mutex<SimulationState>>,
    publisher: Arc<watch::Sender<Snapshot>>,
    tasks: Vec<JoinHandle<()>>,
    next_generation: u64,
}

impl Estimator {
    pub fn new(settings: EstimatorSettings) -> Self {
        let state = SimulationState::with_seed(settings.seed);
        let (publisher, _) = watch::channel(state.snapshot());
        Estimator {
            settings,
            state: Arc::new(Mutex::new(state)),
            publisher: Arc::new(publisher),
            tasks: Vec::new(),
            next_generation: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Spawns the drift and scenario tasks. No-op if already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        lock(&self.state).generation = Some(generation);

        self.tasks.push(self.spawn_drift(generation));
        self.tasks.push(self.spawn_scenario(generation));

        logging::info(
            Component::Estimator,
            None,
            &format!(
                "Started (tick {}s, scenario every {}-{}s)",
                self.settings.tick_secs,
                self.settings.scenario_min_secs,
                self.settings.scenario_max_secs
            ),
        );
    }

    /// Cancels both timers. No update is published after this returns.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }

        lock(&self.state).generation = None;
        for task in self.tasks.drain(..) {
            task.abort();
        }
        logging::info(Component::Estimator, None, "Stopped");
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.publisher.borrow().clone()
    }

    /// Receiver notified after every tick.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// Overrides the scenario until the next scheduled reselection.
    pub fn force_scenario(&self, scenario: RiskScenario) {
        lock(&self.state).force_scenario(scenario);
        logging::info(Component::Scenario, None, &format!("Scenario forced to {}", scenario));
    }

    fn spawn_drift(&self, generation: u64) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let publisher = Arc::clone(&self.publisher);
        let period = self.settings.tick();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let mut guard = lock(&state);
                if !guard.is_current(generation) {
                    break;
                }
                let snapshot = guard.step();
                publisher.send_replace(snapshot.clone());
                drop(guard);

                logging::debug(
                    Component::Estimator,
                    None,
                    &format!(
                        "tick {}: probability {:.1}% ({}) under {}",
                        snapshot.tick,
                        snapshot.assessment.probability,
                        snapshot.assessment.risk_level,
                        snapshot.scenario
                    ),
                );
            }
        })
    }

    fn spawn_scenario(&self, generation: u64) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let (min, max) = self.settings.scenario_interval();

        tokio::spawn(async move {
            loop {
                let delay = {
                    let mut guard = lock(&state);
                    if !guard.is_current(generation) {
                        break;
                    }
                    guard.next_scenario_delay(min, max)
                };

                tokio::time::sleep(delay).await;

                let (previous, scenario) = {
                    let mut guard = lock(&state);
                    if !guard.is_current(generation) {
                        break;
                    }
                    let previous = guard.scenario();
                    (previous, guard.reselect_scenario())
                };

                if previous != scenario {
                    logging::info(
                        Component::Scenario,
                        None,
                        &format!("Scenario changed {} -> {}", previous, scenario),
                    );
                }
            }
        })
    }
}

impl Drop for Estimator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::drift::bounds;
    use crate::sensors::SENSOR_REGISTRY;

    #[test]
    fn test_new_state_starts_at_initial_reading() {
        let state = SimulationState::with_seed(Some(1));
        let snap = state.snapshot();
        assert_eq!(snap.tick, 0);
        assert_eq!(snap.reading, SensorReading::initial());
        assert_eq!(snap.scenario, RiskScenario::Normal);
    }

    #[test]
    fn test_step_advances_tick_and_refreshes_assessment() {
        let mut state = SimulationState::with_seed(Some(1));
        let first = state.step();
        let second = state.step();
        assert_eq!(first.tick, 1);
        assert_eq!(second.tick, 2);
        assert_eq!(
            second.assessment.probability,
            crate::alert::thresholds::risk_probability(&second.reading)
        );
    }

    #[test]
    fn test_forced_scenario_bounds_every_field_after_one_step() {
        let mut state = SimulationState::with_seed(Some(17));
        state.force_scenario(RiskScenario::High);
        let snap = state.step();
        assert_eq!(snap.scenario, RiskScenario::High);
        for sensor in SENSOR_REGISTRY {
            let (lo, hi) = bounds(sensor.baseline, RiskScenario::High);
            let v = snap.reading.get(sensor.field);
            assert!(v >= lo && v <= hi, "{} = {} outside [{}, {}]", sensor.name, v, lo, hi);
        }
    }

    #[test]
    fn test_fast_forward_moves_off_the_initial_reading() {
        let mut state = SimulationState::with_seed(Some(31));
        let snap = state.fast_forward(10);
        assert_eq!(snap.tick, 10);
        assert_ne!(snap.reading, SensorReading::initial());
        assert_eq!(
            snap.assessment.probability,
            crate::alert::thresholds::risk_probability(&snap.reading)
        );
        for sensor in SENSOR_REGISTRY {
            let (lo, hi) = bounds(sensor.baseline, snap.scenario);
            let v = snap.reading.get(sensor.field);
            assert!(v >= lo && v <= hi, "{} = {} outside [{}, {}]", sensor.name, v, lo, hi);
        }
    }

    #[test]
    fn test_same_seed_gives_same_trajectory() {
        let mut a = SimulationState::with_seed(Some(123));
        let mut b = SimulationState::with_seed(Some(123));
        for _ in 0..20 {
            a.reselect_scenario();
            b.reselect_scenario();
            assert_eq!(a.step().reading, b.step().reading);
        }
    }

    #[test]
    fn test_stopped_state_rejects_every_generation() {
        let mut state = SimulationState::with_seed(Some(1));
        assert!(!state.is_current(0));
        state.generation = Some(3);
        assert!(state.is_current(3));
        assert!(!state.is_current(2));
    }
}

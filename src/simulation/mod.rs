mod data;
mod formatting;
mod runner;
mod sampling;

use derive_getters::Getters;
use im::Vector;
use tracing::debug;
use tracing::info;

use crate::config::SimulationConfig;
use crate::generator::generate_points;
use crate::linest::calculate_ols;
use crate::schema::DataPoint;
use crate::schema::HistoryPoint;
use crate::schema::OlsResult;
use crate::schema::SamplingMode;

use self::sampling::independent_start_id;
use self::sampling::target_sample_size;

pub use self::data::SimulationSnapshot;
pub use self::data::TickOutcome;
pub use self::formatting::format_history_row;
pub use self::formatting::format_history_table;
pub use self::formatting::theoretical_slope_std_err;
pub use self::runner::RunnerCommand;
pub use self::runner::RunnerState;
pub use self::runner::SimulationRunner;

/// Owns the growing dataset and the history of estimates.
#[derive(Debug, Getters)]
pub struct Simulation {
    config: SimulationConfig,
    ticks: u64,
    points: Vector<DataPoint>,
    history: Vector<HistoryPoint>,
    result: OlsResult,
    #[getter(skip)]
    next_id: u64,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Simulation {
            config,
            ticks: 0,
            points: Vector::new(),
            history: Vector::new(),
            result: OlsResult::ZERO,
            next_id: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.points.len() >= self.config.max_sample_size
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.is_finished() {
            return TickOutcome::Finished;
        }
        self.ticks += 1;
        let target = target_sample_size(&self.config, self.ticks);
        let params = self.config.params();

        match self.config.sampling_mode {
            SamplingMode::Cumulative => {
                let count = target.saturating_sub(self.points.len());
                self.points
                    .extend(generate_points(count, self.next_id, &params));
                self.next_id += count as u64;
            }
            SamplingMode::Independent => {
                let start_id = independent_start_id(&self.config, self.ticks);
                self.points = generate_points(target, start_id, &params).into();
            }
        }

        self.result = calculate_ols(&self.points);
        self.history
            .push_back(HistoryPoint::from_result(self.points.len(), &self.result));
        debug!(
            tick = self.ticks,
            n = self.points.len(),
            slope = self.result.slope,
            intercept = self.result.intercept,
            slope_std_err = self.result.slope_std_err,
            "Simulation tick"
        );

        if self.is_finished() {
            info!(
                ticks = self.ticks,
                n = self.points.len(),
                slope = self.result.slope,
                "Simulation reached the maximum sample size"
            );
            TickOutcome::Finished
        } else {
            TickOutcome::Continue
        }
    }

    pub fn reset(&mut self) {
        debug!(ticks = self.ticks, "Simulation reset");
        *self = Simulation::new(self.config);
    }

    /// Replaces the configuration. Anything that changes which points would be
    /// drawn throws the current run away.
    pub fn set_config(&mut self, config: SimulationConfig) {
        let invalidates = config.params() != self.config.params()
            || config.batch_size != self.config.batch_size
            || config.min_sample_size != self.config.min_sample_size
            || config.max_sample_size != self.config.max_sample_size;
        self.config = config;
        if invalidates {
            self.reset();
        }
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            config: self.config,
            ticks: self.ticks,
            points: self.points.clone(),
            history: self.history.clone(),
            result: self.result,
            finished: self.is_finished(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn config(mode: SamplingMode) -> SimulationConfig {
        SimulationConfig {
            min_sample_size: 5,
            max_sample_size: 40,
            batch_size: 10,
            sampling_mode: mode,
            ..SimulationConfig::default()
        }
    }

    fn run_to_end(simulation: &mut Simulation) {
        while simulation.tick() == TickOutcome::Continue {}
    }

    #[test]
    fn cumulative_keeps_old_points() {
        let mut simulation = Simulation::new(config(SamplingMode::Cumulative));
        simulation.tick();
        let first: Vec<DataPoint> = simulation.points().iter().copied().collect();
        simulation.tick();
        assert_eq!(simulation.points().len(), 15);
        assert!(simulation.points().iter().take(5).eq(first.iter()));
        let ids: Vec<u64> = simulation.points().iter().map(|p| p.id).collect();
        assert_eq!(ids, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn history_gets_one_entry_per_tick() {
        let mut simulation = Simulation::new(config(SamplingMode::Cumulative));
        run_to_end(&mut simulation);
        let sizes: Vec<usize> = simulation.history().iter().map(|h| h.n).collect();
        assert_eq!(sizes, vec![5, 15, 25, 35, 40]);
        assert_eq!(*simulation.ticks(), 5);
        assert!(simulation.is_finished());

        let last = simulation.history().last().copied().unwrap();
        assert_eq!(last.estimated_slope, simulation.result().slope);
        assert_eq!(last.slope_std_err, simulation.result().slope_std_err);
    }

    #[test]
    fn finished_tick_changes_nothing() {
        let mut simulation = Simulation::new(config(SamplingMode::Cumulative));
        run_to_end(&mut simulation);
        let before = simulation.history().len();
        assert_eq!(simulation.tick(), TickOutcome::Finished);
        assert_eq!(simulation.history().len(), before);
    }

    #[test]
    fn independent_ticks_use_disjoint_ids() {
        let mut simulation = Simulation::new(config(SamplingMode::Independent));
        let mut previous: HashSet<u64> = HashSet::new();
        loop {
            let outcome = simulation.tick();
            let ids: HashSet<u64> = simulation.points().iter().map(|p| p.id).collect();
            assert_eq!(ids.len(), simulation.points().len());
            assert!(ids.is_disjoint(&previous));
            previous = ids;
            if outcome == TickOutcome::Finished {
                break;
            }
        }
        assert_eq!(simulation.points().len(), 40);
    }

    #[test]
    fn runs_are_reproducible() {
        let mut a = Simulation::new(config(SamplingMode::Independent));
        let mut b = Simulation::new(config(SamplingMode::Independent));
        run_to_end(&mut a);
        run_to_end(&mut b);
        assert_eq!(a.history(), b.history());
        assert_eq!(a.points(), b.points());
    }

    #[test]
    fn seed_change_resets() {
        let mut simulation = Simulation::new(config(SamplingMode::Cumulative));
        simulation.tick();
        simulation.tick();
        let old = simulation.points().clone();

        let mut changed = *simulation.config();
        changed.seed += 1;
        simulation.set_config(changed);
        assert_eq!(*simulation.ticks(), 0);
        assert!(simulation.points().is_empty());
        assert!(simulation.history().is_empty());
        assert_eq!(*simulation.result(), OlsResult::ZERO);

        simulation.tick();
        assert_ne!(simulation.points().head(), old.head());
    }

    #[test]
    fn speed_change_keeps_run() {
        let mut simulation = Simulation::new(config(SamplingMode::Cumulative));
        simulation.tick();
        let mut changed = *simulation.config();
        changed.speed_ms = 5;
        simulation.set_config(changed);
        assert_eq!(*simulation.ticks(), 1);
        assert_eq!(simulation.config().speed_ms, 5);
    }

    #[test]
    fn estimates_converge() {
        let config = SimulationConfig {
            min_sample_size: 50,
            max_sample_size: 20_000,
            batch_size: 2_000,
            noise_level: 2.0,
            ..SimulationConfig::default()
        };
        let mut simulation = Simulation::new(config);
        run_to_end(&mut simulation);
        let result = simulation.result();
        assert!((result.slope - config.true_slope).abs() < 0.05, "{result:?}");
        assert!((result.intercept - config.true_intercept).abs() < 0.25, "{result:?}");
        assert!(result.slope_std_err < 0.01);
    }

    #[test]
    fn tick_refits_the_whole_dataset() {
        for mode in [SamplingMode::Cumulative, SamplingMode::Independent] {
            let mut simulation = Simulation::new(config(mode));
            simulation.tick();
            simulation.tick();
            let points: Vec<DataPoint> = simulation.points().iter().copied().collect();
            assert_eq!(*simulation.result(), calculate_ols(&points));
            assert_ne!(*simulation.result(), OlsResult::ZERO);
        }
    }

    #[test]
    fn snapshot_mirrors_state() {
        let mut simulation = Simulation::new(config(SamplingMode::Cumulative));
        simulation.tick();
        let snapshot = simulation.snapshot();
        assert_eq!(snapshot.sample_size(), 5);
        assert_eq!(*snapshot.ticks(), 1);
        assert_eq!(snapshot.result(), simulation.result());
        assert!(!snapshot.finished());
    }
}

use derive_getters::Getters;
use im::Vector;
use serde::Serialize;

use crate::config::SimulationConfig;
use crate::schema::DataPoint;
use crate::schema::HistoryPoint;
use crate::schema::OlsResult;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    Continue,
    Finished,
}

/// Cheap copy of the driver state for collaborators on other threads.
#[derive(Clone, Debug, Serialize, Getters)]
pub struct SimulationSnapshot {
    pub(super) config: SimulationConfig,
    pub(super) ticks: u64,
    pub(super) points: Vector<DataPoint>,
    pub(super) history: Vector<HistoryPoint>,
    pub(super) result: OlsResult,
    pub(super) finished: bool,
}

impl SimulationSnapshot {
    pub fn sample_size(&self) -> usize {
        self.points.len()
    }
}

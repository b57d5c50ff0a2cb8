use crate::config::SimulationConfig;

/// Sample size the dataset should reach after tick `tick` (1-based).
pub fn target_sample_size(config: &SimulationConfig, tick: u64) -> usize {
    let grown = (tick.saturating_sub(1) as usize)
        .saturating_mul(config.batch_size)
        .saturating_add(config.min_sample_size);
    grown.min(config.max_sample_size)
}

/// Distance between the first ids of consecutive independent samples.
///
/// Strictly larger than any sample size, so the id ranges of two ticks never
/// overlap.
pub fn independent_id_stride(config: &SimulationConfig) -> u64 {
    config.max_sample_size as u64 + 1
}

pub fn independent_start_id(config: &SimulationConfig, tick: u64) -> u64 {
    tick.saturating_mul(independent_id_stride(config))
}

use crate::rng::random_normal;
use crate::rng::seeded_random;
use crate::schema::DataPoint;
use crate::schema::SimulationParams;

/// RNG slots reserved per point id.
const SLOTS_PER_ID: u64 = 100;
const X_RANGE: f64 = 10.0;

/// The point with the given id. Depends on nothing but its arguments.
pub fn point_at(id: u64, params: &SimulationParams) -> DataPoint {
    let base = id.wrapping_mul(SLOTS_PER_ID);
    let x = seeded_random(params.seed, base) * X_RANGE;
    let error = random_normal(0.0, params.noise_level, params.seed, base.wrapping_add(1));
    let y = params.true_intercept + params.true_slope * x + error;
    DataPoint::new(id, x, y)
}

/// Endless run of points with consecutive ids starting at `start_id`.
pub fn points_from(
    start_id: u64,
    params: &SimulationParams,
) -> impl Iterator<Item = DataPoint> + '_ {
    (start_id..).map(move |id| point_at(id, params))
}

pub fn generate_points(count: usize, start_id: u64, params: &SimulationParams) -> Vec<DataPoint> {
    points_from(start_id, params).take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SamplingMode;

    fn params(seed: u64) -> SimulationParams {
        SimulationParams::new(2.0, 1.0, 1.5, seed, SamplingMode::Cumulative)
    }

    #[test]
    fn ids_are_consecutive() {
        let points = generate_points(5, 40, &params(1));
        let ids: Vec<u64> = points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![40, 41, 42, 43, 44]);
        assert!(generate_points(0, 40, &params(1)).is_empty());
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(
            generate_points(100, 7, &params(3)),
            generate_points(100, 7, &params(3))
        );
    }

    #[test]
    fn point_depends_only_on_its_id() {
        let batch = generate_points(50, 0, &params(8));
        let tail = generate_points(10, 40, &params(8));
        assert_eq!(&batch[40..], &tail[..]);
        assert_eq!(point_at(23, &params(8)), batch[23]);
    }

    #[test]
    fn seed_changes_points() {
        assert_ne!(
            generate_points(10, 0, &params(1)),
            generate_points(10, 0, &params(2))
        );
    }

    #[test]
    fn x_is_in_range() {
        for p in generate_points(5_000, 0, &params(4)) {
            assert!((0.0..X_RANGE).contains(&p.x), "x = {}", p.x);
        }
    }

    #[test]
    fn noiseless_points_lie_on_the_line() {
        let params = SimulationParams::new(0.5, -2.0, 0.0, 11, SamplingMode::Independent);
        for p in generate_points(100, 1_000, &params) {
            assert_eq!(p.y, -2.0 + 0.5 * p.x);
        }
    }

    #[test]
    fn rng_slots_never_overlap() {
        // x uses slot 100 * id, the error uses 200 * id + 2 and 200 * id + 3.
        use std::collections::HashSet;
        let mut slots = HashSet::new();
        for id in 0..10_000u64 {
            assert!(slots.insert(id * SLOTS_PER_ID));
            let normal_index = id * SLOTS_PER_ID + 1;
            assert!(slots.insert(2 * normal_index));
            assert!(slots.insert(2 * normal_index + 1));
        }
    }
}

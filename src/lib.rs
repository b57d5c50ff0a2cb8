pub mod config;
pub mod error;
pub mod generator;
pub mod linest;
pub mod rng;
pub mod schema;
pub mod simulation;

pub use generator::generate_points;
pub use linest::calculate_ols;
pub use rng::random_normal;
pub use rng::seeded_random;

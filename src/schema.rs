use derive_more::Display;
use derive_new::new;
use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize, new)]
pub struct DataPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Keep every point ever drawn and append each batch.
    #[default]
    #[display(fmt = "cumulative")]
    Cumulative,
    /// Throw the previous sample away and draw a fresh, larger one each tick.
    #[display(fmt = "independent")]
    Independent,
}

/// The model the points are drawn from, plus the seed that makes them reproducible.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize, new)]
pub struct SimulationParams {
    pub true_slope: f64,
    pub true_intercept: f64,
    pub noise_level: f64,
    pub seed: u64,
    pub sampling_mode: SamplingMode,
}

#[derive(Clone, Copy, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct OlsResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub slope_std_err: f64,
}

impl OlsResult {
    pub const ZERO: OlsResult = OlsResult {
        slope: 0.0,
        intercept: 0.0,
        r_squared: 0.0,
        slope_std_err: 0.0,
    };

    pub fn slope_confidence_interval(&self, z: f64) -> (f64, f64) {
        let half_width = z * self.slope_std_err;
        (self.slope - half_width, self.slope + half_width)
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize, new)]
pub struct HistoryPoint {
    pub n: usize,
    pub estimated_slope: f64,
    pub estimated_intercept: f64,
    pub slope_std_err: f64,
}

impl HistoryPoint {
    pub fn from_result(n: usize, result: &OlsResult) -> Self {
        HistoryPoint::new(n, result.slope, result.intercept, result.slope_std_err)
    }
}

use crate::schema::DataPoint;
use crate::schema::OlsResult;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Linest {
    x_sum: f64,
    x2_sum: f64,
    y_sum: f64,
    y2_sum: f64,
    xy_sum: f64,
    x_min: f64,
    x_max: f64,
    n: usize,
}

impl Default for Linest {
    fn default() -> Self {
        Linest {
            x_sum: 0.0,
            x2_sum: 0.0,
            y_sum: 0.0,
            y2_sum: 0.0,
            xy_sum: 0.0,
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            n: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub slope: f64,
    pub intercept: f64,
}

impl Line {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

impl Linest {
    pub fn push(&mut self, x: f64, y: f64) {
        self.x_sum += x;
        self.x2_sum += x * x;
        self.y_sum += y;
        self.y2_sum += y * y;
        self.xy_sum += x * y;
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.n += 1;
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// At least two points and more than one distinct `x`. Rounding can leave
    /// the denominator slightly nonzero when every `x` is equal, so the spread
    /// is checked directly.
    fn has_spread(&self) -> bool {
        self.n > 1 && self.x_min < self.x_max
    }

    fn denominator(&self) -> f64 {
        self.n as f64 * self.x2_sum - self.x_sum * self.x_sum
    }

    /// Least-squares line from the running sums alone.
    pub fn line(&self) -> Option<Line> {
        let denom = self.denominator();
        (self.has_spread() && denom != 0.0).then(|| {
            let n = self.n as f64;
            let slope = (n * self.xy_sum - self.x_sum * self.y_sum) / denom;
            let intercept = (self.y_sum - slope * self.x_sum) / n;
            Line { slope, intercept }
        })
    }

    /// Coefficient of determination from the running sums alone.
    pub fn r_squared(&self) -> Option<f64> {
        let n = self.n as f64;
        let gue = n * self.xy_sum - self.x_sum * self.y_sum;
        let syy = n * self.y2_sum - self.y_sum * self.y_sum;
        let denom = self.denominator();
        (self.has_spread() && denom != 0.0 && syy != 0.0).then(|| gue * gue / denom / syy)
    }

    /// Centered sum of squares of x.
    fn sxx(&self) -> f64 {
        self.x2_sum - self.x_sum * self.x_sum / self.n as f64
    }

    fn y_mean(&self) -> f64 {
        self.y_sum / self.n as f64
    }
}

impl Extend<(f64, f64)> for Linest {
    fn extend<I: IntoIterator<Item = (f64, f64)>>(&mut self, iter: I) {
        for (x, y) in iter {
            self.push(x, y);
        }
    }
}

impl FromIterator<(f64, f64)> for Linest {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut linest = Linest::default();
        linest.extend(iter);
        linest
    }
}

/// Ordinary least squares fit of `y = intercept + slope * x`.
///
/// Never fails: fewer than three points or a design with no spread in `x`
/// give [`OlsResult::ZERO`], and any non-finite field is reported as 0.
pub fn calculate_ols<'a, I>(points: I) -> OlsResult
where
    I: IntoIterator<Item = &'a DataPoint> + Copy,
{
    let linest: Linest = points.into_iter().map(|p| (p.x, p.y)).collect();
    if linest.len() < 3 {
        return OlsResult::ZERO;
    }
    let line = match linest.line() {
        Some(line) => line,
        None => return OlsResult::ZERO,
    };

    let y_mean = linest.y_mean();
    let (ss_tot, ss_res) = points.into_iter().fold((0.0, 0.0), |(tot, res), p| {
        let residual = p.y - line.at(p.x);
        (tot + (p.y - y_mean).powi(2), res + residual * residual)
    });

    let r_squared = if ss_tot != 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    let sxx = linest.sxx();
    let var_error = ss_res / (linest.len() - 2) as f64;
    let slope_std_err = if sxx > 0.0 {
        (var_error / sxx).sqrt()
    } else {
        0.0
    };

    sanitize(OlsResult {
        slope: line.slope,
        intercept: line.intercept,
        r_squared,
        slope_std_err,
    })
}

fn sanitize(result: OlsResult) -> OlsResult {
    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
    OlsResult {
        slope: finite(result.slope),
        intercept: finite(result.intercept),
        r_squared: finite(result.r_squared),
        slope_std_err: finite(result.slope_std_err),
    }
}

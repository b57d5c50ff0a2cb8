use itertools::Itertools;

use crate::schema::HistoryPoint;

/// Variance of `x ~ U[0, 10]`.
const X_VARIANCE: f64 = 100.0 / 12.0;
const Z_95: f64 = 1.96;

pub fn theoretical_slope_std_err(noise_level: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    noise_level / (n as f64 * X_VARIANCE).sqrt()
}

pub fn format_history_row(entry: &HistoryPoint, noise_level: f64) -> String {
    let half_width = Z_95 * entry.slope_std_err;
    format!(
        "{:>8} {:>12.6} {:>12.6} {:>10.6} [{:.4}, {:.4}] {:>10.6}",
        entry.n,
        entry.estimated_slope,
        entry.estimated_intercept,
        entry.slope_std_err,
        entry.estimated_slope - half_width,
        entry.estimated_slope + half_width,
        theoretical_slope_std_err(noise_level, entry.n),
    )
}

/// Every `every`-th entry, always including the last one.
pub fn format_history_table<'a, I>(history: I, noise_level: f64, every: usize) -> String
where
    I: IntoIterator<Item = &'a HistoryPoint>,
{
    let every = every.max(1);
    let header = format!(
        "{:>8} {:>12} {:>12} {:>10} {:^21} {:>10}",
        "n", "slope", "intercept", "std err", "95% CI", "σ/√(nVx)"
    );
    let rows = history
        .into_iter()
        .enumerate()
        .with_position()
        .filter_map(|position| {
            use itertools::Position::*;
            match position {
                Last((_, entry)) | Only((_, entry)) => Some(entry),
                First((i, entry)) | Middle((i, entry)) if i % every == 0 => Some(entry),
                _ => None,
            }
        })
        .map(|entry| format_history_row(entry, noise_level));
    std::iter::once(header).chain(rows).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theoretical_error_halves_when_n_quadruples() {
        let a = theoretical_slope_std_err(2.0, 100);
        let b = theoretical_slope_std_err(2.0, 400);
        assert!((a / b - 2.0).abs() < 1e-12);
        assert_eq!(theoretical_slope_std_err(2.0, 0), 0.0);
    }

    #[test]
    fn row_contains_interval() {
        let row = format_history_row(&HistoryPoint::new(100, 2.0, 1.0, 0.5), 1.0);
        assert!(row.contains("[1.0200, 2.9800]"), "{row}");
        assert!(row.trim_start().starts_with("100"));
    }

    #[test]
    fn table_keeps_last_row() {
        let history: Vec<HistoryPoint> = (1..=7)
            .map(|i| HistoryPoint::new(i * 10, 2.0, 1.0, 0.1))
            .collect();
        let table = format_history_table(&history, 1.0, 3);
        let sizes: Vec<&str> = table
            .lines()
            .skip(1)
            .map(|line| line.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(sizes, vec!["10", "40", "70"]);

        let single = format_history_table(&history[..1], 1.0, 3);
        assert_eq!(single.lines().count(), 2);
    }
}

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Summary statistics over a set of average salaries.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct SalaryStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// The upper median for an even count.
    pub median: f64,
}

impl SalaryStats {
    /// Returns `None` for an empty set.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut values = values.into_iter().collect::<Vec<_>>();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        Some(Self {
            count,
            min: values[0],
            max: values[count - 1],
            mean: values.iter().sum::<f64>() / count as f64,
            median: values[count / 2],
        })
    }
}

impl Display for SalaryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n={:<5} min={:<7.2} max={:<7.2} mean={:<7.2} median={:.2}",
            self.count, self.min, self.max, self.mean, self.median,
        )
    }
}

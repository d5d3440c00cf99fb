use serde::{Deserialize, Serialize};

use crate::salary::{Currency, ParsedRange, SalaryUnit};

/// Unit conversion constants for turning parsed bounds into millions of local currency.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
pub struct Conversion {
    /// Local currency units per foreign currency unit.
    pub exchange_rate: f64,
    /// Local currency units per canonical unit (one million).
    pub scale_factor: f64,
    /// Local amounts at least this large without a "million" marker are read
    /// as whole currency units ("15,000,000 VND").
    pub whole_unit_threshold: f64,
}

impl Default for Conversion {
    fn default() -> Self {
        Self {
            exchange_rate: 25_000.0,
            scale_factor: 1_000_000.0,
            whole_unit_threshold: 100_000.0,
        }
    }
}

impl Conversion {
    /// Converts one bound into the canonical unit, rounded to two decimals.
    pub fn to_canonical(&self, value: f64, currency: Currency, unit: SalaryUnit) -> Option<f64> {
        let canonical = match currency {
            Currency::Foreign => value * self.exchange_rate / self.scale_factor,
            Currency::Local
                if unit == SalaryUnit::Bare && value >= self.whole_unit_threshold =>
            {
                value / self.scale_factor
            }
            Currency::Local => value,
            Currency::Negotiable | Currency::Unparsed => return None,
        };
        Some(round_cents(canonical))
    }
}

/// A salary in millions of local currency.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct NormalizedSalary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    pub currency: Currency,
}

pub fn normalize(parsed: &ParsedRange, conversion: &Conversion) -> NormalizedSalary {
    let convert = |x: Option<f64>| x.and_then(|x| conversion.to_canonical(x, parsed.currency, parsed.unit));
    let min = convert(parsed.min);
    let max = convert(parsed.max);

    NormalizedSalary {
        min,
        max,
        average: resolve_average(min, max),
        currency: parsed.currency,
    }
}

/// Mean of both bounds, or whichever one is present.
pub fn resolve_average(min: Option<f64>, max: Option<f64>) -> Option<f64> {
    match (min, max) {
        (Some(min), Some(max)) => Some(round_cents((min + max) / 2.0)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

pub fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

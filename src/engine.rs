use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::Result,
    estimate::{Draw, Estimate},
    normalize::{normalize, NormalizedSalary},
    salary::{extract, Currency, ParsedRange},
};

/// Where one record ended up after normalization.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SalaryState {
    /// The posting explicitly declined to give a figure.
    Negotiable,
    /// No figure could be read from the text.
    Unparsed,
    /// Only one bound was found.
    Partial,
    /// Both bounds were found.
    Full,
    /// The figure was synthesized from level and title.
    Estimated,
}

/// The result of parsing one raw salary string, without estimation.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct SalaryReport {
    pub parsed: ParsedRange,
    pub normalized: NormalizedSalary,
    pub state: SalaryState,
}

impl SalaryReport {
    pub fn average(&self) -> Option<f64> {
        self.normalized.average
    }

    pub fn currency(&self) -> Currency {
        self.parsed.currency
    }
}

impl Display for SalaryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |x: Option<f64>| x.map_or("-".to_string(), |x| x.to_string());
        write!(
            f,
            "min={} max={} currency={} average={} ({:?})",
            show(self.parsed.min),
            show(self.parsed.max),
            self.parsed.currency,
            show(self.normalized.average),
            self.state,
        )
    }
}

/// A report plus the estimate that filled it in, if any.
#[derive(Clone, PartialEq, Debug)]
pub struct Resolution {
    pub report: SalaryReport,
    pub estimate: Option<Estimate>,
}

impl Resolution {
    pub fn state(&self) -> SalaryState {
        if self.estimate.is_some() {
            SalaryState::Estimated
        } else {
            self.report.state
        }
    }

    pub fn average(&self) -> Option<f64> {
        self.estimate
            .as_ref()
            .map(|x| x.value)
            .or(self.report.average())
    }
}

/// Turns raw salary text into millions of local currency.
#[derive(Default, Debug)]
pub struct SalaryEngine {
    config: Config,
}

impl SalaryEngine {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn parse(&self, raw: Option<&str>) -> ParsedRange {
        extract(raw, &self.config.markers)
    }

    /// Parses, converts, and averages one raw salary string.
    pub fn evaluate(&self, raw: Option<&str>) -> SalaryReport {
        let parsed = self.parse(raw);
        let normalized = normalize(&parsed, &self.config.conversion);
        let state = match (parsed.currency, normalized.min, normalized.max) {
            (Currency::Negotiable, _, _) => SalaryState::Negotiable,
            (_, Some(_), Some(_)) => SalaryState::Full,
            (_, Some(_), None) | (_, None, Some(_)) => SalaryState::Partial,
            (_, None, None) => SalaryState::Unparsed,
        };

        SalaryReport {
            parsed,
            normalized,
            state,
        }
    }

    /// True if a record in `state` should get an estimated salary.
    pub fn is_estimable(&self, state: SalaryState) -> bool {
        match state {
            SalaryState::Unparsed => true,
            SalaryState::Negotiable => self.config.estimate_negotiable,
            SalaryState::Partial | SalaryState::Full | SalaryState::Estimated => false,
        }
    }

    pub fn estimate(&self, title: &str, level: Option<&str>, draw: &mut impl Draw) -> Estimate {
        self.config.bands.estimate(title, level, draw)
    }

    /// Evaluates a record's salary text, estimating one if the text yields nothing.
    pub fn resolve(
        &self,
        title: &str,
        level: Option<&str>,
        raw: Option<&str>,
        draw: &mut impl Draw,
    ) -> Resolution {
        let report = self.evaluate(raw);
        let estimate = self
            .is_estimable(report.state)
            .then(|| self.estimate(title, level, draw));
        Resolution { report, estimate }
    }
}

use rand::{rngs::ThreadRng, Rng};
use serde::{Deserialize, Serialize};

/// A compensation range for one seniority level, in millions of local currency.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
pub struct LevelBand {
    pub level: String,
    pub lower: f64,
    pub upper: f64,
}

impl LevelBand {
    pub fn new(level: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            level: level.into(),
            lower,
            upper,
        }
    }

    /// Both bounds are finite and `lower < upper`.
    pub fn is_valid(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper
    }
}

/// A multiplier applied when a job title contains `keyword`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
pub struct KeywordBonus {
    pub keyword: String,
    pub multiplier: f64,
}

impl KeywordBonus {
    pub fn new(keyword: impl Into<String>, multiplier: f64) -> Self {
        Self {
            keyword: keyword.into(),
            multiplier,
        }
    }
}

/// A source of uniform draws within a level band.
pub trait Draw {
    fn uniform(&mut self, lower: f64, upper: f64) -> f64;
}

/// Draws from a random number generator.
pub struct RngDraw<R>(pub R);

impl RngDraw<ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl<R: Rng> Draw for RngDraw<R> {
    /// Returns `lower` unchanged unless both bounds are finite and `lower < upper`.
    fn uniform(&mut self, lower: f64, upper: f64) -> f64 {
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return lower;
        }
        self.0.gen_range(lower..=upper)
    }
}

/// Always draws the same fraction of the way through the band (0.0 = lower, 1.0 = upper).
pub struct FixedDraw(pub f64);

impl Draw for FixedDraw {
    fn uniform(&mut self, lower: f64, upper: f64) -> f64 {
        lower + self.0.clamp(0.0, 1.0) * (upper - lower)
    }
}

/// A salary synthesized from level and title rather than parsed from text.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Estimate {
    /// Millions of local currency, rounded to the nearest 0.5.
    pub value: f64,
    /// The band the base value was drawn from.
    pub level: String,
    /// The title keyword multiplier that was applied.
    pub multiplier: f64,
    /// A human-readable provenance label, e.g. "~25.5 triệu (estimated)".
    pub label: String,
}

/// The level and keyword tables used for estimation.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct SalaryBands {
    pub levels: Vec<LevelBand>,
    /// Used when a job's level isn't in `levels`.
    pub default_band: LevelBand,
    pub bonuses: Vec<KeywordBonus>,
    /// The canonical unit's name in provenance labels.
    pub unit_label: String,
}

impl Default for SalaryBands {
    fn default() -> Self {
        Self {
            levels: vec![
                LevelBand::new("Intern", 3.0, 8.0),
                LevelBand::new("Junior", 8.0, 18.0),
                LevelBand::new("Mid-level", 18.0, 35.0),
                LevelBand::new("Senior", 35.0, 60.0),
                LevelBand::new("Lead", 50.0, 80.0),
                LevelBand::new("Manager", 60.0, 100.0),
            ],
            default_band: LevelBand::new("Mid-level", 18.0, 35.0),
            bonuses: vec![
                KeywordBonus::new("blockchain", 1.3),
                KeywordBonus::new("ai", 1.25),
                KeywordBonus::new("machine learning", 1.25),
                KeywordBonus::new("architect", 1.4),
                KeywordBonus::new("tech lead", 1.3),
                KeywordBonus::new("senior", 1.2),
                KeywordBonus::new("lead", 1.3),
                KeywordBonus::new("principal", 1.5),
                KeywordBonus::new("director", 1.6),
                KeywordBonus::new("head", 1.5),
            ],
            unit_label: "triệu".to_string(),
        }
    }
}

impl SalaryBands {
    /// Looks up a level band by name (case-insensitive), falling back to the default band.
    pub fn band(&self, level: Option<&str>) -> &LevelBand {
        let Some(level) = level.map(str::trim).filter(|x| !x.is_empty()) else {
            return &self.default_band;
        };
        let level = level.to_lowercase();
        self.levels
            .iter()
            .find(|band| band.level.to_lowercase() == level)
            .unwrap_or(&self.default_band)
    }

    /// The largest bonus whose keyword occurs in `title`, or 1.0.
    pub fn multiplier(&self, title: &str) -> f64 {
        let title = title.to_lowercase();
        self.bonuses
            .iter()
            .filter(|bonus| title.contains(&bonus.keyword.to_lowercase()))
            .map(|bonus| bonus.multiplier)
            .fold(1.0, f64::max)
    }

    /// Estimates a salary for a job. A level band that isn't valid is replaced by
    /// the default band.
    pub fn estimate(&self, title: &str, level: Option<&str>, draw: &mut impl Draw) -> Estimate {
        let band = match self.band(level) {
            band if band.is_valid() => band,
            band => {
                log::warn!("Ignoring invalid band {:?}", band);
                &self.default_band
            }
        };
        let multiplier = self.multiplier(title);
        let base = draw.uniform(band.lower, band.upper);
        let value = round_half_step(base * multiplier);
        log::debug!(
            "Estimated {} for {:?} ({}: {} x {})",
            value,
            title,
            band.level,
            base,
            multiplier,
        );

        Estimate {
            value,
            level: band.level.clone(),
            multiplier,
            label: format!("~{} {} (estimated)", value, self.unit_label),
        }
    }
}

/// Rounds to the nearest 0.5, with ties rounding up.
pub fn round_half_step(x: f64) -> f64 {
    (x * 2.0 + 0.5).floor() / 2.0
}

macro_rules! re {
    ($name:ident, $($e:expr),* $(,)?) => {
        static $name: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(
            || regex::Regex::new(concat!($($e),*)).unwrap(),
        );
    };
}

mod config;
mod engine;
mod error;
mod estimate;
mod job;
mod normalize;
mod pipeline;
mod salary;
mod stats;

pub use config::Config;
pub use engine::{Resolution, SalaryEngine, SalaryReport, SalaryState};
pub use error::{Error, Result};
pub use estimate::{Draw, Estimate, FixedDraw, KeywordBonus, LevelBand, RngDraw, SalaryBands};
pub use job::{parse_level, Job, JobLevel};
pub use normalize::{normalize, resolve_average, Conversion, NormalizedSalary};
pub use pipeline::{BatchSummary, Pipeline};
pub use salary::{extract, Currency, Markers, ParsedRange, Rule, SalaryUnit};
pub use stats::SalaryStats;

pub fn init_logger(default_level: log::LevelFilter) {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(default_level)
        .parse_default_env()
        .init();
}

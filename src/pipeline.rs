use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    path::Path,
};

use colored::{Color, Colorize as _};
use tiny_bail::prelude::*;

use crate::{
    engine::{SalaryEngine, SalaryState},
    error::Result,
    estimate::Draw,
    job::Job,
    stats::SalaryStats,
};

/// Counts from one pass of [`Pipeline::normalize_jobs`].
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct BatchSummary {
    /// Jobs in the store.
    pub total: usize,
    /// Jobs that had no salary before the pass.
    pub considered: usize,
    /// Jobs that got a salary parsed from their text.
    pub parsed: usize,
    /// Jobs that got an estimated salary.
    pub estimated: usize,
    /// Jobs left without a salary (negotiable, or not estimable).
    pub skipped: usize,
    /// Jobs with a salary after the pass.
    pub with_value: usize,
}

impl BatchSummary {
    pub fn updated(&self) -> usize {
        self.parsed + self.estimated
    }

    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.with_value as f64 / self.total as f64
        }
    }
}

impl Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Considered {} of {} jobs: {} parsed, {} estimated, {} skipped ({:.1}% have a salary)",
            self.considered,
            self.total,
            self.parsed,
            self.estimated,
            self.skipped,
            100.0 * self.completion_rate(),
        )
    }
}

/// Normalizes salaries across the job store.
#[derive(Default)]
pub struct Pipeline {
    pub engine: SalaryEngine,
    pub jobs: HashMap<String, Job>,
}

impl Pipeline {
    const JOBS_FILE_PATH: &str = "data/jobs.ron";
    const JOBS_BACKUP_FILE_PATH: &str = "data/jobs.ron.backup";

    pub fn new(engine: SalaryEngine) -> Self {
        Self {
            engine,
            jobs: HashMap::new(),
        }
    }

    pub fn load_jobs(&mut self) {
        r!(self.load_jobs_from(Self::JOBS_FILE_PATH));
    }

    pub fn save_jobs(&self) {
        r!(self.save_jobs_to(Self::JOBS_FILE_PATH, Self::JOBS_BACKUP_FILE_PATH));
    }

    pub fn load_jobs_from(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let jobs_str = std::fs::read_to_string(path)?;
        self.jobs = ron::from_str(&jobs_str)?;
        log::debug!("Loaded {} jobs", self.jobs.len());
        Ok(())
    }

    /// Writes the store, first copying any existing file to `backup_path`.
    pub fn save_jobs_to(&self, path: impl AsRef<Path>, backup_path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            std::fs::copy(path, backup_path)?;
        }
        let jobs_str = ron::to_string(&self.jobs)?;
        std::fs::write(path, jobs_str)?;
        Ok(())
    }

    /// Fills in a salary for every job that doesn't have one yet. Jobs that
    /// already hold a salary are never touched.
    pub fn normalize_jobs(&mut self, draw: &mut impl Draw) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.jobs.len(),
            ..Default::default()
        };

        for (id, job) in &mut self.jobs {
            cq!(job.avg_salary.is_none());
            summary.considered += 1;

            if job.infer_level() {
                log::debug!("[{}] Inferred level {:?}: {}", id, job.level, job);
            }
            let resolution = self.engine.resolve(
                &job.title,
                job.level.as_deref(),
                job.salary_raw.as_deref(),
                draw,
            );
            job.apply(&resolution);

            match resolution.state() {
                SalaryState::Full | SalaryState::Partial => summary.parsed += 1,
                SalaryState::Estimated => {
                    summary.estimated += 1;
                    log::debug!(
                        "[{}] Estimated {:?} for {} ({:?})",
                        id,
                        job.avg_salary,
                        job,
                        job.salary_raw,
                    );
                }
                SalaryState::Negotiable | SalaryState::Unparsed => {
                    summary.skipped += 1;
                    log::debug!(
                        "[{}] No salary ({:?}): {} ({:?})",
                        id,
                        resolution.state(),
                        job,
                        job.salary_raw,
                    );
                }
            }
        }

        summary.with_value = self
            .jobs
            .values()
            .filter(|job| job.avg_salary.is_some())
            .count();
        log::info!("{}", summary);
        summary
    }

    // Re-parse salaries from their raw text. Useful for when parsing logic changes.
    pub fn reparse_jobs(&mut self, draw: &mut impl Draw) -> BatchSummary {
        for job in self.jobs.values_mut() {
            job.clear_parsed();
        }
        self.normalize_jobs(draw)
    }

    pub fn stats(&self) -> Option<SalaryStats> {
        SalaryStats::from_values(self.jobs.values().filter_map(|job| job.avg_salary))
    }

    pub fn stats_by_level(&self) -> BTreeMap<String, SalaryStats> {
        let mut by_level = BTreeMap::<String, Vec<f64>>::new();
        for job in self.jobs.values() {
            let avg_salary = cq!(job.avg_salary);
            let level = job.level.clone().unwrap_or_else(|| "Unknown".to_string());
            by_level.entry(level).or_default().push(avg_salary);
        }

        by_level
            .into_iter()
            .filter_map(|(level, values)| Some((level, SalaryStats::from_values(values)?)))
            .collect()
    }

    pub fn list_jobs(&self) {
        for (id, job) in sorted(&self.jobs) {
            let salary = job
                .avg_salary
                .map_or("-".to_string(), |x| format!("{:.1}", x));
            // Ugly code makes pretty colors.
            println!(
                "{} {} {}{} {}",
                format!("{:>7}", salary).bold().color(match job.avg_salary {
                    Some(_) if job.estimated => Color::Yellow,
                    Some(_) => Color::Green,
                    None => Color::Red,
                }),
                format!("{:12}", job.company.chars().take(12).collect::<String>()),
                job.prefix(),
                format!("{:64}", job.to_string().chars().take(64).collect::<String>()),
                format!("({})", job.url.as_ref().map_or(id.as_str(), |x| x.as_str()))
                    .italic()
                    .black(),
            );
        }
    }
}

fn sorted(jobs: &HashMap<String, Job>) -> impl IntoIterator<Item = (&String, &Job)> {
    let mut ids = jobs.keys().collect::<Vec<_>>();
    ids.sort_by(|&a, &b| {
        let (a, b) = (&jobs[a], &jobs[b]);
        let salary = |job: &Job| job.avg_salary.unwrap_or(f64::NEG_INFINITY);
        salary(b)
            .total_cmp(&salary(a))
            .then_with(|| a.company.cmp(&b.company))
            .then_with(|| a.title.cmp(&b.title))
    });
    ids.into_iter().map(|id| (id, &jobs[id]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{estimate::FixedDraw, salary::Currency};

    fn pipeline() -> Pipeline {
        let mut pipeline = Pipeline::default();
        let jobs = [
            ("1", Job::new("topcv", "Acme", "Backend Developer").with_salary("20-30 triệu")),
            ("2", Job::new("topcv", "Acme", "Data Engineer").with_salary("Thỏa thuận")),
            (
                "3",
                Job::new("topcv", "Beta", "QA Tester")
                    .with_level("Junior")
                    .with_salary("abc"),
            ),
            ("4", Job::new("topcv", "Beta", "Senior Rust Engineer")),
            ("5", {
                let mut job = Job::new("manual", "Gamma", "Designer").with_salary("Up to 1 triệu");
                job.avg_salary = Some(42.0);
                job
            }),
        ];
        for (id, job) in jobs {
            pipeline.jobs.insert(id.to_string(), job);
        }
        pipeline
    }

    #[test]
    fn batch_summary() {
        let mut pipeline = pipeline();
        let summary = pipeline.normalize_jobs(&mut FixedDraw(0.0));
        assert_eq!(
            summary,
            BatchSummary {
                total: 5,
                considered: 4,
                parsed: 1,
                estimated: 2,
                skipped: 1,
                with_value: 4,
            },
        );
        assert_eq!(summary.updated(), 3);
        assert_eq!(summary.completion_rate(), 0.8);

        let jobs = &pipeline.jobs;
        assert_eq!(jobs["1"].avg_salary, Some(25.0));
        assert_eq!(jobs["2"].avg_salary, None);
        assert_eq!(jobs["2"].currency, Some(Currency::Negotiable));
        assert_eq!(jobs["2"].salary_display.as_deref(), Some("Thỏa thuận"));
        assert_eq!(jobs["3"].avg_salary, Some(8.0));
        assert!(jobs["3"].estimated);
        // Level inferred from the title, then a 1.2x "senior" bonus on the Senior band.
        assert_eq!(jobs["4"].level.as_deref(), Some("Senior"));
        assert_eq!(jobs["4"].avg_salary, Some(42.0));
        assert_eq!(jobs["5"].avg_salary, Some(42.0));
        assert_eq!(jobs["5"].currency, None);
    }

    #[test]
    fn second_pass_changes_nothing() {
        let mut pipeline = pipeline();
        pipeline.normalize_jobs(&mut FixedDraw(0.0));
        let before = pipeline
            .jobs
            .iter()
            .map(|(id, job)| (id.clone(), job.avg_salary))
            .collect::<HashMap<_, _>>();

        let summary = pipeline.normalize_jobs(&mut FixedDraw(1.0));
        assert_eq!(summary.considered, 1);
        assert_eq!(summary.updated(), 0);
        for (id, job) in &pipeline.jobs {
            assert_eq!(job.avg_salary, before[id], "{}", id);
        }
    }

    #[test]
    fn reparse_keeps_estimates() {
        let mut pipeline = pipeline();
        pipeline.normalize_jobs(&mut FixedDraw(0.0));
        let summary = pipeline.reparse_jobs(&mut FixedDraw(1.0));

        // Job 5 had a stored value with no parse behind it; it is re-derived from its text.
        assert_eq!(summary.parsed, 2);
        assert_eq!(summary.estimated, 0);
        assert_eq!(pipeline.jobs["5"].avg_salary, Some(1.0));
        assert_eq!(pipeline.jobs["3"].avg_salary, Some(8.0));
    }

    #[test]
    fn stats() {
        let mut pipeline = pipeline();
        pipeline.normalize_jobs(&mut FixedDraw(0.0));

        let stats = pipeline.stats().unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 8.0);
        assert_eq!(stats.max, 42.0);

        let by_level = pipeline.stats_by_level();
        assert_eq!(by_level["Junior"].count, 1);
        assert_eq!(by_level["Senior"].mean, 42.0);
        assert_eq!(by_level["Mid-level"].count, 1);
        assert_eq!(by_level["Unknown"].count, 1);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.ron");
        let backup_path = dir.path().join("jobs.ron.backup");

        let mut pipeline = pipeline();
        pipeline.save_jobs_to(&path, &backup_path).unwrap();
        assert!(!backup_path.exists());
        pipeline.normalize_jobs(&mut FixedDraw(0.0));
        pipeline.save_jobs_to(&path, &backup_path).unwrap();
        assert!(backup_path.exists());

        let mut loaded = Pipeline::default();
        loaded.load_jobs_from(&path).unwrap();
        assert_eq!(loaded.jobs.len(), 5);
        assert_eq!(loaded.jobs["1"].avg_salary, Some(25.0));
        assert_eq!(loaded.jobs["3"].salary_raw.as_deref(), Some("abc"));
        assert_eq!(
            loaded.jobs["3"].salary_display.as_deref(),
            Some("~8 triệu (estimated)"),
        );

        let mut backup = Pipeline::default();
        backup.load_jobs_from(&backup_path).unwrap();
        assert_eq!(backup.jobs["1"].avg_salary, None);
    }
}

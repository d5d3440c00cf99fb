use std::fmt::Display;

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize as _};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    engine::{Resolution, SalaryState},
    salary::Currency,
};

/// A job posting record as kept by the job store.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Job {
    /// The time when the job was first found.
    pub timestamp: DateTime<Utc>,
    /// The name of the source where the job was found.
    pub source: String,
    /// The name of the company offering the job.
    pub company: String,
    /// The URL to the job page.
    #[serde(default)]
    pub url: Option<Url>,
    /// The job title.
    pub title: String,
    /// The job level label (Intern, Junior, Mid-level, etc.).
    #[serde(default)]
    pub level: Option<String>,
    /// The salary text exactly as scraped. Never rewritten.
    #[serde(default)]
    pub salary_raw: Option<String>,
    /// Average monthly salary in millions of local currency.
    #[serde(default)]
    pub avg_salary: Option<f64>,
    /// The salary as shown to users: the raw text, or an estimate label.
    #[serde(default)]
    pub salary_display: Option<String>,
    /// How the salary was classified.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// True if `avg_salary` was estimated rather than parsed.
    #[serde(default)]
    pub estimated: bool,
}

impl Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.title)
    }
}

impl Job {
    pub fn new(
        source: impl Into<String>,
        company: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            source: source.into(),
            company: company.into(),
            url: None,
            title: title.into(),
            level: None,
            salary_raw: None,
            avg_salary: None,
            salary_display: None,
            currency: None,
            estimated: false,
        }
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_salary(mut self, salary_raw: impl Into<String>) -> Self {
        self.salary_raw = Some(salary_raw.into());
        self
    }

    /// Fills in a missing level from the title. Returns true if it did.
    pub fn infer_level(&mut self) -> bool {
        if self.level.as_deref().is_some_and(|x| !x.trim().is_empty()) {
            return false;
        }
        self.level = Some(parse_level(&normalized(&self.title)).to_string());
        true
    }

    /// Records a resolved salary. If nothing was derived, only the classification
    /// and the raw text as display text are recorded.
    pub fn apply(&mut self, resolution: &Resolution) {
        self.currency = Some(resolution.report.currency());
        self.salary_display = self.salary_raw.clone();
        let Some(average) = resolution.average() else {
            return;
        };

        self.avg_salary = Some(average);
        match &resolution.estimate {
            Some(estimate) => {
                self.estimated = true;
                self.salary_display = Some(estimate.label.clone());
            }
            None => self.estimated = false,
        }
    }

    /// Clears a parsed salary so it can be parsed again. Estimates are kept.
    pub fn clear_parsed(&mut self) {
        if self.estimated {
            return;
        }
        self.avg_salary = None;
        self.salary_display = None;
        self.currency = None;
    }

    pub fn state(&self) -> Option<SalaryState> {
        if self.estimated {
            return Some(SalaryState::Estimated);
        }
        match self.currency? {
            Currency::Negotiable => Some(SalaryState::Negotiable),
            Currency::Unparsed => Some(SalaryState::Unparsed),
            Currency::Local | Currency::Foreign => None,
        }
    }

    pub(crate) fn prefix(&self) -> ColoredString {
        if self.estimated {
            "[~] ".yellow()
        } else {
            "".into()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum JobLevel {
    Intern,
    Junior,
    Mid,
    Senior,
    Lead,
    Manager,
}

impl Display for JobLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobLevel::Intern => "Intern",
            JobLevel::Junior => "Junior",
            JobLevel::Mid => "Mid-level",
            JobLevel::Senior => "Senior",
            JobLevel::Lead => "Lead",
            JobLevel::Manager => "Manager",
        };
        write!(f, "{}", s)
    }
}

fn normalized(s: impl AsRef<str>) -> String {
    s.as_ref()
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric(), " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_level(norm: &str) -> JobLevel {
    re!(
        INTERN_RE,
        r"\b(intern(ship)?|trainee|thực tập( sinh)?|co ?op)\b",
    );
    re!(
        JUNIOR_RE,
        r"\b(junior|jr|fresher|entry|associate|mới tốt nghiệp)\b",
    );
    re!(MID_RE, r"\b(mid|middle|mid level)\b");
    re!(SENIOR_RE, r"\b(senior|sn?r|expert|principal|staff)\b");
    re!(
        LEAD_RE,
        r"\b(lead|leader|team lead|architect|trưởng nhóm)\b",
    );
    re!(
        MANAGER_RE,
        r"\b(manager|director|head|cto|ceo|trưởng phòng|giám đốc|quản lý)\b",
    );

    // Seniority words outrank entry-level ones ("Associate Director").
    if INTERN_RE.is_match(norm) {
        JobLevel::Intern
    } else if SENIOR_RE.is_match(norm) {
        JobLevel::Senior
    } else if LEAD_RE.is_match(norm) {
        JobLevel::Lead
    } else if MANAGER_RE.is_match(norm) {
        JobLevel::Manager
    } else if JUNIOR_RE.is_match(norm) {
        JobLevel::Junior
    } else if MID_RE.is_match(norm) {
        JobLevel::Mid
    } else {
        JobLevel::Mid
    }
}

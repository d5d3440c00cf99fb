use std::fmt::Display;

use html_escape::decode_html_entities;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a salary figure is denominated, or why it has no figure.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Currency {
    /// Local currency (VND), expressed in millions unless stated otherwise.
    Local,
    /// Foreign currency (USD), converted at a fixed exchange rate.
    Foreign,
    /// The posting explicitly declined to state a figure.
    Negotiable,
    /// Text was absent or not understood.
    Unparsed,
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Currency::Local => "VND",
            Currency::Foreign => "USD",
            Currency::Negotiable => "Negotiable",
            Currency::Unparsed => "Unparsed",
        };
        write!(f, "{}", s)
    }
}

/// Whether the text carried an explicit "million" unit.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum SalaryUnit {
    Million,
    #[default]
    Bare,
}

/// The bounds found in one salary string, before unit conversion.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct ParsedRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Currency,
    #[serde(default)]
    pub unit: SalaryUnit,
}

impl ParsedRange {
    pub const NEGOTIABLE: Self = Self::empty(Currency::Negotiable);
    pub const UNPARSED: Self = Self::empty(Currency::Unparsed);

    const fn empty(currency: Currency) -> Self {
        Self {
            min: None,
            max: None,
            currency,
            unit: SalaryUnit::Bare,
        }
    }

    pub fn has_value(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// Phrases that classify salary text before any numbers are read.
///
/// Both regexes run against lowercased text.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Markers {
    /// Marks a salary as explicitly negotiable.
    #[serde(with = "serde_regex")]
    pub negotiable_re: Regex,
    /// Marks a salary as denominated in the foreign currency.
    #[serde(with = "serde_regex")]
    pub foreign_re: Regex,
}

re!(
    DEFAULT_NEGOTIABLE_RE,
    r"th[ỏo]a thuận|thoả thuận|thoa thuan|negotiable",
);
re!(DEFAULT_FOREIGN_RE, r"usd|\$");

impl Default for Markers {
    fn default() -> Self {
        Self {
            negotiable_re: DEFAULT_NEGOTIABLE_RE.clone(),
            foreign_re: DEFAULT_FOREIGN_RE.clone(),
        }
    }
}

re!(MILLION_RE, r"(triệu|trieu|million|mil|tr)\b");
re!(
    UNIT_RE,
    r"\$|(triệu|trieu|million|mil|tr|usd|vnđ|vnd|đồng|dong|đ)\b",
);

#[derive(Error, Debug, PartialEq)]
#[error("malformed number literal {0:?}")]
pub struct MalformedNumber(pub String);

/// A lower and upper bound, either of which may be missing.
pub type Bounds = (Option<f64>, Option<f64>);

/// One numeric pattern. Patterns are tried in the order of [`Rule::ALL`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rule {
    /// "from X", "từ X", "trên X": a lower bound only.
    From,
    /// "up to X", "lên đến X", "tối đa X": an upper bound only.
    UpTo,
    /// "X - Y": both bounds.
    Range,
    /// "Xk": X thousand units.
    Thousands,
    /// "X": a single figure.
    Bare,
}

impl Rule {
    pub const ALL: [Rule; 5] = [
        Rule::From,
        Rule::UpTo,
        Rule::Range,
        Rule::Thousands,
        Rule::Bare,
    ];

    fn regex(self) -> &'static Regex {
        // A number literal is `(\d[\d,.]*)`, optionally followed by a `k` suffix.
        re!(
            FROM_RE,
            r"\b(?:từ|trên|from|above|over)\s*:?\s*(\d[\d,.]*)(?:\s*(k)\b)?",
        );
        re!(
            UP_TO_RE,
            r"\b(?:lên đến|lên tới|tối đa|up ?to|at most|max(?:imum)?)\s*:?\s*",
            r"(\d[\d,.]*)(?:\s*(k)\b)?",
        );
        re!(
            RANGE_RE,
            r"(\d[\d,.]*)(?:\s*(k)\b)?\s*(?:-|–|—|~|\bto\b|đến)\s*(\d[\d,.]*)(?:\s*(k)\b)?",
        );
        re!(THOUSANDS_RE, r"(\d[\d,.]*)\s*(k)\b");
        re!(BARE_RE, r"(\d[\d,.]*)()");

        match self {
            Rule::From => &*FROM_RE,
            Rule::UpTo => &*UP_TO_RE,
            Rule::Range => &*RANGE_RE,
            Rule::Thousands => &*THOUSANDS_RE,
            Rule::Bare => &*BARE_RE,
        }
    }

    /// Applies this rule to stripped salary text.
    ///
    /// Returns `None` if the rule doesn't match at all.
    pub fn apply(self, text: &str) -> Option<Result<Bounds, MalformedNumber>> {
        let caps = self.regex().captures(text)?;
        Some(match self {
            Rule::From => number(&caps, 1, 2).map(|x| (Some(x), None)),
            Rule::UpTo => number(&caps, 1, 2).map(|x| (None, Some(x))),
            Rule::Range => number(&caps, 1, 2)
                .and_then(|min| Ok((Some(min), Some(number(&caps, 3, 4)?)))),
            Rule::Thousands | Rule::Bare => number(&caps, 1, 2).map(|x| (Some(x), Some(x))),
        })
    }
}

/// Reads the literal in capture group `value`, scaled by 1000 if group `suffix` matched.
fn number(caps: &Captures, value: usize, suffix: usize) -> Result<f64, MalformedNumber> {
    let literal = caps.get(value).map_or("", |m| m.as_str());
    let digits = literal.trim_end_matches(['.', ',']).replace(',', "");
    let x = digits
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .ok_or_else(|| MalformedNumber(literal.to_string()))?;
    let thousands = caps.get(suffix).is_some_and(|m| !m.as_str().is_empty());
    Ok(if thousands { x * 1000.0 } else { x })
}

/// Extracts a salary range from free text. Never fails: anything that can't be
/// understood comes back as [`ParsedRange::UNPARSED`].
pub fn extract(raw: Option<&str>, markers: &Markers) -> ParsedRange {
    let Some(raw) = raw else {
        return ParsedRange::UNPARSED;
    };
    let text = decode_html_entities(raw).to_lowercase();
    let text = text.trim();
    if text.is_empty() {
        return ParsedRange::UNPARSED;
    }

    // An explicit "negotiable" wins over any digits in the text.
    if markers.negotiable_re.is_match(text) {
        return ParsedRange::NEGOTIABLE;
    }

    let currency = if markers.foreign_re.is_match(text) {
        Currency::Foreign
    } else {
        Currency::Local
    };
    let unit = if MILLION_RE.is_match(text) {
        SalaryUnit::Million
    } else {
        SalaryUnit::Bare
    };
    let stripped = UNIT_RE.replace_all(text, " ");

    for rule in Rule::ALL {
        let Some(bounds) = rule.apply(&stripped) else {
            continue;
        };
        return match bounds {
            Ok((min, max)) => ParsedRange {
                min,
                max,
                currency,
                unit,
            },
            Err(e) => {
                log::debug!("{:?} matched {:?} but {}", rule, raw, e);
                ParsedRange::UNPARSED
            }
        };
    }

    ParsedRange::UNPARSED
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> ParsedRange {
        extract(Some(s), &Markers::default())
    }

    #[test]
    fn negotiable() {
        for s in [
            "Thỏa thuận",
            "THỎA THUẬN",
            "Thoả thuận",
            "Negotiable",
            "  negotiable (up to 2000 USD)  ",
            "20 - 30 triệu, thỏa thuận",
            "Th&#7887;a thu&#7853;n",
        ] {
            assert_eq!(parse(s), ParsedRange::NEGOTIABLE, "{}", s);
        }
    }

    #[test]
    fn unparsed() {
        for s in ["", "   ", "abc", "Cạnh tranh", "$", "k"] {
            assert_eq!(parse(s), ParsedRange::UNPARSED, "{}", s);
        }
        assert_eq!(extract(None, &Markers::default()), ParsedRange::UNPARSED);
    }

    #[test]
    fn malformed_literal_is_unparsed() {
        assert_eq!(parse("1.2.3 triệu"), ParsedRange::UNPARSED);
        assert_eq!(parse("up to 4.5.6 USD"), ParsedRange::UNPARSED);
    }

    #[test]
    fn rules_match_independently() {
        let cases: [(Rule, &str, Option<Bounds>); 10] = [
            (Rule::From, "từ 15", Some((Some(15.0), None))),
            (Rule::From, "above 2k", Some((Some(2000.0), None))),
            (Rule::From, "15", None),
            (Rule::UpTo, "lên đến 40", Some((None, Some(40.0)))),
            (Rule::UpTo, "max: 1,500", Some((None, Some(1500.0)))),
            (Rule::Range, "10 – 12.5", Some((Some(10.0), Some(12.5)))),
            (Rule::Range, "2k to 3k", Some((Some(2000.0), Some(3000.0)))),
            (Rule::Thousands, "1.5k", Some((Some(1500.0), Some(1500.0)))),
            (Rule::Thousands, "15", None),
            (Rule::Bare, "lương 7", Some((Some(7.0), Some(7.0)))),
        ];
        for (rule, text, expected) in cases {
            assert_eq!(rule.apply(text).map(Result::unwrap), expected, "{:?} {}", rule, text);
        }
    }

    #[test]
    fn directional_rules_precede_range() {
        // "from" wins even though a range follows.
        let parsed = parse("Từ 10 - 20 triệu");
        assert_eq!((parsed.min, parsed.max), (Some(10.0), None));
    }

    #[test]
    fn currency_and_unit() {
        for (s, currency, unit) in TEST_CASES_UNIT {
            let parsed = parse(s);
            assert_eq!(parsed.currency, currency, "{}", s);
            assert_eq!(parsed.unit, unit, "{}", s);
        }
    }

    #[test]
    fn bounds() {
        for (s, min, max, currency) in TEST_CASES {
            let parsed = parse(s);
            assert_eq!((parsed.min, parsed.max), (min, max), "{}", s);
            assert_eq!(parsed.currency, currency, "{}", s);
        }
    }

    const TEST_CASES_UNIT: [(&str, Currency, SalaryUnit); 6] = [
        ("20-30 triệu", Currency::Local, SalaryUnit::Million),
        ("15tr", Currency::Local, SalaryUnit::Million),
        ("Trên 20", Currency::Local, SalaryUnit::Bare),
        ("2000 USD", Currency::Foreign, SalaryUnit::Bare),
        ("$1,500", Currency::Foreign, SalaryUnit::Bare),
        ("15,000,000 VND", Currency::Local, SalaryUnit::Bare),
    ];

    const TEST_CASES: [(&str, Option<f64>, Option<f64>, Currency); 18] = [
        ("20-30 triệu", Some(20.0), Some(30.0), Currency::Local),
        ("20 - 30 Triệu", Some(20.0), Some(30.0), Currency::Local),
        ("Up to 15 triệu", None, Some(15.0), Currency::Local),
        ("Lên đến 40 triệu", None, Some(40.0), Currency::Local),
        ("Tối đa 25tr", None, Some(25.0), Currency::Local),
        ("Từ 12 triệu", Some(12.0), None, Currency::Local),
        ("Trên 30 triệu", Some(30.0), None, Currency::Local),
        ("From 1,000 USD", Some(1000.0), None, Currency::Foreign),
        ("2000 USD", Some(2000.0), Some(2000.0), Currency::Foreign),
        ("$1,500 - $2,500", Some(1500.0), Some(2500.0), Currency::Foreign),
        ("1,000 - 2,000 USD", Some(1000.0), Some(2000.0), Currency::Foreign),
        ("2k USD", Some(2000.0), Some(2000.0), Currency::Foreign),
        ("2k - 3.5k USD", Some(2000.0), Some(3500.0), Currency::Foreign),
        ("Up to $3k", None, Some(3000.0), Currency::Foreign),
        ("12.5 triệu", Some(12.5), Some(12.5), Currency::Local),
        ("15,000,000 VND", Some(15000000.0), Some(15000000.0), Currency::Local),
        ("Lương: 18 triệu/tháng", Some(18.0), Some(18.0), Currency::Local),
        ("  10 ~ 15 triệu ", Some(10.0), Some(15.0), Currency::Local),
    ];
}

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Bucket, NormalizedPosting};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("at least one bucket is required")]
    ZeroBuckets,
    #[error("unknown field {0:?}")]
    UnknownField(String),
}

/// Numeric columns a dataset can be bucketed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    NumApplicants,
    AnnualSalary,
}

impl NumericField {
    pub fn value(self, posting: &NormalizedPosting) -> Option<f64> {
        match self {
            NumericField::NumApplicants => posting.num_applicants,
            NumericField::AnnualSalary => posting.annual_salary_amount(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericField::NumApplicants => "num_applicants",
            NumericField::AnnualSalary => "annual_salary",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for NumericField {
    type Err = AggregateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "num_applicants" => Ok(NumericField::NumApplicants),
            "annual_salary" => Ok(NumericField::AnnualSalary),
            other => Err(AggregateError::UnknownField(other.to_string())),
        }
    }
}

/// Text columns a dataset can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    City,
    Province,
    Country,
    Employer,
}

impl CategoricalField {
    pub fn value(self, posting: &NormalizedPosting) -> Option<&str> {
        match self {
            CategoricalField::City => posting.city.as_deref(),
            CategoricalField::Province => posting.province.as_deref(),
            CategoricalField::Country => posting.country.as_deref(),
            CategoricalField::Employer => Some(posting.employer.as_str()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::City => "city",
            CategoricalField::Province => "province",
            CategoricalField::Country => "country",
            CategoricalField::Employer => "employer",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for CategoricalField {
    type Err = AggregateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "city" => Ok(CategoricalField::City),
            "province" => Ok(CategoricalField::Province),
            "country" => Ok(CategoricalField::Country),
            "employer" => Ok(CategoricalField::Employer),
            other => Err(AggregateError::UnknownField(other.to_string())),
        }
    }
}

/// Split `records` into percentile buckets of `dimension` and average the
/// annual salary in each.
///
/// Cut points sit at percentiles `0, 100/n, ..., 100(n-1)/n`, with the observed
/// maximum as the closing boundary. Equal cut points collapse, so heavily tied
/// data yields fewer, wider buckets. Every bucket is `[low, high)` except the
/// last, which is `[low, high]`. Records without a `dimension` value are ignored;
/// so are unparsed salaries when averaging.
pub fn bucket_by_percentile(
    records: &[NormalizedPosting],
    dimension: NumericField,
    num_buckets: usize,
) -> Result<Vec<Bucket>, AggregateError> {
    if num_buckets == 0 {
        return Err(AggregateError::ZeroBuckets);
    }

    let mut values: Vec<f64> = records.iter().filter_map(|r| dimension.value(r)).collect();
    values.sort_by(f64::total_cmp);
    let Some(&max) = values.last() else {
        return Ok(Vec::new());
    };

    let mut boundaries: Vec<f64> = Vec::with_capacity(num_buckets + 1);
    for i in 0..num_buckets {
        let cut = percentile(&values, i as f64 * 100.0 / num_buckets as f64);
        if cut < max && boundaries.last().map_or(true, |&last| cut > last) {
            boundaries.push(cut);
        }
    }
    boundaries.push(max);

    if boundaries.len() == 1 {
        return Ok(vec![build_bucket(records, dimension, max, max, true)]);
    }

    let last = boundaries.len() - 2;
    let buckets = boundaries
        .windows(2)
        .enumerate()
        .map(|(i, pair)| build_bucket(records, dimension, pair[0], pair[1], i == last))
        .collect();
    Ok(buckets)
}

fn build_bucket(
    records: &[NormalizedPosting],
    dimension: NumericField,
    low: f64,
    high: f64,
    inclusive_high: bool,
) -> Bucket {
    let members: Vec<&NormalizedPosting> = records
        .iter()
        .filter(|record| {
            dimension.value(record).is_some_and(|value| {
                value >= low && (value < high || (inclusive_high && value <= high))
            })
        })
        .collect();
    let salaries: Vec<f64> = members
        .iter()
        .filter_map(|record| record.annual_salary_amount())
        .collect();

    let closing = if inclusive_high { ']' } else { ')' };
    Bucket {
        range_label: format!("[{}-{}{closing}", display_bound(low), display_bound(high)),
        low,
        high,
        inclusive_high,
        count: members.len(),
        mean_value: mean(&salaries).map(round_cents),
    }
}

/// Percentile of pre-sorted values, linearly interpolated between ranks.
///
/// Returns `NaN` for an empty slice.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let Some(&first) = sorted.first() else {
        return f64::NAN;
    };
    if sorted.len() == 1 {
        return first;
    }
    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    let fraction = rank - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * fraction
}

/// Group summary over a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub key: String,
    /// Postings in the group with a numeric annual salary.
    pub count: usize,
    pub mean_annual_salary: Option<f64>,
}

/// Count and mean annual salary per distinct value of `field`, ordered by key.
/// Postings without a value for `field` are left out.
pub fn summarize_by_category(
    records: &[NormalizedPosting],
    field: CategoricalField,
) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        let Some(key) = field.value(record) else {
            continue;
        };
        let salaries = groups.entry(key).or_default();
        if let Some(amount) = record.annual_salary_amount() {
            salaries.push(amount);
        }
    }

    groups
        .into_iter()
        .map(|(key, salaries)| CategorySummary {
            key: key.to_string(),
            count: salaries.len(),
            mean_annual_salary: mean(&salaries).map(round_cents),
        })
        .collect()
}

/// How many postings carry a usable salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SalaryCoverage {
    pub postings: usize,
    pub with_salary: usize,
}

pub fn salary_coverage(records: &[NormalizedPosting]) -> SalaryCoverage {
    SalaryCoverage {
        postings: records.len(),
        with_salary: records
            .iter()
            .filter(|record| record.annual_salary_amount().is_some())
            .count(),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn display_bound(value: f64) -> String {
    format!("{:?}", round_cents(value))
}

use serde::{Deserialize, Serialize};

/// Opaque identifier (URL) of a single job posting.
pub type PostingLink = String;

/// Posting fields as scraped, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPosting {
    pub title: String,
    /// Employer, location, posting age and applicant count joined by `·`.
    pub employer_location_blob: String,
    #[serde(default)]
    pub salary_text: Option<String>,
    pub description: String,
    pub url: PostingLink,
}

/// Annual salary as produced by the salary normalizers.
///
/// Text that carries a `$` but matches no known pattern is kept verbatim as
/// [`SalaryValue::Unparsed`] instead of being dropped. Serialized untagged, so a
/// parsed figure is a JSON number and an unparsed one a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SalaryValue {
    Annual(f64),
    Unparsed(String),
}

impl SalaryValue {
    pub fn as_annual(&self) -> Option<f64> {
        match self {
            SalaryValue::Annual(amount) => Some(*amount),
            SalaryValue::Unparsed(_) => None,
        }
    }
}

/// City / province / country split out of a raw location string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
}

/// A cleaned posting record.
///
/// `None` in `num_applicants` or `annual_salary` means either "not disclosed"
/// or "could not be parsed"; the two are not told apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPosting {
    pub title: String,
    pub employer: String,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub num_applicants: Option<f64>,
    pub annual_salary: Option<SalaryValue>,
    pub description: String,
    pub url: PostingLink,
}

impl NormalizedPosting {
    /// Numeric annual salary, skipping absent and unparsed values.
    pub fn annual_salary_amount(&self) -> Option<f64> {
        self.annual_salary.as_ref().and_then(SalaryValue::as_annual)
    }
}

/// One percentile bucket of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    /// `[low-high)` for every bucket but the last, which is `[low-high]`.
    pub range_label: String,
    pub low: f64,
    pub high: f64,
    pub inclusive_high: bool,
    /// Records whose dimension value falls in the bucket.
    pub count: usize,
    /// Mean numeric annual salary in the bucket, rounded to cents.
    /// `None` when no record in the bucket has one.
    pub mean_value: Option<f64>,
}

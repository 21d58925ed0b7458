//! Posting core: pure normalization and aggregation of scraped job postings.
mod aggregate;
mod applicants;
mod dataset;
mod location;
mod normalize;
mod salary;
mod types;

pub use aggregate::{
    bucket_by_percentile, percentile, salary_coverage, summarize_by_category, AggregateError,
    CategoricalField, CategorySummary, NumericField, SalaryCoverage,
};
pub use applicants::{parse_applicant_count, OVER_APPLICANTS_SENTINEL};
pub use dataset::{flatten_dataset, normalize_raw_dataset, Dataset, RawDataset};
pub use location::{parse_location, CANADA, CANADIAN_PROVINCES};
pub use normalize::{
    dedupe_by_url, normalize, normalize_posting, NormalizeError, NormalizeReport,
    RejectedPosting, BLOB_SEGMENTS, BLOB_SEPARATOR,
};
pub use salary::{
    parse_salary_range_or_point, parse_salary_to_annual, SalaryError, FULL_TIME_HOURS_PER_YEAR,
};
pub use types::{Bucket, Location, NormalizedPosting, PostingLink, RawPosting, SalaryValue};

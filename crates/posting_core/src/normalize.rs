use std::collections::HashSet;

use thiserror::Error;

use crate::{
    parse_applicant_count, parse_location, parse_salary_range_or_point, NormalizedPosting,
    PostingLink, RawPosting, SalaryError,
};

/// Separator between the fields of a posting's employer/location blob.
pub const BLOB_SEPARATOR: char = '·';

/// Employer, location, posting age, applicant count.
pub const BLOB_SEGMENTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error(
        "employer/location blob has {found} segments, expected {expected}: {blob:?}",
        expected = BLOB_SEGMENTS
    )]
    BlobSegments { found: usize, blob: String },
    #[error(transparent)]
    Salary(#[from] SalaryError),
}

/// A raw posting that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPosting {
    pub url: PostingLink,
    pub error: NormalizeError,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizeReport {
    pub postings: Vec<NormalizedPosting>,
    pub rejected: Vec<RejectedPosting>,
    /// Raw records dropped because their url was already seen.
    pub duplicates: usize,
}

/// Normalize a batch of raw postings.
///
/// Duplicates by `url` are dropped first (first occurrence wins). A record whose
/// structure is broken lands in [`NormalizeReport::rejected`]; the rest of the
/// batch is still normalized.
pub fn normalize(raw_postings: &[RawPosting]) -> NormalizeReport {
    let unique = dedupe_by_url(raw_postings, |raw| raw.url.as_str());
    let mut report = NormalizeReport {
        duplicates: raw_postings.len() - unique.len(),
        ..NormalizeReport::default()
    };

    for raw in unique {
        match normalize_posting(raw) {
            Ok(posting) => report.postings.push(posting),
            Err(error) => report.rejected.push(RejectedPosting {
                url: raw.url.clone(),
                error,
            }),
        }
    }
    report
}

/// Normalize one raw posting.
pub fn normalize_posting(raw: &RawPosting) -> Result<NormalizedPosting, NormalizeError> {
    let segments: Vec<&str> = raw
        .employer_location_blob
        .split(BLOB_SEPARATOR)
        .map(str::trim)
        .collect();
    let [employer, location, _posted_ago, applicants] = segments[..] else {
        return Err(NormalizeError::BlobSegments {
            found: segments.len(),
            blob: raw.employer_location_blob.clone(),
        });
    };

    let annual_salary = match raw.salary_text.as_deref() {
        Some(text) => parse_salary_range_or_point(text)?,
        None => None,
    };
    let location = parse_location(location);

    Ok(NormalizedPosting {
        title: raw.title.clone(),
        employer: employer.to_string(),
        city: location.city,
        province: location.province,
        country: location.country,
        num_applicants: parse_applicant_count(applicants),
        annual_salary,
        description: raw.description.clone(),
        url: raw.url.clone(),
    })
}

/// Keep the first record for every distinct url, preserving order.
pub fn dedupe_by_url<'a, T>(records: &'a [T], url: impl Fn(&'a T) -> &'a str) -> Vec<&'a T> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(url(record)) {
            unique.push(record);
        }
    }
    unique
}

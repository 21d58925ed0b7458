use std::collections::BTreeMap;

use crate::{dedupe_by_url, normalize, NormalizedPosting, RawPosting, RejectedPosting};

/// Normalized postings keyed by the search term that found them.
pub type Dataset = BTreeMap<String, Vec<NormalizedPosting>>;

/// Raw postings keyed by the search term that found them.
pub type RawDataset = BTreeMap<String, Vec<RawPosting>>;

/// All postings of a dataset in one list, first occurrence of each url kept.
///
/// Terms are visited in key order, so a posting found by two searches is
/// attributed to the alphabetically first term.
pub fn flatten_dataset(dataset: &Dataset) -> Vec<NormalizedPosting> {
    let all: Vec<&NormalizedPosting> = dataset.values().flatten().collect();
    dedupe_by_url(&all, |posting| posting.url.as_str())
        .into_iter()
        .map(|posting| (**posting).clone())
        .collect()
}

/// Normalize every term of a raw dataset.
///
/// Rejected records are returned alongside the term they came from.
pub fn normalize_raw_dataset(raw: &RawDataset) -> (Dataset, Vec<(String, RejectedPosting)>) {
    let mut dataset = Dataset::new();
    let mut rejected = Vec::new();
    for (term, postings) in raw {
        let report = normalize(postings);
        rejected.extend(
            report
                .rejected
                .into_iter()
                .map(|rejection| (term.clone(), rejection)),
        );
        dataset.insert(term.clone(), report.postings);
    }
    (dataset, rejected)
}

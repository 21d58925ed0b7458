use posting_core::{normalize, Dataset, RawDataset};
use scrape_logging::{scrape_info, scrape_warn};
use serde::{Deserialize, Serialize};

use crate::harvest::LinkHarvester;
use crate::session::PostingFetcher;
use crate::{HarvestEvent, HarvestSink, TermReport};

/// One search to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPlan {
    pub search_term: String,
    pub max_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    pub terms: Vec<TermReport>,
}

impl BatchReport {
    pub fn dataset(&self) -> Dataset {
        self.terms
            .iter()
            .map(|term| {
                (
                    term.harvest.search_term.clone(),
                    term.normalized.postings.clone(),
                )
            })
            .collect()
    }

    pub fn raw_dataset(&self) -> RawDataset {
        self.terms
            .iter()
            .map(|term| (term.harvest.search_term.clone(), term.raw_postings.clone()))
            .collect()
    }
}

/// Harvest, fetch and normalize every planned term, one after another.
///
/// Failures stay at record granularity: a link that cannot be fetched or a
/// posting that cannot be normalized is recorded and skipped. `on_term` sees
/// each finished term before the next one starts.
pub fn run_batch<T>(
    scraper: &mut T,
    plans: &[TermPlan],
    sink: &dyn HarvestSink,
    mut on_term: impl FnMut(&TermReport),
) -> BatchReport
where
    T: LinkHarvester + PostingFetcher,
{
    let mut report = BatchReport::default();

    for plan in plans {
        let harvest = scraper.harvest(&plan.search_term, plan.max_pages, sink);

        let mut raw_postings = Vec::with_capacity(harvest.links.len());
        let mut fetch_failures = Vec::new();
        for link in &harvest.links {
            match scraper.fetch_posting(link) {
                Ok(raw) => {
                    sink.emit(HarvestEvent::PostingFetched {
                        search_term: plan.search_term.clone(),
                        url: link.clone(),
                    });
                    raw_postings.push(raw);
                }
                Err(error) => {
                    scrape_warn!("skipping {}: {}", link, error);
                    sink.emit(HarvestEvent::PostingFailed {
                        search_term: plan.search_term.clone(),
                        url: link.clone(),
                        error: error.clone(),
                    });
                    fetch_failures.push((link.clone(), error));
                }
            }
        }

        let normalized = normalize(&raw_postings);
        for rejection in &normalized.rejected {
            scrape_warn!("dropping {}: {}", rejection.url, rejection.error);
        }
        scrape_info!(
            "{:?}: {} links, {} fetched, {} normalized, {} rejected",
            plan.search_term,
            harvest.links.len(),
            raw_postings.len(),
            normalized.postings.len(),
            normalized.rejected.len()
        );
        sink.emit(HarvestEvent::TermCompleted {
            search_term: plan.search_term.clone(),
            links: harvest.links.len(),
            postings: normalized.postings.len(),
            rejected: normalized.rejected.len(),
        });

        let term = TermReport {
            harvest,
            raw_postings,
            fetch_failures,
            normalized,
        };
        on_term(&term);
        report.terms.push(term);
    }

    report
}

use std::collections::HashSet;
use std::time::Duration;

use posting_core::{PostingLink, RawPosting};
use scrape_logging::{scrape_debug, scrape_info, scrape_warn};

use crate::session::{ListingSession, PostingFetcher};
use crate::{FetchError, HarvestEvent, HarvestOutcome, HarvestSink, LookupError, StopReason};

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Wait between reading a page and moving to the next one.
    pub settle_delay: Duration,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(5),
        }
    }
}

/// Collects the unique posting links a search turns up.
pub trait LinkHarvester {
    fn harvest(
        &mut self,
        search_term: &str,
        max_pages: usize,
        sink: &dyn HarvestSink,
    ) -> HarvestOutcome;
}

/// Harvests by paging through a [`ListingSession`].
pub struct PaginatedHarvester<S> {
    session: S,
    settings: HarvestSettings,
}

impl<S> PaginatedHarvester<S> {
    pub fn new(session: S, settings: HarvestSettings) -> Self {
        Self { session, settings }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }
}

impl<S: ListingSession> LinkHarvester for PaginatedHarvester<S> {
    fn harvest(
        &mut self,
        search_term: &str,
        max_pages: usize,
        sink: &dyn HarvestSink,
    ) -> HarvestOutcome {
        let mut outcome = HarvestOutcome {
            search_term: search_term.to_string(),
            links: Vec::new(),
            pages_read: 0,
            skipped_items: 0,
            stop: StopReason::PageLimit,
        };

        if let Err(err) = self.session.open_search(search_term) {
            scrape_warn!("search {:?} could not be opened: {}", search_term, err);
            outcome.stop = StopReason::SearchUnavailable(err.to_string());
            return outcome;
        }
        sink.emit(HarvestEvent::SearchOpened {
            search_term: search_term.to_string(),
        });

        let mut seen: HashSet<PostingLink> = HashSet::new();
        for page in 1..=max_pages {
            let items = self.session.list_items().unwrap_or_else(|err| {
                scrape_debug!("page {} of {:?} has no result list: {}", page, search_term, err);
                Vec::new()
            });

            let mut new_links = Vec::new();
            let mut skipped = 0;
            for item in &items {
                match self.session.item_link(item) {
                    Ok(link) => {
                        if seen.insert(link.clone()) {
                            new_links.push(link);
                        }
                    }
                    Err(_) => skipped += 1,
                }
            }

            outcome.pages_read = page;
            outcome.skipped_items += skipped;
            outcome.links.extend(new_links.iter().cloned());
            scrape_debug!(
                "page {} of {:?}: {} items, {} new links, {} skipped",
                page,
                search_term,
                items.len(),
                new_links.len(),
                skipped
            );
            sink.emit(HarvestEvent::PageHarvested {
                search_term: search_term.to_string(),
                page,
                new_links,
                skipped_items: skipped,
            });

            if page == max_pages {
                break;
            }

            self.session.settle(self.settings.settle_delay);
            match self.session.next_page() {
                Ok(()) => {}
                Err(LookupError::Missing(what)) => {
                    scrape_debug!("no next page for {:?} ({})", search_term, what);
                    outcome.stop = StopReason::NoMorePages;
                    break;
                }
                Err(err) => {
                    scrape_warn!("pagination of {:?} stopped: {}", search_term, err);
                    outcome.stop = StopReason::PaginationFailed(err.to_string());
                    break;
                }
            }
        }

        scrape_info!(
            "harvested {} links for {:?} over {} pages ({:?})",
            outcome.links.len(),
            search_term,
            outcome.pages_read,
            outcome.stop
        );
        outcome
    }
}

impl<S: PostingFetcher> PostingFetcher for PaginatedHarvester<S> {
    fn fetch_posting(&mut self, link: &str) -> Result<RawPosting, FetchError> {
        self.session.fetch_posting(link)
    }
}

use std::cell::RefCell;
use std::collections::HashMap;

use posting_core::RawPosting;
use posting_engine::{
    run_batch, FailureKind, FetchError, HarvestEvent, HarvestOutcome, HarvestSink, LinkHarvester,
    PostingFetcher, StopReason, TermPlan,
};
use pretty_assertions::assert_eq;

/// Serves fixed links per term and fixed postings per link.
#[derive(Default)]
struct FakeScraper {
    links: HashMap<String, Vec<String>>,
    postings: HashMap<String, RawPosting>,
    fetched: Vec<String>,
}

impl FakeScraper {
    fn with_term(mut self, term: &str, links: &[&str]) -> Self {
        self.links
            .insert(term.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    fn with_posting(mut self, url: &str, blob: &str, salary: Option<&str>) -> Self {
        self.postings.insert(
            url.to_string(),
            RawPosting {
                title: "Analyst".to_string(),
                employer_location_blob: blob.to_string(),
                salary_text: salary.map(str::to_string),
                description: String::new(),
                url: url.to_string(),
            },
        );
        self
    }
}

impl LinkHarvester for FakeScraper {
    fn harvest(
        &mut self,
        search_term: &str,
        _max_pages: usize,
        _sink: &dyn HarvestSink,
    ) -> HarvestOutcome {
        HarvestOutcome {
            search_term: search_term.to_string(),
            links: self.links.get(search_term).cloned().unwrap_or_default(),
            pages_read: 1,
            skipped_items: 0,
            stop: StopReason::NoMorePages,
        }
    }
}

impl PostingFetcher for FakeScraper {
    fn fetch_posting(&mut self, link: &str) -> Result<RawPosting, FetchError> {
        self.fetched.push(link.to_string());
        self.postings.get(link).cloned().ok_or_else(|| FetchError {
            kind: FailureKind::HttpStatus(404),
            message: format!("no posting at {link}"),
        })
    }
}

#[derive(Default)]
struct RecordingSink {
    events: RefCell<Vec<HarvestEvent>>,
}

impl HarvestSink for RecordingSink {
    fn emit(&self, event: HarvestEvent) {
        self.events.borrow_mut().push(event);
    }
}

fn plan(term: &str) -> TermPlan {
    TermPlan {
        search_term: term.to_string(),
        max_pages: 1,
    }
}

const GOOD_BLOB: &str = "Acme · Toronto, ON · 1 day ago · 12 applicants";

#[test]
fn failures_stay_at_record_granularity() {
    let mut scraper = FakeScraper::default()
        .with_term("analyst", &["u1", "u2", "u3", "u4"])
        .with_posting("u1", GOOD_BLOB, Some("$85K/yr"))
        .with_posting("u2", "Acme · Toronto", None)
        .with_posting("u4", GOOD_BLOB, Some("$40 - $55/hr"));

    let report = run_batch(&mut scraper, &[plan("analyst")], &RecordingSink::default(), |_| {});

    let term = &report.terms[0];
    assert_eq!(scraper.fetched, vec!["u1", "u2", "u3", "u4"]);
    assert_eq!(term.raw_postings.len(), 3);
    assert_eq!(term.fetch_failures.len(), 1);
    assert_eq!(term.fetch_failures[0].0, "u3");
    assert_eq!(term.normalized.postings.len(), 1);
    assert_eq!(term.normalized.postings[0].url, "u1");
    let rejected: Vec<&str> = term
        .normalized
        .rejected
        .iter()
        .map(|r| r.url.as_str())
        .collect();
    assert_eq!(rejected, vec!["u2", "u4"]);
}

#[test]
fn each_term_is_reported_before_the_next_starts() {
    let mut scraper = FakeScraper::default()
        .with_term("analyst", &["u1"])
        .with_term("scientist", &["u1", "u2"])
        .with_posting("u1", GOOD_BLOB, None)
        .with_posting("u2", GOOD_BLOB, Some("$90K/yr"));
    let sink = RecordingSink::default();

    let mut seen = Vec::new();
    let report = run_batch(
        &mut scraper,
        &[plan("scientist"), plan("analyst")],
        &sink,
        |term| seen.push((term.harvest.search_term.clone(), sink.events.borrow().len())),
    );

    assert_eq!(seen, vec![("scientist".to_string(), 3), ("analyst".to_string(), 5)]);

    let dataset = report.dataset();
    let terms: Vec<&String> = dataset.keys().collect();
    assert_eq!(terms, vec!["analyst", "scientist"]);
    assert_eq!(dataset["scientist"].len(), 2);
    assert_eq!(report.raw_dataset()["analyst"].len(), 1);
}

#[test]
fn completion_event_summarizes_the_term() {
    let mut scraper = FakeScraper::default()
        .with_term("analyst", &["u1", "u2"])
        .with_posting("u1", GOOD_BLOB, None);
    let sink = RecordingSink::default();

    run_batch(&mut scraper, &[plan("analyst")], &sink, |_| {});

    let events = sink.events.borrow();
    assert!(matches!(
        &events[1],
        HarvestEvent::PostingFailed { url, error, .. }
            if url == "u2" && error.kind == FailureKind::HttpStatus(404)
    ));
    assert_eq!(
        events.last(),
        Some(&HarvestEvent::TermCompleted {
            search_term: "analyst".to_string(),
            links: 2,
            postings: 1,
            rejected: 0,
        })
    );
}

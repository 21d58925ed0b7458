use posting_core::RawPosting;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::profile::{CompiledProfile, SiteProfile};
use crate::{FailureKind, FetchError, SessionError};

/// Joins the parts of the employer/location line.
const SEGMENT_JOINER: &str = " · ";

/// One entry of a rendered result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    /// Raw `href` of the item's posting link, if it has one.
    pub href: Option<String>,
}

/// A result page reduced to what the harvester needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsPage {
    pub url: Url,
    /// `None` when the page has no result list at all.
    pub items: Option<Vec<ResultItem>>,
    /// Raw `href` of the next-page control.
    pub next_href: Option<String>,
}

pub(crate) fn parse_results_page(html: &str, url: Url, profile: &CompiledProfile) -> ResultsPage {
    let document = Html::parse_document(html);

    let items: Vec<ResultItem> = document
        .select(&profile.result_item)
        .map(|item| ResultItem {
            href: link_href(item, &profile.item_link),
        })
        .collect();
    let next_href = document
        .select(&profile.next_page)
        .find_map(|control| control.value().attr("href").map(str::to_string));

    ResultsPage {
        url,
        items: (!items.is_empty()).then_some(items),
        next_href,
    }
}

fn link_href(item: ElementRef, link: &Selector) -> Option<String> {
    if link.matches(&item) {
        return item.value().attr("href").map(str::to_string);
    }
    item.select(link)
        .find_map(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
}

/// Pulls the raw posting fields out of a posting page.
#[derive(Debug, Clone)]
pub struct PostingExtractor {
    profile: CompiledProfile,
}

impl PostingExtractor {
    pub fn new(profile: &SiteProfile) -> Result<Self, SessionError> {
        Ok(Self {
            profile: profile.compile()?,
        })
    }

    pub(crate) fn from_compiled(profile: CompiledProfile) -> Self {
        Self { profile }
    }

    pub fn extract(&self, html: &str, url: &str) -> Result<RawPosting, FetchError> {
        let document = Html::parse_document(html);

        let title = first_text(&document, &self.profile.title)
            .ok_or_else(|| missing("title"))?;
        let segments: Vec<String> = document
            .select(&self.profile.top_card_segments)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();
        if segments.is_empty() {
            return Err(missing("employer/location line"));
        }

        Ok(RawPosting {
            title,
            employer_location_blob: segments.join(SEGMENT_JOINER),
            salary_text: first_text(&document, &self.profile.salary),
            description: first_text(&document, &self.profile.description).unwrap_or_default(),
            url: url.to_string(),
        })
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn missing(what: &str) -> FetchError {
    FetchError::new(
        FailureKind::MissingElement {
            selector: what.to_string(),
        },
        format!("posting page has no {what}"),
    )
}

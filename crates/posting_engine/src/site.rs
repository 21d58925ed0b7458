use posting_core::{PostingLink, RawPosting};
use scrape_logging::{scrape_debug, scrape_info};
use url::Url;

use crate::credentials::Credentials;
use crate::extract::{parse_results_page, PostingExtractor, ResultItem, ResultsPage};
use crate::fetch::{FetchSettings, PageClient};
use crate::links::{resolve_link, search_url};
use crate::profile::{CompiledProfile, SiteProfile};
use crate::session::{ListingSession, PostingFetcher};
use crate::{FetchError, LookupError, SessionError};

/// A job site whose search results and postings are server-rendered HTML.
pub struct HttpJobSite {
    client: PageClient,
    profile: SiteProfile,
    selectors: CompiledProfile,
    extractor: PostingExtractor,
    current: Option<ResultsPage>,
}

impl HttpJobSite {
    pub fn new(profile: SiteProfile, settings: FetchSettings) -> Result<Self, SessionError> {
        let selectors = profile.compile()?;
        let client = PageClient::new(settings)?;
        Ok(Self {
            client,
            extractor: PostingExtractor::from_compiled(selectors.clone()),
            selectors,
            profile,
            current: None,
        })
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// Url of the result page currently loaded.
    pub fn current_url(&self) -> Option<&Url> {
        self.current.as_ref().map(|page| &page.url)
    }

    fn load(&mut self, url: Url) -> Result<(), FetchError> {
        let page = self.client.get(url.as_str())?;
        let final_url = Url::parse(&page.final_url).unwrap_or(url);
        self.current = Some(parse_results_page(&page.html, final_url, &self.selectors));
        Ok(())
    }
}

impl ListingSession for HttpJobSite {
    type Item = ResultItem;

    fn authenticate(&mut self, credentials: &Credentials) -> Result<(), SessionError> {
        let Some(login) = self.profile.login.clone() else {
            scrape_debug!("site profile has no login form; continuing anonymously");
            return Ok(());
        };
        let fields = [
            (login.username_field.as_str(), credentials.username.as_str()),
            (login.password_field.as_str(), credentials.password.as_str()),
        ];
        self.client
            .post_form(&login.url, &fields)
            .map_err(|err| SessionError::LoginRejected(err.to_string()))?;
        scrape_info!("signed in at {}", login.url);
        Ok(())
    }

    fn open_search(&mut self, search_term: &str) -> Result<(), SessionError> {
        self.current = None;
        let url = search_url(&self.profile.search_url, search_term)
            .ok_or_else(|| SessionError::InvalidSearchUrl(self.profile.search_url.clone()))?;
        self.load(url)?;
        Ok(())
    }

    fn list_items(&mut self) -> Result<Vec<ResultItem>, LookupError> {
        let page = self
            .current
            .as_ref()
            .ok_or_else(|| LookupError::Unavailable("no search is open".to_string()))?;
        page.items
            .clone()
            .ok_or_else(|| LookupError::Missing(self.profile.result_item.clone()))
    }

    fn item_link(&self, item: &ResultItem) -> Result<PostingLink, LookupError> {
        let base = self.current.as_ref().map(|page| &page.url);
        item.href
            .as_deref()
            .and_then(|href| resolve_link(href, base))
            .ok_or_else(|| LookupError::Missing(self.profile.item_link.clone()))
    }

    fn next_page(&mut self) -> Result<(), LookupError> {
        let page = self
            .current
            .as_ref()
            .ok_or_else(|| LookupError::Unavailable("no search is open".to_string()))?;
        let next = page
            .next_href
            .as_deref()
            .and_then(|href| resolve_link(href, Some(&page.url)))
            .ok_or_else(|| LookupError::Missing(self.profile.next_page.clone()))?;
        let next = Url::parse(&next).map_err(|err| LookupError::Unavailable(err.to_string()))?;
        self.load(next)
            .map_err(|err| LookupError::Unavailable(err.to_string()))
    }
}

impl PostingFetcher for HttpJobSite {
    fn fetch_posting(&mut self, link: &str) -> Result<RawPosting, FetchError> {
        let page = self.client.get(link)?;
        self.extractor.extract(&page.html, link)
    }
}

use std::time::Duration;

use posting_core::{PostingLink, RawPosting};

use crate::credentials::Credentials;
use crate::{FetchError, LookupError, SessionError};

/// A rendered search-result view the harvester can page through.
///
/// Every lookup may fail; callers treat failures as absence, never as fatal.
pub trait ListingSession {
    /// One entry of the rendered result list.
    type Item;

    /// Sign in before searching. Sites that need no login keep the default.
    fn authenticate(&mut self, _credentials: &Credentials) -> Result<(), SessionError> {
        Ok(())
    }

    /// Navigate to the first result page for `search_term`.
    fn open_search(&mut self, search_term: &str) -> Result<(), SessionError>;

    /// Items of the currently rendered result list.
    fn list_items(&mut self) -> Result<Vec<Self::Item>, LookupError>;

    /// Posting link carried by a single item.
    fn item_link(&self, item: &Self::Item) -> Result<PostingLink, LookupError>;

    /// Activate the next-page control. `LookupError::Missing` means there is none.
    fn next_page(&mut self) -> Result<(), LookupError>;

    /// Block while the view settles.
    fn settle(&mut self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Retrieves the raw fields of one posting.
pub trait PostingFetcher {
    fn fetch_posting(&mut self, link: &str) -> Result<RawPosting, FetchError>;
}

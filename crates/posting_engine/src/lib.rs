//! Posting engine: harvesting, fetching and persisting job postings.
mod batch;
mod credentials;
mod decode;
mod extract;
mod fetch;
mod harvest;
mod links;
mod persist;
mod profile;
mod session;
mod site;
mod types;

pub use batch::{run_batch, BatchReport, TermPlan};
pub use credentials::{load_credentials, Credentials, CredentialsError};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use extract::{PostingExtractor, ResultItem, ResultsPage};
pub use fetch::{FetchSettings, FetchedPage, PageClient};
pub use harvest::{HarvestSettings, LinkHarvester, PaginatedHarvester};
pub use links::{resolve_link, search_url};
pub use persist::{ensure_output_dir, read_json, AtomicFileWriter, PersistError};
pub use profile::{LoginForm, ProfileError, SiteProfile};
pub use session::{ListingSession, PostingFetcher};
pub use site::HttpJobSite;
pub use types::{
    FailureKind, FetchError, HarvestEvent, HarvestOutcome, HarvestSink, LookupError, NullSink,
    SessionError, StopReason, TermReport,
};

use std::fs;
use std::io;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SessionError;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("could not read site profile: {0}")]
    Io(#[from] io::Error),
    #[error("site profile is not valid RON: {0}")]
    Format(#[from] ron::error::SpannedError),
}

/// Where a job site keeps the things we scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Search page url with a `{keywords}` placeholder.
    pub search_url: String,
    pub login: Option<LoginForm>,
    pub result_item: String,
    pub item_link: String,
    pub next_page: String,
    pub title: String,
    /// Matches every part of the employer/location line; the parts are joined with ` · `.
    pub top_card_segments: String,
    pub salary: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub url: String,
    pub username_field: String,
    pub password_field: String,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            url: "https://www.linkedin.com/uas/login-submit".to_string(),
            username_field: "session_key".to_string(),
            password_field: "session_password".to_string(),
        }
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            search_url: "https://www.linkedin.com/jobs/search/?keywords={keywords}".to_string(),
            login: None,
            result_item: "ul.jobs-search__results-list > li".to_string(),
            item_link: "a.base-card__full-link, a[href*='/jobs/view/']".to_string(),
            next_page: "a[aria-label='Next'], button[aria-label='View next page']".to_string(),
            title: "h1.top-card-layout__title, h1".to_string(),
            top_card_segments: ".topcard__flavor-row > span, .topcard__flavor-row > figure"
                .to_string(),
            salary: ".salary, .compensation__salary".to_string(),
            description: ".show-more-less-html__markup, .description__text".to_string(),
        }
    }
}

impl SiteProfile {
    pub fn from_ron(text: &str) -> Result<Self, ProfileError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        Self::from_ron(&fs::read_to_string(path)?)
    }

    pub(crate) fn compile(&self) -> Result<CompiledProfile, SessionError> {
        Ok(CompiledProfile {
            result_item: compile(&self.result_item)?,
            item_link: compile(&self.item_link)?,
            next_page: compile(&self.next_page)?,
            title: compile(&self.title)?,
            top_card_segments: compile(&self.top_card_segments)?,
            salary: compile(&self.salary)?,
            description: compile(&self.description)?,
        })
    }
}

/// Selectors of a [`SiteProfile`], parsed once.
#[derive(Debug, Clone)]
pub(crate) struct CompiledProfile {
    pub result_item: Selector,
    pub item_link: Selector,
    pub next_page: Selector,
    pub title: Selector,
    pub top_card_segments: Selector,
    pub salary: Selector,
    pub description: Selector,
}

fn compile(selector: &str) -> Result<Selector, SessionError> {
    Selector::parse(selector).map_err(|err| SessionError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

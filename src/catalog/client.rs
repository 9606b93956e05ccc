use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::CatalogSettings;
use crate::error::{Error, Result};
use crate::library::SoundRecord;

use super::parse::ScrapeRules;

/// Source of search results.
pub trait Catalog: Send + Sync {
    /// Run one search. An empty result set is not an error.
    fn search(&self, query: &str) -> Result<Vec<SoundRecord>>;
}

/// Build the blocking HTTP client shared by searches and metadata fetches.
pub fn build_http_client(settings: &CatalogSettings) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
        .build()?)
}

/// Scrapes the provider's HTML search page. One request per call, no retries, no cache.
pub struct HttpCatalog {
    http: Client,
    rules: ScrapeRules,
    base_url: String,
    locale: String,
}

impl HttpCatalog {
    pub fn new(http: Client, settings: &CatalogSettings) -> std::result::Result<Self, String> {
        Ok(Self {
            http,
            rules: ScrapeRules::from_settings(settings)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            locale: settings.locale.trim_matches('/').to_string(),
        })
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/{}/search/?name={}",
            self.base_url,
            self.locale,
            urlencoding::encode(query)
        )
    }
}

impl Catalog for HttpCatalog {
    fn search(&self, query: &str) -> Result<Vec<SoundRecord>> {
        let url = self.search_url(query);
        log::debug!("searching {url}");

        let response = self.http.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("{url} returned {status}")));
        }
        let body = response.text()?;

        let records = self.rules.parse(&body);
        log::info!("search {query:?}: {} results", records.len());
        Ok(records)
    }
}

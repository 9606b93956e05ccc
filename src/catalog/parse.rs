use regex::Regex;
use scraper::{Html, Selector};

use crate::config::CatalogSettings;
use crate::library::SoundRecord;

/// The markup contract of the provider's results page.
///
/// Kept apart from the HTTP client so a markup change only touches this value.
#[derive(Debug, Clone)]
pub struct ScrapeRules {
    button: Selector,
    title_prefix: String,
    handler: Regex,
    base_url: String,
}

impl ScrapeRules {
    pub fn from_settings(settings: &CatalogSettings) -> Result<Self, String> {
        let button = Selector::parse(&settings.button_selector)
            .map_err(|e| format!("invalid button selector {:?}: {e}", settings.button_selector))?;
        let handler = Regex::new(&settings.handler_pattern)
            .map_err(|e| format!("invalid handler pattern: {e}"))?;
        Ok(Self {
            button,
            title_prefix: settings.title_prefix.clone(),
            handler,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Extract one record per well-formed play button. Malformed buttons are skipped.
    pub fn parse(&self, html: &str) -> Vec<SoundRecord> {
        let document = Html::parse_document(html);
        document
            .select(&self.button)
            .filter_map(|button| {
                let el = button.value();
                let name = self.clip_name(el.attr("title")?)?;
                let path = self.resource_path(el.attr("onclick")?)?;
                let filename = filename_of(path)?;
                Some(SoundRecord::remote(name, self.absolute_url(path), filename))
            })
            .collect()
    }

    fn clip_name(&self, title: &str) -> Option<String> {
        let name = title.strip_prefix(&self.title_prefix).unwrap_or(title).trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    /// First quoted argument of the play call in an inline handler.
    fn resource_path<'a>(&self, onclick: &'a str) -> Option<&'a str> {
        self.handler
            .captures(onclick)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .filter(|p| !p.is_empty())
    }

    fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Last path segment, without any query string.
fn filename_of(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.rsplit('/')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

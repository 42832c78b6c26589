//! NewsAPI `everything` search client.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use postpilot_core::config::{IdeasConfig, NewsSettings};
use postpilot_core::error::{extract_api_error_message, truncate_chars};
use postpilot_core::http::{HttpRequest, HttpTransport};
use postpilot_core::{PostPilotError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One article of a search result. Every field may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

/// Parameters of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub query: String,
    pub language: String,
    /// Lower bound of the publication date.
    pub from: NaiveDate,
    pub page_size: u32,
    pub sort_by: String,
}

impl NewsQuery {
    /// Builds the query for the window of `config.window_days` days ending at `today`.
    pub fn from_config(config: &IdeasConfig, today: NaiveDate) -> Self {
        let from = today
            .checked_sub_days(Days::new(u64::from(config.window_days)))
            .unwrap_or(today);
        Self {
            query: config.query.clone(),
            language: config.language.clone(),
            from,
            page_size: config.page_size,
            sort_by: config.sort_by.clone(),
        }
    }
}

#[derive(Clone)]
pub struct NewsApiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        settings: &NewsSettings,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            base_url: settings.base_url.clone(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, query: &NewsQuery) -> Result<Url> {
        let from = query.from.format("%Y-%m-%d").to_string();
        let page_size = query.page_size.to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("q", query.query.as_str()),
                ("language", query.language.as_str()),
                ("from", from.as_str()),
                ("pageSize", page_size.as_str()),
                ("sortBy", query.sort_by.as_str()),
                ("apiKey", self.api_key.as_str()),
            ],
        )
        .map_err(|err| PostPilotError::config(format!("invalid news base URL: {err}")))
    }

    /// Runs the search and returns the articles, possibly none.
    pub async fn search(&self, query: &NewsQuery) -> Result<Vec<Article>> {
        let request = HttpRequest::get(self.endpoint(query)?);
        debug!(q = %query.query, from = %query.from, page_size = query.page_size, "searching news");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let message = extract_api_error_message(&response.text());
            return Err(PostPilotError::http(
                response.status,
                format!("News API HTTP Error: {} - {}", response.status, message),
            ));
        }

        let parsed: SearchResponse = response.json()?;
        debug!(count = parsed.articles.len(), "news search returned");
        Ok(parsed.articles)
    }
}

/// Summarises an article as one prompt line, cutting the description to
/// `description_budget` characters.
pub fn compact_article(article: &Article, description_budget: usize) -> String {
    let title = article.title.as_deref().unwrap_or("Untitled").trim();
    let url = article.url.as_deref().unwrap_or_default().trim();
    let description = article
        .description
        .as_deref()
        .or(article.content.as_deref())
        .unwrap_or_default()
        .trim();
    let description = truncate_chars(description, description_budget);
    format!("- {title} ({url}): {description}")
}

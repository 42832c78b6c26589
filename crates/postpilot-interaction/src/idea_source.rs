//! IdeaSource - turns recent news into a batch of post ideas.
//!
//! Two modes are supported (see [`IdeaSourceMode`]):
//! - `NewsDigest` searches NewsAPI first and hands compacted articles to the
//!   model.
//! - `SearchGrounded` makes a single Gemini call and lets the model search
//!   through the `google_search` tool.
//!
//! Either way the model answer is free text from which a JSON array of
//! exactly [`IDEA_BATCH_SIZE`] ideas is recovered.

use postpilot_core::config::{IdeaSourceMode, IdeasConfig};
use postpilot_core::deadline::run_with_deadline;
use postpilot_core::idea::validate_idea_batch;
use postpilot_core::json_extract::extract_json_from_text;
use postpilot_core::{CancellationToken, IDEA_BATCH_SIZE, Idea, PostPilotError, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::gemini_client::{GeminiClient, GenerateContentRequest};
use crate::news_client::{Article, NewsApiClient, NewsQuery, compact_article};

const IDEA_GENERATION: &str = "Idea Generation";
const NEWS_SEARCH: &str = "News Search";

/// Where the model gets its news context from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdeaContext<'a> {
    /// The model runs the search itself.
    SearchTool,
    /// Pre-fetched articles, one compacted line each.
    Articles(&'a [String]),
}

#[derive(Clone)]
pub struct IdeaSource {
    gemini: GeminiClient,
    news: Option<NewsApiClient>,
    config: IdeasConfig,
}

impl IdeaSource {
    /// `news` is only required for [`IdeaSourceMode::NewsDigest`].
    pub fn new(gemini: GeminiClient, news: Option<NewsApiClient>, config: IdeasConfig) -> Self {
        Self {
            gemini,
            news,
            config,
        }
    }

    pub fn mode(&self) -> IdeaSourceMode {
        self.config.mode
    }

    /// Fetches one batch of exactly [`IDEA_BATCH_SIZE`] ideas.
    pub async fn fetch_ideas(&self, cancel: &CancellationToken) -> Result<Vec<Idea>> {
        self.fetch_ideas_on(chrono::Utc::now().date_naive(), cancel)
            .await
    }

    /// Same as [`fetch_ideas`](Self::fetch_ideas) with an explicit "today"
    /// for the news window.
    pub async fn fetch_ideas_on(
        &self,
        today: chrono::NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<Idea>> {
        info!(mode = %self.config.mode, "fetching post ideas");

        let request = match self.config.mode {
            IdeaSourceMode::SearchGrounded => {
                build_idea_prompt(&self.config, IdeaContext::SearchTool)
            }
            IdeaSourceMode::NewsDigest => {
                let articles = self.search_news(today, cancel).await?;
                let lines: Vec<String> = articles
                    .iter()
                    .map(|article| compact_article(article, self.config.description_budget))
                    .collect();
                build_idea_prompt(&self.config, IdeaContext::Articles(&lines))
            }
        };

        let text = run_with_deadline(
            IDEA_GENERATION,
            self.config.timeout(),
            cancel,
            self.gemini.generate(&request),
        )
        .await?;

        let ideas = parse_ideas(&text)?;
        info!(count = ideas.len(), "ideas generated");
        Ok(ideas)
    }

    async fn search_news(
        &self,
        today: chrono::NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<Article>> {
        let news = self
            .news
            .as_ref()
            .ok_or_else(|| PostPilotError::config("news.api_key is not configured"))?;
        let query = NewsQuery::from_config(&self.config, today);

        let articles = run_with_deadline(
            NEWS_SEARCH,
            self.config.search_timeout(),
            cancel,
            news.search(&query),
        )
        .await?;

        if articles.is_empty() {
            return Err(PostPilotError::NoArticlesFound);
        }
        debug!(count = articles.len(), "articles found");
        Ok(articles)
    }
}

/// Builds the generation request for one idea batch.
pub fn build_idea_prompt(config: &IdeasConfig, context: IdeaContext<'_>) -> GenerateContentRequest {
    let days = config.window_days;
    let source = match context {
        IdeaContext::SearchTool => format!(
            "find recent, relevant news articles (published in the last {days} days) on technology, AI, or innovation, and then \
             generate {IDEA_BATCH_SIZE} LinkedIn post ideas based ONLY on the search results you find."
        ),
        IdeaContext::Articles(_) => format!(
            "generate {IDEA_BATCH_SIZE} LinkedIn post ideas based ONLY on the recent news articles provided by the user."
        ),
    };
    let system_instruction = format!(
        "You are a creative LinkedIn content strategist specialized in technology, AI, and innovation. \
         Your goal is to {source} \
         Your SOLE output must be a valid JSON array of EXACTLY {IDEA_BATCH_SIZE} objects. \
         DO NOT add any conversational prose, preambles, or explanations outside the JSON block."
    );

    let step_one = match context {
        IdeaContext::SearchTool => format!(
            "First, use the search tool to find recent (last {days} days) news articles on '{}' in {}.\n",
            config.query,
            language_name(&config.language)
        ),
        IdeaContext::Articles(lines) => format!(
            "First, read these recent (last {days} days) news articles:\n{}\n\n",
            lines.join("\n")
        ),
    };
    let user_request = format!(
        "{step_one}\
         Second, based on the content of these articles, produce EXACTLY {IDEA_BATCH_SIZE} unique LinkedIn post *ideas* suitable for technology professionals. \
         Each array item must be an object with the keys:\n\
         \x20 - \"title\": a short catchy headline (<= 10 words),\n\
         \x20 - \"description\": 2 short sentences (good for a LinkedIn post body),\n\
         \x20 - \"detailed_description\": a paragraph (3-4 sentences) providing a detailed, professional description of the topic.\n\
         \x20 - \"hashtags\": an array of 2-4 relevant hashtags (strings).\n\n\
         If you cannot produce {IDEA_BATCH_SIZE} distinct ideas from the search context, return {{\"error\":\"INSUFFICIENT_CONTEXT\"}} as JSON.\n\n\
         Now return the JSON array of {IDEA_BATCH_SIZE} items only."
    );

    let request =
        GenerateContentRequest::user_prompt(user_request).with_system_instruction(system_instruction);
    match context {
        IdeaContext::SearchTool => request.with_google_search(),
        IdeaContext::Articles(_) => request,
    }
}

fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "de" => "German",
        "es" => "Spanish",
        "fr" => "French",
        "it" => "Italian",
        "pt" => "Portuguese",
        other => other,
    }
}

/// Recovers the idea batch from the model's free-form answer.
///
/// An object carrying an `error` field is the model saying it lacked
/// context; it becomes [`PostPilotError::InsufficientContext`].
pub fn parse_ideas(text: &str) -> Result<Vec<Idea>> {
    let value = extract_json_from_text(text)?;

    if let Some(reason) = value.get("error") {
        let reason = match reason {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(PostPilotError::InsufficientContext(reason));
    }

    if !value.is_array() {
        return Err(PostPilotError::malformed(
            "Expected a JSON array of ideas in model output.",
        ));
    }

    let ideas: Vec<Idea> = serde_json::from_value(value)
        .map_err(|err| PostPilotError::malformed(format!("Idea objects did not match: {err}")))?;
    validate_idea_batch(ideas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ideas_json(count: usize) -> Value {
        Value::Array(
            (0..count)
                .map(|n| {
                    json!({
                        "title": format!("Idea {n}"),
                        "description": "One. Two.",
                        "detailed_description": "A paragraph about it.",
                        "hashtags": ["#AI", "#Edge"]
                    })
                })
                .collect(),
        )
    }

    #[test]
    fn test_search_grounded_prompt_enables_search_tool() {
        let request = build_idea_prompt(&IdeasConfig::default(), IdeaContext::SearchTool);
        assert_eq!(request.tools.len(), 1);
        let user = &request.contents[0].parts[0].text;
        assert!(user.contains("'AI OR technology OR innovation' in English"));
        assert!(user.contains("INSUFFICIENT_CONTEXT"));
        assert!(
            request.system_instruction.as_ref().unwrap().parts[0]
                .text
                .contains("EXACTLY 10 objects")
        );
    }

    #[test]
    fn test_digest_prompt_embeds_articles_without_tool() {
        let lines = vec!["- A (https://a): first".to_string(), "- B (https://b): second".to_string()];
        let request = build_idea_prompt(&IdeasConfig::default(), IdeaContext::Articles(&lines));
        assert!(request.tools.is_empty());
        let user = &request.contents[0].parts[0].text;
        assert!(user.contains("- A (https://a): first\n- B (https://b): second"));
    }

    #[test]
    fn test_parse_ideas_accepts_fenced_batch() {
        let text = format!("Here you go:\n```json\n{}\n```", ideas_json(10));
        let ideas = parse_ideas(&text).unwrap();
        assert_eq!(ideas.len(), 10);
        assert_eq!(ideas[3].title, "Idea 3");
    }

    #[test]
    fn test_parse_ideas_reports_insufficient_context() {
        let err = parse_ideas(r#"{"error":"INSUFFICIENT_CONTEXT"}"#).unwrap_err();
        assert_eq!(
            err,
            PostPilotError::InsufficientContext("INSUFFICIENT_CONTEXT".into())
        );
    }

    #[test]
    fn test_parse_ideas_rejects_wrong_count() {
        let err = parse_ideas(&ideas_json(7).to_string()).unwrap_err();
        assert!(matches!(err, PostPilotError::MalformedModelOutput(_)));
    }

    #[test]
    fn test_parse_ideas_rejects_missing_field() {
        let mut batch = ideas_json(10);
        batch[2].as_object_mut().unwrap().remove("hashtags");
        let err = parse_ideas(&batch.to_string()).unwrap_err();
        assert!(matches!(err, PostPilotError::MalformedModelOutput(_)));
    }
}

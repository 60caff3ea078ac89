//! Help-center crawler.
//!
//! Fetches the configured index page, classifies anchors and article containers into
//! [`Article`] candidates, de-duplicates them by URL and, optionally, walks every
//! article page sequentially to collect its visible text.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::types::{truncate_chars, Article};
use crate::config::DocsConfig;

const TRUNCATION_MARKER: &str = " ... [content truncated]";
const DESCRIPTION_BACKFILL_CHARS: usize = 300;

static ANCHORS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static ARTICLE_TAGS: LazyLock<Selector> = LazyLock::new(|| selector("article"));
static ARTICLE_DIVS: LazyLock<Selector> = LazyLock::new(|| selector("div[class*='article']"));
static HELP_DIVS: LazyLock<Selector> = LazyLock::new(|| selector("div[class*='help']"));
static CONTAINER_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h2, h3, a"));
static CONTAINER_DESC: LazyLock<Selector> =
    LazyLock::new(|| selector("p, div[class*='description']"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Anything that can produce the current article set.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(&self) -> Result<Vec<Article>, CrawlError>;
}

pub struct HelpCenterCrawler {
    client: Client,
    base_url: Url,
    fetch_full_content: bool,
    request_delay: Duration,
    max_content_chars: usize,
}

impl HelpCenterCrawler {
    pub fn new(config: &DocsConfig) -> Result<Self, CrawlError> {
        let base_url = Url::parse(&config.base_url).map_err(|source| CrawlError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url,
            fetch_full_content: config.fetch_full_content,
            request_delay: Duration::from_millis(config.request_delay_ms),
            max_content_chars: config.max_content_chars,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn fetch_page(&self, url: &str) -> Result<String, CrawlError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }

    /// Fetch each article page in turn, pausing `request_delay` between requests.
    /// Individual failures leave the article without content.
    async fn fetch_contents(&self, articles: &mut [Article]) {
        let total = articles.len();
        let mut fetched = 0usize;

        for (i, article) in articles.iter_mut().enumerate() {
            if i > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
            match self.fetch_page(&article.url).await {
                Ok(html) => {
                    apply_page_content(article, &html, self.max_content_chars);
                    fetched += 1;
                    debug!(url = %article.url, progress = i + 1, total, "fetched article content");
                }
                Err(e) => {
                    warn!(url = %article.url, error = %e, "failed to fetch article content");
                }
            }
        }

        info!(fetched, total, "article content fetch complete");
    }
}

#[async_trait]
impl ArticleSource for HelpCenterCrawler {
    async fn fetch_articles(&self) -> Result<Vec<Article>, CrawlError> {
        let html = self.fetch_page(self.base_url.as_str()).await?;
        let mut articles = extract_index_articles(&html, &self.base_url);
        info!(count = articles.len(), base_url = %self.base_url, "discovered articles on index page");

        if self.fetch_full_content && !articles.is_empty() {
            self.fetch_contents(&mut articles).await;
        }

        Ok(articles)
    }
}

/// True for hrefs that look like help articles: `/help-articles/` or `/help/` anywhere,
/// or a root-relative path that is neither a script nor a fragment link.
pub fn is_help_article_link(href: &str) -> bool {
    if href.trim().is_empty() {
        return false;
    }
    href.contains("/help-articles/")
        || href.contains("/help/")
        || (href.starts_with('/') && !href.contains("javascript:") && !href.contains('#'))
}

/// Parse the index page into a de-duplicated article list.
pub fn extract_index_articles(html: &str, base: &Url) -> Vec<Article> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    // Bootstrap pass: every qualifying link, link text doubling as description.
    for link in document.select(&ANCHORS) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let title = element_text(&link);
        if title.is_empty() || !is_help_article_link(href) {
            continue;
        }
        if let Some(url) = resolve_url(base, href) {
            candidates.push(Article::new(title.clone(), url, title));
        }
    }

    // Structural pass: richer (title, link, description) triples from article containers.
    for container in article_containers(&document) {
        let Some(title_node) = container.select(&CONTAINER_TITLE).next() else {
            continue;
        };
        let Some(href) = container
            .select(&ANCHORS)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };
        let title = element_text(&title_node);
        if title.is_empty() || !is_help_article_link(href) {
            continue;
        }
        let description = container
            .select(&CONTAINER_DESC)
            .next()
            .map(|d| element_text(&d))
            .unwrap_or_default();
        if let Some(url) = resolve_url(base, href) {
            candidates.push(Article::new(title, url, description));
        }
    }

    dedupe_articles(candidates)
}

fn article_containers(document: &Html) -> Vec<ElementRef<'_>> {
    for sel in [&*ARTICLE_TAGS, &*ARTICLE_DIVS, &*HELP_DIVS] {
        let found: Vec<_> = document.select(sel).collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

/// Collapse duplicates by URL, keeping first-seen order. The first entry wins unless it
/// only carries its link text and a later duplicate has a real description, in which
/// case the richer entry takes its place.
pub fn dedupe_articles(articles: Vec<Article>) -> Vec<Article> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<Article> = Vec::with_capacity(articles.len());

    for article in articles {
        match positions.get(&article.url) {
            Some(&idx) => {
                let existing = &mut unique[idx];
                if existing.has_bootstrap_description() && !article.has_bootstrap_description() {
                    let content = existing.full_content.take();
                    *existing = article;
                    if existing.content().is_none() {
                        existing.full_content = content;
                    }
                } else if existing.content().is_none() && article.content().is_some() {
                    existing.full_content = article.full_content;
                }
            }
            None => {
                positions.insert(article.url.clone(), unique.len());
                unique.push(article);
            }
        }
    }

    unique
}

/// Attach visible page text to `article` and backfill a thin description from it.
pub fn apply_page_content(article: &mut Article, html: &str, max_chars: usize) {
    let text = extract_page_text(html, max_chars);
    if text.is_empty() {
        return;
    }

    if article.has_bootstrap_description() {
        let lead = truncate_chars(&text, DESCRIPTION_BACKFILL_CHARS);
        article.description = if lead.len() < text.len() {
            format!("{}...", lead.trim_end())
        } else {
            lead.to_string()
        };
    }
    article.full_content = Some(text);
}

/// Visible text of a page with script and style content removed, whitespace
/// collapsed, capped at `max_chars` characters plus a truncation marker.
pub fn extract_page_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor.value().as_element().is_some_and(|el| {
                matches!(el.name(), "script" | "style" | "noscript" | "template")
            })
        });
        if !hidden {
            raw.push_str(text);
            raw.push(' ');
        }
    }

    let text = clean_text(&raw);
    let capped = truncate_chars(&text, max_chars);
    if capped.len() < text.len() {
        format!("{capped}{TRUNCATION_MARKER}")
    } else {
        text
    }
}

fn element_text(el: &ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let mut url = base.join(href.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://help.example.com/help-articles/").unwrap()
    }

    #[test]
    fn link_classification() {
        assert!(is_help_article_link("https://x.com/help-articles/invoices"));
        assert!(is_help_article_link("https://x.com/help/payroll"));
        assert!(is_help_article_link("/schedules"));
        assert!(!is_help_article_link("/schedules#top"));
        assert!(!is_help_article_link("/javascript:void(0)"));
        assert!(!is_help_article_link("https://twitter.com/example"));
        assert!(!is_help_article_link("mailto:support@example.com"));
        assert!(!is_help_article_link("   "));
    }

    #[test]
    fn anchors_become_bootstrap_articles() {
        let html = r#"<html><body>
            <a href="/help-articles/invoices">  Creating
               Invoices </a>
            <a href="https://other.com/about">About</a>
            <a href="/help-articles/empty">   </a>
        </body></html>"#;
        let articles = extract_index_articles(html, &base());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Creating Invoices");
        assert_eq!(articles[0].description, "Creating Invoices");
        assert_eq!(articles[0].url, "https://help.example.com/help-articles/invoices");
    }

    #[test]
    fn containers_enrich_descriptions() {
        let html = r#"<html><body>
            <a href="/help-articles/invoices">Invoices</a>
            <article>
              <h3>Invoices</h3>
              <a href="/help-articles/invoices">Read more</a>
              <p>Create, send and track client invoices.</p>
            </article>
            <article>
              <h2>Daily Logs</h2>
              <a href="/help-articles/daily-logs">Open</a>
              <p>Record what happened on site.</p>
            </article>
        </body></html>"#;
        let articles = extract_index_articles(html, &base());
        let urls: Vec<&str> = articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://help.example.com/help-articles/invoices",
                "https://help.example.com/help-articles/daily-logs",
            ]
        );
        assert_eq!(articles[0].title, "Invoices");
        assert_eq!(articles[0].description, "Create, send and track client invoices.");
        assert_eq!(articles[1].title, "Daily Logs");
    }

    #[test]
    fn class_containers_used_when_no_article_tags() {
        let html = r#"<html><body>
            <div class="help-card">
              <h3>Payroll Setup</h3>
              <a href="/help/payroll">Go</a>
              <div class="description">Configure pay periods.</div>
            </div>
        </body></html>"#;
        let articles = extract_index_articles(html, &base());
        let payroll = articles
            .iter()
            .find(|a| a.url.ends_with("/help/payroll"))
            .expect("payroll article");
        assert_eq!(payroll.description, "Configure pay periods.");
    }

    #[test]
    fn duplicates_collapse_to_one_per_url() {
        let html = r#"<html><body>
            <a href="/help-articles/invoices">Invoices</a>
            <a href="/help-articles/invoices">Invoice guide</a>
            <a href="/help-articles/invoices#section-2">Invoices, part two</a>
            <a href="https://help.example.com/help-articles/invoices">Invoices again</a>
        </body></html>"#;
        let articles = extract_index_articles(html, &base());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Invoices");
    }

    #[test]
    fn dedupe_prefers_richer_description() {
        let articles = vec![
            Article::new("Invoices", "https://x/a", "Invoices"),
            Article::new("Invoice guide", "https://x/a", "How to bill clients"),
            Article::new("Other", "https://x/b", ""),
        ];
        let unique = dedupe_articles(articles);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "Invoice guide");
        assert_eq!(unique[0].description, "How to bill clients");
        assert_eq!(unique[1].url, "https://x/b");
    }

    #[test]
    fn page_text_strips_scripts_and_styles() {
        let html = r#"<html><head><style>.a { color: red }</style></head><body>
            <script>var tracking = 1;</script>
            <h1>Invoices</h1>
            <p>Send   invoices
               to clients.</p>
            <noscript>Enable JS</noscript>
        </body></html>"#;
        let text = extract_page_text(html, 10_000);
        assert_eq!(text, "Invoices Send invoices to clients.");
    }

    #[test]
    fn page_text_is_capped_with_marker() {
        let body = "word ".repeat(100);
        let html = format!("<html><body><p>{body}</p></body></html>");
        let text = extract_page_text(&html, 20);
        assert!(text.starts_with("word word word word "));
        assert!(text.ends_with(TRUNCATION_MARKER));
        assert_eq!(text.chars().count(), 20 + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn page_content_backfills_thin_description() {
        let mut article = Article::new("Invoices", "https://x/a", "Invoices");
        let long = "Invoices let you bill clients. ".repeat(20);
        apply_page_content(&mut article, &format!("<body>{long}</body>"), 10_000);
        assert!(article.full_content.is_some());
        assert!(article.description.ends_with("..."));
        assert!(article.description.chars().count() <= DESCRIPTION_BACKFILL_CHARS + 3);

        let mut rich = Article::new("Invoices", "https://x/a", "Hand-written summary");
        apply_page_content(&mut rich, "<body>Body text</body>", 10_000);
        assert_eq!(rich.description, "Hand-written summary");
        assert_eq!(rich.full_content.as_deref(), Some("Body text"));
    }

    #[test]
    fn crawler_rejects_bad_base_url() {
        let config = DocsConfig {
            base_url: "not a url".into(),
            ..DocsConfig::default()
        };
        assert!(matches!(
            HelpCenterCrawler::new(&config),
            Err(CrawlError::InvalidBaseUrl { .. })
        ));
    }
}

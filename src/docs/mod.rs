//! Help-center documentation: article types, crawling and the search service.

pub mod crawler;
pub mod service;
pub mod types;

pub use crawler::{ArticleSource, CrawlError, HelpCenterCrawler};
pub use service::{DocumentationService, SearchOutcome};
pub use types::{Article, SearchMethod, SearchResult};

//! Keyword ranking over article titles and descriptions.
//!
//! Scores are additive: +3 per query term found in the title, +1 per term found in
//! the description, and +5 once when the whole query appears in the title. No
//! stemming or term weighting.

use crate::docs::types::{truncate_chars, Article, SearchResult};

const TITLE_TERM_WEIGHT: f64 = 3.0;
const DESCRIPTION_TERM_WEIGHT: f64 = 1.0;
const TITLE_PHRASE_BONUS: f64 = 5.0;

/// Characters kept before a description hit when cutting a snippet.
const SNIPPET_LEAD: usize = 50;
const SNIPPET_LEN: usize = 150;

struct KeywordMatch {
    score: f64,
    snippet: Option<String>,
}

/// Rank `articles` against `query`; only positive scores, best first, ties in input order.
pub fn rank_by_keyword(articles: &[Article], query: &str) -> Vec<SearchResult> {
    let terms = query_terms(query);
    let phrase = query.trim().to_lowercase();

    let mut results: Vec<SearchResult> = articles
        .iter()
        .filter_map(|article| {
            let m = match_article(article, &terms, &phrase);
            (m.score > 0.0).then(|| SearchResult {
                title: article.title.clone(),
                url: article.url.clone(),
                score: m.score,
                snippet: m
                    .snippet
                    .unwrap_or_else(|| truncate_chars(&article.description, SNIPPET_LEN).to_string()),
                full_content: article.full_content.clone(),
            })
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results
}

/// Keyword score of a single article, used as a secondary signal elsewhere.
pub fn keyword_score(article: &Article, query: &str) -> f64 {
    let terms = query_terms(query);
    let phrase = query.trim().to_lowercase();
    match_article(article, &terms, &phrase).score
}

fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn match_article(article: &Article, terms: &[String], phrase: &str) -> KeywordMatch {
    let title = article.title.to_lowercase();
    let description = article.description.to_lowercase();
    let mut score = 0.0;
    let mut snippet = None;

    for term in terms {
        if title.contains(term.as_str()) {
            score += TITLE_TERM_WEIGHT;
        }
        if let Some(pos) = description.find(term.as_str()) {
            score += DESCRIPTION_TERM_WEIGHT;
            if snippet.is_none() {
                let char_pos = description[..pos].chars().count();
                snippet = Some(snippet_around(&article.description, char_pos));
            }
        }
    }

    if !phrase.is_empty() && title.contains(phrase) {
        score += TITLE_PHRASE_BONUS;
    }

    KeywordMatch { score, snippet }
}

/// Window of `SNIPPET_LEN` chars starting `SNIPPET_LEAD` chars before `char_pos`,
/// with ellipses marking cut ends.
fn snippet_around(text: &str, char_pos: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = char_pos.saturating_sub(SNIPPET_LEAD).min(chars.len());
    let end = (start + SNIPPET_LEN).min(chars.len());

    let window: String = chars[start..end].iter().collect();
    let mut snippet = window.trim().to_string();
    if start > 0 {
        snippet.insert_str(0, "...");
    }
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Article> {
        vec![
            Article::new("Invoices 101", "https://x/help/invoices", "Create and send invoices"),
            Article::new("Payroll Setup", "https://x/help/payroll", "Configure pay periods"),
        ]
    }

    #[test]
    fn title_match_ranks_first() {
        let results = rank_by_keyword(&corpus(), "invoice");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Invoices 101");
        // title term (3) + description term (1) + whole-query-in-title bonus (5)
        assert_eq!(results[0].score, 9.0);
    }

    #[test]
    fn zero_scores_are_dropped() {
        let results = rank_by_keyword(&corpus(), "warranty claims");
        assert!(results.is_empty());
    }

    #[test]
    fn phrase_bonus_applies_once() {
        let articles = vec![Article::new("Change Orders", "u", "")];
        let results = rank_by_keyword(&articles, "change orders");
        // two title terms + one phrase bonus
        assert_eq!(results[0].score, 3.0 + 3.0 + 5.0);
    }

    #[test]
    fn results_sorted_by_descending_score() {
        let articles = vec![
            Article::new("Overview", "a", "mentions schedule once"),
            Article::new("Schedule basics", "b", "schedule your crew"),
            Article::new("Unrelated", "c", "nothing here"),
        ];
        let results = rank_by_keyword(&articles, "schedule");
        let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "a"]);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn ties_keep_input_order() {
        let articles = vec![
            Article::new("Invoices A", "a", ""),
            Article::new("Invoices B", "b", ""),
        ];
        let results = rank_by_keyword(&articles, "invoices");
        assert_eq!(results[0].url, "a");
        assert_eq!(results[1].url, "b");
    }

    #[test]
    fn snippet_is_windowed_around_first_hit() {
        let description = format!("{}invoice{}", "a".repeat(100), "b".repeat(300));
        let articles = vec![Article::new("Billing", "u", description)];
        let results = rank_by_keyword(&articles, "invoice");
        let snippet = &results[0].snippet;
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), SNIPPET_LEN + 6);
        assert!(snippet.contains("invoice"));
    }

    #[test]
    fn snippet_falls_back_to_description_prefix() {
        let description = "d".repeat(400);
        let articles = vec![Article::new("Invoices", "u", description)];
        let results = rank_by_keyword(&articles, "invoices");
        assert_eq!(results[0].snippet.chars().count(), SNIPPET_LEN);
    }

    #[test]
    fn short_description_snippet_has_no_ellipses() {
        let articles = vec![Article::new("Billing", "u", "Send an invoice today")];
        let results = rank_by_keyword(&articles, "invoice");
        assert_eq!(results[0].snippet, "Send an invoice today");
    }

    #[test]
    fn keyword_score_matches_ranker() {
        let articles = corpus();
        assert_eq!(keyword_score(&articles[0], "invoice"), 9.0);
        assert_eq!(keyword_score(&articles[1], "invoice"), 0.0);
    }

    #[test]
    fn non_ascii_descriptions_do_not_panic() {
        let articles = vec![Article::new("Café invoices", "u", "Über café, facturé invoice")];
        let results = rank_by_keyword(&articles, "invoice");
        assert!(results[0].snippet.contains("invoice"));
    }
}

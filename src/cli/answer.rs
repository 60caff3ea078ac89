//! CLI `answer` command: search, then have the chat model answer from the top articles.

use anyhow::{Context, Result};

use crate::server::setup_shared_state;
use docent::config::DocentConfig;
use docent::docs::SearchResult;

/// Per-article cap on content placed in the answer prompt.
const MAX_ARTICLE_CHARS: usize = 15_000;

pub async fn answer(config: &DocentConfig, query: &str) -> Result<()> {
    let query = query.trim();
    anyhow::ensure!(!query.is_empty(), "query must not be empty");

    let state = setup_shared_state(config)?;
    let llm = state
        .llm
        .context("`answer` needs an LLM; set [llm] provider in config.toml")?;

    let outcome = state.docs.search(query, config.retrieval.semantic).await;
    print!("{}", outcome.format(query));
    if outcome.results.is_empty() {
        return Ok(());
    }

    let pb = super::spinner("Generating answer...");
    let reply = llm.ask(&answer_prompt(query, &outcome.results), None).await;
    pb.finish_and_clear();

    let reply = reply.context("LLM request failed")?;
    println!("Answer:\n\n{}", reply.trim());
    Ok(())
}

/// Prompt asking the model to synthesize an answer from `results`. Full content is
/// preferred, capped per article; the snippet stands in when there is none.
pub fn answer_prompt(query: &str, results: &[SearchResult]) -> String {
    let mut prompt = format!(
        "Based on the following help-center articles, please provide a helpful, conversational answer to the user's question: \"{query}\"\n\n\
         Here are the most relevant articles with their full content:\n\n"
    );

    for (i, result) in results.iter().enumerate() {
        prompt.push_str(&format!("=== Article {}: {} ===\n", i + 1, result.title));
        prompt.push_str(&format!("URL: {}\n\n", result.url));
        match result.full_content.as_deref().filter(|c| !c.is_empty()) {
            Some(content) => {
                let capped = docent::docs::types::truncate_chars(content, MAX_ARTICLE_CHARS);
                prompt.push_str(capped);
                if capped.len() < content.len() {
                    prompt.push_str("... [content truncated]");
                }
                prompt.push('\n');
            }
            None if !result.snippet.is_empty() => {
                prompt.push_str(&result.snippet);
                prompt.push('\n');
            }
            None => {}
        }
        prompt.push_str("\n---\n\n");
    }

    prompt.push_str(
        "Please provide a clear, practical answer that synthesizes the information from these articles. \
         If the articles don't fully answer the question, mention what information is available and \
         suggest what the user might want to explore further.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, snippet: &str, content: Option<String>) -> SearchResult {
        SearchResult {
            title: title.into(),
            url: format!("https://x/help/{title}"),
            score: 1.0,
            snippet: snippet.into(),
            full_content: content,
        }
    }

    #[test]
    fn prompt_prefers_full_content_and_caps_it() {
        let results = vec![
            result("invoices", "short", Some("c".repeat(20_000))),
            result("payroll", "Configure pay periods", None),
        ];
        let prompt = answer_prompt("how do I bill?", &results);

        assert!(prompt.contains("question: \"how do I bill?\""));
        assert!(prompt.contains("=== Article 1: invoices ===\nURL: https://x/help/invoices\n"));
        let capped = "c".repeat(MAX_ARTICLE_CHARS);
        assert!(prompt.contains(&format!("{capped}... [content truncated]")));
        assert!(!prompt.contains(&"c".repeat(MAX_ARTICLE_CHARS + 1)));
        assert!(prompt.contains(
            "=== Article 2: payroll ===\nURL: https://x/help/payroll\n\nConfigure pay periods\n"
        ));
        assert!(prompt.ends_with("explore further."));
    }

    #[test]
    fn short_content_is_not_marked_truncated() {
        let results = vec![result("invoices", "", Some("Create an invoice.".into()))];
        let prompt = answer_prompt("invoice", &results);
        assert!(prompt.contains("Create an invoice.\n"));
        assert!(!prompt.contains("[content truncated]"));
    }
}

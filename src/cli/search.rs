use anyhow::Result;

use deepmem::config::DeepMemConfig;
use deepmem::memory::search::{search_with_fallback, SearchOutcome};

/// Run a progressive memory search from the terminal.
pub async fn search(config: &DeepMemConfig, query: &str, user_id: Option<&str>) -> Result<()> {
    let store = config.memory_client()?;
    let policy = config.search_policy()?;
    let scope = config.scope_for(user_id);

    let outcome = search_with_fallback(&store, query, &scope, &policy).await?;

    match &outcome {
        SearchOutcome::Matched { threshold, result } => println!(
            "Found {} result(s) at threshold {threshold:.2}\n",
            result.len()
        ),
        SearchOutcome::Fallback { result } if result.is_empty() => {
            println!("No results found.");
            return Ok(());
        }
        SearchOutcome::Fallback { result } => println!(
            "No semantic match; {} result(s) from text matching\n",
            result.len()
        ),
    }

    for (i, record) in outcome.result().records.iter().enumerate() {
        println!("  {}. {} (score: {:.4})", i + 1, record.id, record.score);
        println!("     {}", preview(&record.text, 120));
        println!();
    }

    Ok(())
}

/// First `max_chars` characters, with "..." when truncated.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

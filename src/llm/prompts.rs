//! Prompt construction for planning, observation, and synthesis.

use std::fmt::Write as _;

use crate::memory::search::SearchOutcome;
use crate::research::{ResearchContext, ResearchReport};

pub const PLANNER_SYSTEM: &str = "You are a research planner working over a personal memory store. \
Given a research query and the findings so far, decide which memory searches to run next. \
Respond only with a JSON object: \
{\"research_question\": string, \"search_queries\": [string, ...]}. \
Use short, specific search queries. Return an empty list if nothing is left to search.";

pub const OBSERVER_SYSTEM: &str = "You analyze memory search results for a research task. \
Summarize what the results reveal about the query and decide whether more searching would help. \
Respond only with a JSON object: \
{\"insights\": string, \"continue_research\": boolean}.";

pub const SYNTHESIS_SYSTEM: &str = "You write concise, well-grounded answers. \
Answer the research query using only the findings provided. \
If the findings are insufficient, say what is missing.";

pub fn planner_prompt(query: &str, context: &ResearchContext) -> String {
    format!(
        "Research query: {query}\n\nFindings so far:\n{}",
        context.render()
    )
}

pub fn observer_prompt(outcome: &SearchOutcome, query: &str) -> String {
    let mut out = format!("Search query: {query}\n");
    match outcome {
        SearchOutcome::Matched { threshold, .. } => {
            let _ = writeln!(out, "Matched at similarity threshold {threshold:.2}.");
        }
        SearchOutcome::Fallback { .. } => {
            out.push_str("No semantic match; these came from plain text matching.\n");
        }
    }
    let result = outcome.result();
    if result.is_empty() {
        out.push_str("\nNo memories found.\n");
    } else {
        out.push_str("\nMemories:\n");
        for record in &result.records {
            let _ = writeln!(out, "- [{:.2}] {}", record.score, record.text);
        }
    }
    out
}

pub fn synthesis_prompt(report: &ResearchReport) -> String {
    let mut out = format!("Research query: {}\n", report.query);
    if !report.research_question.is_empty() {
        let _ = writeln!(out, "Refined question: {}", report.research_question);
    }
    out.push_str("\nFindings:\n");
    if report.insights.is_empty() {
        out.push_str("(none)\n");
    }
    for insight in &report.insights {
        let _ = writeln!(out, "- {insight}");
    }
    out
}

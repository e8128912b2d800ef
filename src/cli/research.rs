//! CLI `research` command: run a research session and print the report.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use deepmem::config::DeepMemConfig;
use deepmem::llm::OpenAiClient;
use deepmem::research::{Plan, ResearchLoop};

pub struct ResearchArgs<'a> {
    pub query: &'a str,
    pub user_id: Option<&'a str>,
    pub max_iterations: Option<usize>,
    pub synthesize: bool,
    pub json: bool,
}

pub async fn research(config: &DeepMemConfig, args: ResearchArgs<'_>) -> Result<()> {
    let store = config.memory_client()?;
    let llm = OpenAiClient::new(&config.llm)?;
    let scope = config.scope_for(args.user_id);

    let mut settings = config.research_settings()?;
    if let Some(max) = args.max_iterations {
        settings.max_iterations = max;
    }

    // ctrl-c stops the session after the current iteration
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, finishing current iteration...");
            on_signal.cancel();
        }
    });

    let research = ResearchLoop::new(&store, &llm, &llm, settings)?;
    let report = research
        .run(args.query, &scope, Plan::empty(), &cancel)
        .await
        .context("research session failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Research: {}", report.query);
    if !report.research_question.is_empty() {
        println!("Question: {}", report.research_question);
    }
    println!(
        "Iterations: {} (stopped: {})\n",
        report.iterations, report.stop_reason
    );

    for step in &report.steps {
        let strategy = match step.outcome.threshold() {
            Some(t) => format!("threshold {t:.2}"),
            None => "text fallback".to_string(),
        };
        println!(
            "  {}. {} [{}; {} result(s)]",
            step.iteration,
            step.query,
            strategy,
            step.outcome.result().len()
        );
        if !step.observation.insights.is_empty() {
            println!("     {}", super::search::preview(&step.observation.insights, 200));
        }
    }
    if report.evicted_steps > 0 {
        println!("  ({} earlier step(s) dropped from context)", report.evicted_steps);
    }

    if args.synthesize {
        let answer = llm.synthesize(&report).await?;
        println!("\nAnswer\n======\n{answer}");
    } else if !report.insights.is_empty() {
        println!("\nInsights:");
        for insight in &report.insights {
            println!("  - {insight}");
        }
    }

    Ok(())
}

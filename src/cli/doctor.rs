//! CLI `doctor` command: print the resolved configuration and check it.

use anyhow::Result;

use deepmem::config::{default_config_path, DeepMemConfig};

pub fn doctor(config: &DeepMemConfig) -> Result<()> {
    let config_path = default_config_path()?;

    println!("deepmem Health Report");
    println!("=====================");
    println!();
    println!(
        "Config file:       {} ({})",
        config_path.display(),
        if config_path.exists() { "found" } else { "not found, using defaults" }
    );
    println!();
    println!("Memory store:");
    println!("  Base URL:        {}", config.memory.base_url);
    println!("  API key:         {}", key_status(config.memory.api_key.as_deref()));
    println!("  Default user:    {}", config.memory.user_id);
    println!();
    println!("Reasoning model:");
    println!("  Base URL:        {}", config.llm.base_url);
    println!("  Model:           {}", config.llm.model);
    println!("  API key:         {}", key_status(config.llm.api_key.as_deref()));
    println!();
    println!("Search:");
    println!("  Thresholds:      {:?}", config.search.thresholds);
    println!("  Top k:           {}", config.search.top_k);
    println!("  Fallback limit:  {}", config.search.fallback_limit);
    println!();
    println!("Research:");
    println!("  Max iterations:  {}", config.research.max_iterations);
    println!("  Context budget:  {} bytes", config.research.max_context_bytes);
    println!();

    match config.validate() {
        Ok(()) => println!("Configuration:     OK"),
        Err(e) => println!("Configuration:     INVALID ({e:#})"),
    }

    Ok(())
}

fn key_status(key: Option<&str>) -> &'static str {
    match key {
        Some(k) if !k.is_empty() => "set",
        _ => "MISSING",
    }
}

use anyhow::Result;

use deepmem::config::DeepMemConfig;

/// Store content in the memory service and print what it did.
pub async fn remember(config: &DeepMemConfig, content: &str, user_id: Option<&str>) -> Result<()> {
    anyhow::ensure!(!content.trim().is_empty(), "content must not be empty");

    let store = config.memory_client()?;
    let scope = config.scope_for(user_id);
    let added = store.add(content, &scope).await?;

    if added.is_empty() {
        println!("Nothing new to remember.");
    }
    for memory in &added {
        println!(
            "  [{}] {} {}",
            memory.event.as_deref().unwrap_or("ADD"),
            memory.id,
            memory.text.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

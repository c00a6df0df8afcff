use crate::cli::args::{GlobalArgs, ListArgs};
use crate::exit_codes::SUCCESS;

pub async fn run(global: &GlobalArgs, args: ListArgs) -> anyhow::Result<i32> {
    let config = super::load_config(global)?;
    let storage = config.storage()?;

    // Listing must not create the store as a side effect.
    let entries = if storage.has(&config.cache_name).await {
        storage.open(&config.cache_name).await?.keys().await?
    } else {
        Vec::new()
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(SUCCESS);
    }

    if entries.is_empty() {
        println!("{}: no entries", config.cache_name);
        return Ok(SUCCESS);
    }

    println!("{} ({} entries)", config.cache_name, entries.len());
    for meta in &entries {
        println!(
            "  {:<4} {:>3} {:>9}  {}  {}",
            meta.method,
            meta.status,
            meta.size,
            meta.stored_at.format("%Y-%m-%d %H:%M:%S"),
            meta.url
        );
    }

    Ok(SUCCESS)
}

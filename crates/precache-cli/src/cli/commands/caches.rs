use crate::cli::args::GlobalArgs;
use crate::exit_codes::SUCCESS;

pub async fn run(global: &GlobalArgs) -> anyhow::Result<i32> {
    let config = super::load_config(global)?;
    let storage = config.storage()?;

    let names = storage.keys().await?;
    if names.is_empty() {
        println!("no caches under {}", storage.root().display());
        return Ok(SUCCESS);
    }

    for name in names {
        let marker = if name == config.cache_name { "*" } else { " " };
        println!("{} {}", marker, name);
    }

    Ok(SUCCESS)
}

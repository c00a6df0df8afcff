use crate::cli::args::{DeleteCacheArgs, GlobalArgs};
use crate::exit_codes::SUCCESS;

pub async fn run(global: &GlobalArgs, args: DeleteCacheArgs) -> anyhow::Result<i32> {
    let config = super::load_config(global)?;
    let storage = config.storage()?;

    if storage.delete(&args.name).await? {
        tracing::info!(cache = %args.name, "deleted cache");
        println!("deleted {}", args.name);
    } else {
        println!("{} does not exist", args.name);
    }

    Ok(SUCCESS)
}

use precache::{CacheFirstWorker, Lifecycle};

use crate::cli::args::{GlobalArgs, InstallArgs};
use crate::exit_codes::SUCCESS;

pub async fn run(global: &GlobalArgs, args: InstallArgs) -> anyhow::Result<i32> {
    let config = super::load_config(global)?;
    let worker = CacheFirstWorker::from_config(&config).await?;

    let report = worker.on_install().await?;

    if args.format == "json" {
        let out = serde_json::json!({
            "cache_name": report.cache_name,
            "stored": report.stored,
            "urls": report.urls,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "Installed {} entr{} into {}",
            report.stored,
            if report.stored == 1 { "y" } else { "ies" },
            report.cache_name
        );
        for url in &report.urls {
            println!("  {}", url);
        }
    }

    Ok(SUCCESS)
}

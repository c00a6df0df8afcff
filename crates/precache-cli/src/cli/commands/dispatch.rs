use super::super::args::*;
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::Install(args) => super::install::run(&global, args).await,
        Command::Fetch(args) => super::fetch::run(&global, args).await,
        Command::List(args) => super::list::run(&global, args).await,
        Command::Caches => super::caches::run(&global).await,
        Command::DeleteCache(args) => super::delete_cache::run(&global, args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}

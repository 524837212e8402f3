mod build;
mod clean;
mod init;
mod watch;

use anyhow::Context;

use dtsgen::config::Config;
use dtsgen::watcher::WatchTarget;
use dtsgen::DtsgenResult;

use crate::cli::{Cli, Commands};

pub fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let cwd = cli
        .cwd
        .canonicalize()
        .with_context(|| format!("resolving project root {}", cli.cwd.display()))?;
    let config = Config::load(&cwd)?;
    match cli.command {
        Commands::Build => build::run(&config, cli.json),
        Commands::Watch => watch::run(config, cli.json),
        Commands::Clean => clean::run(&config),
        Commands::Init { js } => init::run(&config, js),
    }
}

/// One watch target per enabled directory.
fn build_targets(config: &Config) -> DtsgenResult<Vec<WatchTarget>> {
    let mut targets = Vec::new();
    for (name, dir) in config.effective_watch_dirs() {
        if !dir.enabled() {
            continue;
        }
        targets.push(WatchTarget::new(&name, &dir, config)?);
    }
    Ok(targets)
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dtsgen",
    version,
    about = "Generates ambient TypeScript declarations for convention-loaded modules"
)]
pub struct Cli {
    /// Project root to operate in.
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub cwd: PathBuf,

    /// Emit one JSON event per line instead of human-readable output.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate every declaration file once and exit.
    Build,
    /// Build, then keep regenerating as sources change.
    Watch,
    /// Remove generated declarations and stale compiled .js files.
    Clean,
    /// Write starter dtsgen.toml and tsconfig.json files.
    Init {
        /// Write jsconfig.json instead of tsconfig.json.
        #[arg(long)]
        js: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
        let cli = Cli::try_parse_from(["dtsgen", "--json", "-C", "/tmp/proj", "watch"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.cwd, PathBuf::from("/tmp/proj"));
        assert!(matches!(cli.command, Commands::Watch));
    }

    #[test]
    fn test_init_js_flag() {
        let cli = Cli::try_parse_from(["dtsgen", "init", "--js"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { js: true }));
    }
}

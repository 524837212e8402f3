use std::fs;

use dtsgen::config::Config;
use dtsgen::utils::{clean_js, log};

pub fn run(config: &Config) -> anyhow::Result<()> {
    let typings = config.typings_root();
    if typings.is_dir() {
        fs::remove_dir_all(&typings)?;
        if !config.silent {
            log(&format!("removed {}", typings.display()));
        }
    }
    for removed in clean_js(&config.cwd)? {
        if !config.silent {
            log(&format!("removed {}", removed.display()));
        }
    }
    Ok(())
}

use std::fs;

use dtsgen::config::{Config, CONFIG_FILE};
use dtsgen::utils::{log, write_jsconfig, write_tsconfig};

const STARTER_CONFIG: &str = "\
# dtsgen project configuration. Every key is optional.
framework = \"egg\"
typings = \"typings\"
throttle_ms = 500

# Additional directories to watch:
#
# [watch_dirs.custom]
# path = \"app/custom\"
# interface = \"ICustom\"
# generator = \"class\"
";

pub fn run(config: &Config, js: bool) -> anyhow::Result<()> {
    let path = config.cwd.join(CONFIG_FILE);
    if path.exists() {
        if !config.silent {
            log(&format!("{CONFIG_FILE} already exists, leaving it alone"));
        }
    } else {
        fs::write(&path, STARTER_CONFIG)?;
        if !config.silent {
            log(&format!("wrote {}", path.display()));
        }
    }

    let written = if js {
        write_jsconfig(&config.cwd)?
    } else {
        write_tsconfig(&config.cwd)?
    };
    if !config.silent {
        let name = if js { "jsconfig.json" } else { "tsconfig.json" };
        if written {
            log(&format!("wrote {name}"));
        } else {
            log(&format!("{name} already exists, leaving it alone"));
        }
    }
    Ok(())
}

use dtsgen::config::Config;
use dtsgen::utils::{apply_output, log};
use dtsgen::watcher::WatchEvent;

pub fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    for mut target in super::build_targets(config)? {
        let output = target.build()?;
        apply_output(&output)?;
        for skip in &output.skipped {
            if json {
                let event = WatchEvent::SkippedFile {
                    target: target.name.clone(),
                    path: target.dir().join(&skip.file),
                    message: skip.message.clone(),
                };
                println!("{}", event.to_json());
            } else if !config.silent {
                log(&format!("{}: skipped {}: {}", target.name, skip.file, skip.message));
            }
        }
        if json {
            let event = WatchEvent::Generated {
                target: target.name.clone(),
                dist: output.dist.clone(),
                trigger: None,
            };
            println!("{}", event.to_json());
        } else if !config.silent {
            match &output.content {
                Some(_) => log(&format!("updated {}", output.dist.display())),
                None => log(&format!("nothing to declare for {}", target.name)),
            }
        }
    }
    Ok(())
}

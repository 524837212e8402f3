use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fs2::FileExt;

use dtsgen::config::Config;
use dtsgen::error::DtsgenError;
use dtsgen::utils::{apply_output, clean_js, log};
use dtsgen::watcher::{self, WatchEvent};

pub fn run(config: Config, json: bool) -> anyhow::Result<()> {
    let typings = config.typings_root();
    fs::create_dir_all(&typings)?;

    // one watcher per project
    let lock_path = typings.join(".dtsgen.lock");
    let lock = fs::File::create(&lock_path)?;
    lock.try_lock_exclusive()
        .map_err(|_| DtsgenError::Locked {
            path: lock_path.clone(),
        })?;

    if config.auto_remove_js {
        for removed in clean_js(&config.cwd)? {
            if !config.silent && !json {
                log(&format!("removed {}", removed.display()));
            }
        }
    }

    let mut targets = super::build_targets(&config)?;
    for target in &mut targets {
        let output = target.build()?;
        apply_output(&output)?;
        let silent = config.silent;
        target.on_update(move |output, _file| {
            if let Err(err) = apply_output(output) {
                if !silent {
                    log(&format!("write failed: {err}"));
                }
            }
        });
    }

    let running = Arc::new(AtomicBool::new(true));
    let handle = running.clone();
    ctrlc::set_handler(move || handle.store(false, Ordering::SeqCst))?;

    let silent = config.silent;
    watcher::run(targets, running, |event| {
        if json {
            println!("{}", event.to_json());
        } else if !silent {
            print_event(event);
        }
    })?;
    Ok(())
}

fn print_event(event: &WatchEvent) {
    match event {
        WatchEvent::WatchStarted { target, dir } => {
            log(&format!("watching {target} ({})", dir.display()));
        }
        WatchEvent::FileChanged { target, path } => {
            log(&format!("{target}: changed {}", path.display()));
        }
        WatchEvent::Generated { dist, .. } => {
            log(&format!("updated {}", dist.display()));
        }
        WatchEvent::SkippedFile { path, message, .. } => {
            log(&format!("skipped {}: {message}", path.display()));
        }
        WatchEvent::Error { message } => {
            log(&format!("error: {message}"));
        }
        WatchEvent::Shutdown => log("shutting down"),
    }
}

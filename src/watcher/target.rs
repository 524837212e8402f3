//! One watched directory: filesystem events in, declaration files out.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ignore::overrides::Override;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use sha2::{Digest, Sha256};

use crate::config::{Config, Trigger, WatchDirConfig};
use crate::error::{DtsgenError, DtsgenResult};
use crate::generators::{
    resolve_generator, Generator, GeneratorContext, GeneratorOutput, GeneratorRef,
};
use crate::utils::{build_matcher, load_files, relative_path, remove_same_name_js};

use super::event::{PendingQueue, WatchEvent};

/// Poll interval of the watch loop.
const TICK_MS: u64 = 25;

type UpdateListener = Box<dyn FnMut(&GeneratorOutput, Option<&Path>) + Send>;

pub struct WatchTarget {
    pub name: String,
    options: WatchDirConfig,
    config: Config,
    generator: Arc<dyn Generator>,
    dir: PathBuf,
    dts_dir: PathBuf,
    matcher: Override,
    queue: PendingQueue,
    fs_watcher: Option<RecommendedWatcher>,
    rx: Option<Receiver<notify::Result<notify::Event>>>,
    listeners: Vec<UpdateListener>,
    hashes: HashMap<PathBuf, [u8; 32]>,
}

impl WatchTarget {
    /// Builds a target from its directory config. An unknown generator
    /// name fails here, before anything is watched.
    pub fn new(name: &str, dir_config: &WatchDirConfig, config: &Config) -> DtsgenResult<Self> {
        let generator =
            resolve_generator(&GeneratorRef::Name(dir_config.generator_name().to_string()))?;
        WatchTarget::with_generator(name, dir_config, config, generator)
    }

    /// Same, but with a concrete generator instance.
    pub fn with_generator(
        name: &str,
        dir_config: &WatchDirConfig,
        config: &Config,
        generator: Arc<dyn Generator>,
    ) -> DtsgenResult<Self> {
        let options = dir_config.merged(&generator.defaults());
        let dir = config.cwd.join(&options.path);
        let dts_dir = config
            .typings_root()
            .join(relative_path(&config.cwd, &dir));
        let matcher = build_matcher(&dir, options.pattern())?;
        let queue = PendingQueue::new(Duration::from_millis(config.throttle_ms));
        Ok(WatchTarget {
            name: name.to_string(),
            options,
            config: config.clone(),
            generator,
            dir,
            dts_dir,
            matcher,
            queue,
            fs_watcher: None,
            rx: None,
            listeners: Vec::new(),
            hashes: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn dts_dir(&self) -> &Path {
        &self.dts_dir
    }

    /// Registers a listener called with every generator output.
    pub fn on_update<F>(&mut self, listener: F)
    where
        F: FnMut(&GeneratorOutput, Option<&Path>) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Starts the filesystem watcher. Calling it again replaces the old
    /// watcher; a missing directory is left unwatched.
    pub fn watch(&mut self) -> DtsgenResult<()> {
        self.fs_watcher = None;
        self.rx = None;
        if !self.config.watch || !self.options.enabled() || !self.dir.is_dir() {
            return Ok(());
        }
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        )
        .map_err(|source| DtsgenError::Watch {
            path: self.dir.clone(),
            source,
        })?;
        watcher
            .watch(&self.dir, RecursiveMode::Recursive)
            .map_err(|source| DtsgenError::Watch {
                path: self.dir.clone(),
                source,
            })?;
        self.fs_watcher = Some(watcher);
        self.rx = Some(rx);
        Ok(())
    }

    /// Regenerates from the current state of the directory and notifies
    /// listeners. `file` is the change that triggered the run, if any.
    pub fn execute(&mut self, file: Option<&Path>) -> DtsgenResult<GeneratorOutput> {
        let file_list = load_files(&self.dir, self.options.pattern())?;
        let ctx = GeneratorContext {
            file,
            dir: &self.dir,
            dts_dir: &self.dts_dir,
            file_list: &file_list,
            options: &self.options,
        };
        let output = self.generator.generate(&ctx, &self.config)?;
        for listener in &mut self.listeners {
            listener(&output, file);
        }
        Ok(output)
    }

    /// One-shot generation, independent of any filesystem event.
    pub fn build(&mut self) -> DtsgenResult<GeneratorOutput> {
        self.execute(None)
    }

    /// One pass of the watch loop: drains filesystem events into the
    /// debounce queue and, when the window has elapsed, regenerates.
    pub fn tick(&mut self, events: &mut Vec<WatchEvent>) {
        let mut incoming = Vec::new();
        if let Some(rx) = &self.rx {
            while let Ok(res) = rx.try_recv() {
                match res {
                    Ok(event) => {
                        let kind = event.kind;
                        for path in event.paths {
                            incoming.push((kind, path));
                        }
                    }
                    Err(err) => events.push(WatchEvent::Error {
                        message: err.to_string(),
                    }),
                }
            }
        }
        for (kind, path) in incoming {
            if let Some(accepted) = self.consider(kind, path) {
                self.queue.push(accepted);
            }
        }

        if !self.queue.ready() {
            return;
        }
        for path in self.queue.drain() {
            events.push(WatchEvent::FileChanged {
                target: self.name.clone(),
                path: path.clone(),
            });
            match self.execute(Some(&path)) {
                Ok(output) => {
                    for skip in &output.skipped {
                        events.push(WatchEvent::SkippedFile {
                            target: self.name.clone(),
                            path: self.dir.join(&skip.file),
                            message: skip.message.clone(),
                        });
                    }
                    events.push(WatchEvent::Generated {
                        target: self.name.clone(),
                        dist: output.dist,
                        trigger: Some(path),
                    });
                }
                Err(err) => events.push(WatchEvent::Error {
                    message: format!("{}: {err}", self.name),
                }),
            }
        }
    }

    /// Applies the per-change filters: glob match, trigger kind, and the
    /// content hash that drops editor noise. Returns the path when the
    /// change should regenerate.
    fn consider(&mut self, kind: EventKind, path: PathBuf) -> Option<PathBuf> {
        let trigger = match kind {
            EventKind::Create(_) => Trigger::Add,
            EventKind::Modify(_) | EventKind::Any => Trigger::Change,
            EventKind::Remove(_) => Trigger::Remove,
            EventKind::Access(_) | EventKind::Other => return None,
        };
        if !self.matcher.matched(&path, false).is_whitelist() {
            return None;
        }
        if trigger == Trigger::Remove {
            self.hashes.remove(&path);
            if self.config.auto_remove_js {
                let _ = remove_same_name_js(&path);
            }
        } else if path.is_file() {
            let bytes = fs::read(&path).ok()?;
            let digest: [u8; 32] = Sha256::digest(&bytes).into();
            if self.hashes.get(&path) == Some(&digest) {
                return None;
            }
            self.hashes.insert(path.clone(), digest);
        }
        if let Some(allowed) = &self.options.trigger {
            if !allowed.contains(&trigger) {
                return None;
            }
        }
        Some(path)
    }

    /// Stops watching and forgets all pending state. Safe to call twice.
    pub fn destroy(&mut self) {
        self.fs_watcher = None;
        self.rx = None;
        self.queue.clear();
        self.listeners.clear();
        self.hashes.clear();
    }
}

/// Runs targets until `running` clears, forwarding every event to `emit`.
pub fn run<F>(
    mut targets: Vec<WatchTarget>,
    running: Arc<AtomicBool>,
    mut emit: F,
) -> DtsgenResult<()>
where
    F: FnMut(&WatchEvent),
{
    for target in &mut targets {
        target.watch()?;
        emit(&WatchEvent::WatchStarted {
            target: target.name.clone(),
            dir: target.dir.clone(),
        });
    }
    while running.load(Ordering::SeqCst) {
        let mut events = Vec::new();
        for target in &mut targets {
            target.tick(&mut events);
        }
        for event in &events {
            emit(event);
        }
        thread::sleep(Duration::from_millis(TICK_MS));
    }
    for target in &mut targets {
        target.destroy();
    }
    emit(&WatchEvent::Shutdown);
    Ok(())
}

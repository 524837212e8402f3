//! dtsgen generates ambient TypeScript declaration files for frameworks
//! that load application code by directory convention. It maps each source
//! file under a watched directory to a property on a framework interface,
//! writes one `index.d.ts` per directory under `typings/`, and keeps the
//! output current by watching the sources with a debounce window.
//!
//! The pieces:
//!
//! - [`config`]: `dtsgen.toml` plus built-in watch directories
//! - [`mapper`]: file paths to property chains and module names
//! - [`render`]: namespace trees to `interface` blocks
//! - [`resolver`]: shallow parsing and export discovery for config files
//! - [`generators`]: the class/function/object/config generators
//! - [`watcher`]: the debounced watch engine

pub mod config;
pub mod error;
pub mod generators;
pub mod mapper;
pub mod render;
pub mod resolver;
pub mod utils;
pub mod watcher;

pub use config::Config;
pub use error::{DtsgenError, DtsgenResult};
pub use generators::{Generator, GeneratorContext, GeneratorOutput, GeneratorRef};
pub use watcher::{WatchEvent, WatchTarget};

//! Declaration generators.
//!
//! A generator turns the current file list of one watched directory into
//! a single declaration file. Generators are looked up by name in a small
//! static registry; a watch target can also carry a generator instance
//! directly.

pub mod class;
pub mod config;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::config::{Config, WatchDirConfig};
use crate::error::{DtsgenError, DtsgenResult};

pub use class::ClassGenerator;
pub use config::ConfigGenerator;

/// Defaults a generator contributes to its watch directory's settings.
#[derive(Debug, Clone, Default)]
pub struct GeneratorDefaults {
    pub pattern: Option<String>,
    pub interface: Option<String>,
    pub interface_handle: Option<String>,
}

/// Everything a generator needs for one run.
pub struct GeneratorContext<'a> {
    /// The file whose change triggered the run, when there is one.
    pub file: Option<&'a Path>,
    /// Absolute path of the watched directory.
    pub dir: &'a Path,
    /// Absolute path of the matching directory under the typings root.
    pub dts_dir: &'a Path,
    /// Current source files, relative to `dir`.
    pub file_list: &'a [String],
    /// Directory settings, already merged with the generator defaults.
    pub options: &'a WatchDirConfig,
}

/// What a generator run produced: the declaration file path and its
/// content, or `None` content when the file should be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOutput {
    pub dist: PathBuf,
    pub content: Option<String>,
    /// Source files the generator could not use, with the reason.
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub file: String,
    pub message: String,
}

pub trait Generator: Send + Sync {
    fn defaults(&self) -> GeneratorDefaults;
    fn generate(&self, ctx: &GeneratorContext<'_>, base: &Config)
        -> DtsgenResult<GeneratorOutput>;
}

/// How a watch directory names its generator: by registry name or as a
/// concrete instance.
#[derive(Clone)]
pub enum GeneratorRef {
    Name(String),
    Direct(Arc<dyn Generator>),
}

impl fmt::Debug for GeneratorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorRef::Name(name) => f.debug_tuple("Name").field(name).finish(),
            GeneratorRef::Direct(_) => f.write_str("Direct(..)"),
        }
    }
}

/// A registry generator whose only difference from the one it wraps is
/// the defaults it contributes.
struct Variant {
    inner: Arc<ClassGenerator>,
    defaults: GeneratorDefaults,
}

impl Generator for Variant {
    fn defaults(&self) -> GeneratorDefaults {
        self.defaults.clone()
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        base: &Config,
    ) -> DtsgenResult<GeneratorOutput> {
        self.inner.generate(ctx, base)
    }
}

fn registry() -> &'static HashMap<&'static str, Arc<dyn Generator>> {
    static REGISTRY: OnceLock<HashMap<&'static str, Arc<dyn Generator>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        // the class generator is shared so its synthetic-name counter is
        // global across variants
        let class = Arc::new(ClassGenerator::new());
        let mut map: HashMap<&'static str, Arc<dyn Generator>> = HashMap::new();
        map.insert("class", class.clone());
        map.insert(
            "function",
            Arc::new(Variant {
                inner: class.clone(),
                defaults: GeneratorDefaults {
                    interface_handle: Some("ReturnType<typeof {{ 0 }}>".to_string()),
                    ..Default::default()
                },
            }),
        );
        map.insert(
            "object",
            Arc::new(Variant {
                inner: class,
                defaults: GeneratorDefaults {
                    interface_handle: Some("typeof {{ 0 }}".to_string()),
                    ..Default::default()
                },
            }),
        );
        map.insert("config", Arc::new(ConfigGenerator::new()));
        map
    })
}

/// Resolves a generator reference against the registry.
pub fn resolve_generator(gen: &GeneratorRef) -> DtsgenResult<Arc<dyn Generator>> {
    match gen {
        GeneratorRef::Name(name) => registry()
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| DtsgenError::GeneratorNotFound { name: name.clone() }),
        GeneratorRef::Direct(generator) => Ok(generator.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        for name in ["class", "function", "object", "config"] {
            assert!(
                resolve_generator(&GeneratorRef::Name(name.to_string())).is_ok(),
                "missing {name}"
            );
        }
    }

    #[test]
    fn test_unknown_generator_is_an_error() {
        let err = match resolve_generator(&GeneratorRef::Name("nope".to_string())) {
            Ok(_) => panic!("lookup unexpectedly succeeded"),
            Err(err) => err,
        };
        assert_eq!(err.to_string(), "generator 'nope' does not exist");
    }

    #[test]
    fn test_variant_defaults() {
        let function = resolve_generator(&GeneratorRef::Name("function".to_string())).unwrap();
        assert_eq!(
            function.defaults().interface_handle.as_deref(),
            Some("ReturnType<typeof {{ 0 }}>")
        );
        let object = resolve_generator(&GeneratorRef::Name("object".to_string())).unwrap();
        assert_eq!(
            object.defaults().interface_handle.as_deref(),
            Some("typeof {{ 0 }}")
        );
    }

    #[test]
    fn test_direct_generator() {
        let direct: Arc<dyn Generator> = Arc::new(ClassGenerator::with_seed(1));
        let resolved = resolve_generator(&GeneratorRef::Direct(direct.clone())).unwrap();
        assert!(Arc::ptr_eq(&direct, &resolved));
    }
}

//! The class generator: one import plus one interface property per source
//! file, nested to mirror the directory layout.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::Config;
use crate::error::{DtsgenError, DtsgenResult};
use crate::mapper::{camel_prop, module_path, CaseStyle};
use crate::render::{compose_chain, compose_interface, LeafHandle, NamespaceTree};
use crate::utils::import_line;

use super::{Generator, GeneratorContext, GeneratorDefaults, GeneratorOutput};

/// Allocates synthetic interface names (`TC100`, `TC101`, ...) when the
/// directory config does not name one. The counter is shared process-wide
/// through the registry so names never collide across directories.
pub struct ClassGenerator {
    seq: AtomicUsize,
}

impl ClassGenerator {
    pub fn new() -> Self {
        ClassGenerator::with_seed(100)
    }

    /// Counter seed, injectable for deterministic output in tests.
    pub fn with_seed(seed: usize) -> Self {
        ClassGenerator {
            seq: AtomicUsize::new(seed),
        }
    }

    fn next_interface_name(&self) -> String {
        format!("TC{}", self.seq.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ClassGenerator {
    fn default() -> Self {
        ClassGenerator::new()
    }
}

impl Generator for ClassGenerator {
    fn defaults(&self) -> GeneratorDefaults {
        GeneratorDefaults::default()
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        base: &Config,
    ) -> DtsgenResult<GeneratorOutput> {
        let dist = ctx.dts_dir.join("index.d.ts");
        if ctx.file_list.is_empty() {
            return Ok(GeneratorOutput {
                dist,
                content: None,
                skipped: Vec::new(),
            });
        }

        let style: CaseStyle = ctx
            .options
            .case_style
            .as_deref()
            .unwrap_or(&base.case_style)
            .parse()
            .map_err(|message| DtsgenError::Config { message })?;

        let mut imports = Vec::with_capacity(ctx.file_list.len());
        let mut tree = NamespaceTree::new();
        for file in ctx.file_list {
            let path = module_path(file);
            let module_name = format!("Export{}", path.module_name);
            imports.push(import_line(
                ctx.dts_dir,
                &ctx.dir.join(file),
                &module_name,
                false,
            ));
            let props: Vec<String> = path
                .props
                .iter()
                .map(|p| camel_prop(p, &style))
                .collect();
            tree.insert(&props, &module_name);
        }

        let interface_name = ctx
            .options
            .interface
            .clone()
            .unwrap_or_else(|| self.next_interface_name());
        let handle = ctx
            .options
            .interface_handle
            .clone()
            .map(LeafHandle::Template);

        let mut declare_chain = String::new();
        if let Some(declare_to) = &ctx.options.declare_to {
            let mut parts: Vec<String> = declare_to.split('.').map(str::to_string).collect();
            let wrap = parts.remove(0);
            parts.push(interface_name.clone());
            declare_chain = compose_chain(&parts, Some(&wrap), "  ");
            declare_chain.push('\n');
        }

        let framework = ctx
            .options
            .framework
            .as_deref()
            .unwrap_or(&base.framework);
        let body = compose_interface(&tree, Some(&interface_name), handle.as_ref(), "  ");
        let content = format!(
            "{}\n\ndeclare module '{framework}' {{\n{declare_chain}{body}}}\n",
            imports.join("\n"),
        );
        Ok(GeneratorOutput {
            dist,
            content: Some(content),
            skipped: Vec::new(),
        })
    }
}

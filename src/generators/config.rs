//! The config generator: merges every `config*.ts` file's exported shape
//! into the framework's app-config interface.
//!
//! Unlike the class generator it has to look inside the sources: a config
//! file exporting a factory function contributes `ReturnType<typeof X>`,
//! one exporting a plain object contributes `typeof X`.

use std::fs;

use crate::config::Config;
use crate::error::DtsgenResult;
use crate::mapper::module_path;
use crate::resolver::{resolve_exports, ExprKind};
use crate::utils::{import_line, log};

use super::{Generator, GeneratorContext, GeneratorDefaults, GeneratorOutput, Skipped};

pub struct ConfigGenerator;

impl ConfigGenerator {
    pub fn new() -> Self {
        ConfigGenerator
    }
}

impl Generator for ConfigGenerator {
    fn defaults(&self) -> GeneratorDefaults {
        GeneratorDefaults {
            pattern: Some("config*.{ts,js}".to_string()),
            interface: Some("EggAppConfig".to_string()),
            ..Default::default()
        }
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        base: &Config,
    ) -> DtsgenResult<GeneratorOutput> {
        let dist = ctx.dts_dir.join("index.d.ts");
        let mut imports = Vec::new();
        let mut aliases = Vec::new();
        let mut extends = Vec::new();
        let mut skipped = Vec::new();

        for file in ctx.file_list {
            let path = ctx.dir.join(file);
            let source = match fs::read_to_string(&path) {
                Ok(source) => source,
                Err(_) => continue,
            };
            // a single unparsable file must not block the rest
            let descriptor = match resolve_exports(&source) {
                Ok(descriptor) => descriptor,
                Err(err) => {
                    if !base.silent {
                        log(&format!("skipping {file}: {err}"));
                    }
                    skipped.push(Skipped {
                        file: file.clone(),
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            if descriptor.is_empty() {
                continue;
            }

            let module_name = format!("Export{}", module_path(file).module_name);
            let rhs = match &descriptor.default_export {
                Some(expr) if matches!(expr.kind, ExprKind::Function | ExprKind::Arrow) => {
                    imports.push(import_line(ctx.dts_dir, &path, &module_name, false));
                    format!("ReturnType<typeof {module_name}>")
                }
                Some(_) => {
                    imports.push(import_line(ctx.dts_dir, &path, &module_name, false));
                    format!("typeof {module_name}")
                }
                // named exports only: pull the whole module in
                None => {
                    imports.push(import_line(ctx.dts_dir, &path, &module_name, true));
                    format!("typeof {module_name}")
                }
            };
            let alias = format!("{}Conf", module_path(file).module_name);
            aliases.push(format!("type {alias} = {rhs};"));
            extends.push(alias);
        }

        if extends.is_empty() {
            return Ok(GeneratorOutput {
                dist,
                content: None,
                skipped,
            });
        }

        let interface = ctx.options.interface.as_deref().unwrap_or("EggAppConfig");
        let framework = ctx
            .options
            .framework
            .as_deref()
            .unwrap_or(&base.framework);
        let content = format!(
            "{}\n\n{}\n\ndeclare module '{framework}' {{\n  interface {interface} extends {} {{ }}\n}}\n",
            imports.join("\n"),
            aliases.join("\n"),
            extends.join(", "),
        );
        Ok(GeneratorOutput {
            dist,
            content: Some(content),
            skipped,
        })
    }
}

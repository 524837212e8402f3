//! Source-level export discovery.
//!
//! Parses a module shallowly and reports what it exports: the default
//! export's value expression plus every named export. Bare identifier
//! exports are chased back through earlier assignments so the caller sees
//! the value that actually leaves the module, not the alias.

pub mod ast;
pub mod lexer;

use std::collections::{HashMap, HashSet};

use crate::error::DtsgenResult;

pub use ast::{walk, Expr, ExprKind, Node, SourceFile, Statement, Step};

/// One named export and, when discoverable, its value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedExport {
    pub name: Option<String>,
    pub value: Option<Expr>,
}

/// Everything a module exports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportDescriptor {
    /// `export default` / `export =` / `module.exports =` value.
    pub default_export: Option<Expr>,
    /// `export const`, `export function`, `exports.x =` entries, in source
    /// order.
    pub named_exports: Vec<NamedExport>,
}

impl ExportDescriptor {
    pub fn is_empty(&self) -> bool {
        self.default_export.is_none() && self.named_exports.is_empty()
    }
}

/// Parses `source` and resolves its exports.
pub fn resolve_exports(source: &str) -> DtsgenResult<ExportDescriptor> {
    let file = ast::parse(source)?;
    let mut cache: HashMap<String, Expr> = HashMap::new();
    let mut descriptor = ExportDescriptor::default();

    for stmt in &file.statements {
        match stmt {
            Statement::Var { exported, bindings } => {
                for binding in bindings {
                    if *exported {
                        descriptor.named_exports.push(NamedExport {
                            name: binding.name.clone(),
                            value: binding.init.clone(),
                        });
                    } else if let (Some(name), Some(init)) = (&binding.name, &binding.init) {
                        cache.insert(name.clone(), init.clone());
                    }
                }
            }
            Statement::Decl {
                exported,
                default,
                name,
                value,
            } => {
                if *exported && *default {
                    descriptor.default_export = Some(value.clone());
                } else if *exported {
                    descriptor.named_exports.push(NamedExport {
                        name: name.clone(),
                        value: Some(value.clone()),
                    });
                } else if let Some(name) = name {
                    cache.insert(name.clone(), value.clone());
                }
            }
            Statement::ExportDefault { value } | Statement::ExportAssign { value } => {
                descriptor.default_export = Some(value.clone());
            }
            Statement::Assign { target, value } => match target.as_slice() {
                [module, exports] if module == "module" && exports == "exports" => {
                    descriptor.default_export = Some(value.clone());
                }
                [exports, prop] if exports == "exports" => {
                    descriptor.named_exports.push(NamedExport {
                        name: Some(prop.clone()),
                        value: Some(value.clone()),
                    });
                }
                [name] => {
                    // later assignment to a local wins over its declaration
                    cache.insert(name.clone(), value.clone());
                }
                _ => {}
            },
            Statement::Other => {}
        }
    }

    descriptor.default_export = chase(descriptor.default_export, &mut cache);
    for export in &mut descriptor.named_exports {
        export.value = chase(export.value.take(), &mut cache);
    }
    Ok(descriptor)
}

/// Follows identifier aliases through the local value cache. Each cache
/// entry is consumed as it is used, which also terminates cyclic chains.
fn chase(mut value: Option<Expr>, cache: &mut HashMap<String, Expr>) -> Option<Expr> {
    let mut visited = HashSet::new();
    loop {
        let name = match &value {
            Some(Expr {
                kind: ExprKind::Ident(name),
                ..
            }) => name.clone(),
            _ => return value,
        };
        if !visited.insert(name.clone()) {
            return value;
        }
        match cache.remove(&name) {
            Some(resolved) => value = Some(resolved),
            None => return value,
        }
    }
}

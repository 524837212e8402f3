//! Path-to-namespace mapping.
//!
//! Converts a file path relative to a watch root into the property path it
//! occupies in the generated interface tree, plus the pascal-cased module
//! identifier used for its import binding.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Case transform for the first character of a mapped property segment.
///
/// The delimiter transform ([`format_prop`]) always runs first; the style
/// then only governs the first character. A `Custom` function replaces the
/// whole pipeline for that segment.
#[derive(Clone, Default)]
pub enum CaseStyle {
    Lower,
    Upper,
    #[default]
    Camel,
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl fmt::Debug for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStyle::Lower => f.write_str("Lower"),
            CaseStyle::Upper => f.write_str("Upper"),
            CaseStyle::Camel => f.write_str("Camel"),
            CaseStyle::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl FromStr for CaseStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lower" => Ok(CaseStyle::Lower),
            "upper" => Ok(CaseStyle::Upper),
            "camel" => Ok(CaseStyle::Camel),
            other => Err(format!("unknown case style '{other}'")),
        }
    }
}

/// Deletes a `.`/`_`/`-` delimiter immediately followed by a letter and
/// upper-cases that letter: `foo-bar` becomes `fooBar`, `a.b_c` becomes
/// `aBC`. Delimiters not followed by a letter are kept as-is.
pub fn format_prop(prop: &str) -> String {
    let mut out = String::with_capacity(prop.len());
    let mut chars = prop.chars().peekable();
    while let Some(c) = chars.next() {
        if matches!(c, '.' | '_' | '-') {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_alphabetic() {
                    chars.next();
                    out.push(next.to_ascii_uppercase());
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Maps one property segment through the delimiter transform, then applies
/// the case style to the first character only.
pub fn camel_prop(prop: &str, style: &CaseStyle) -> String {
    if let CaseStyle::Custom(f) = style {
        return f(prop);
    }
    let prop = format_prop(prop);
    let mut chars = prop.chars();
    let Some(first) = chars.next() else {
        return prop;
    };
    let first = match style {
        CaseStyle::Lower => first.to_ascii_lowercase(),
        CaseStyle::Upper => first.to_ascii_uppercase(),
        CaseStyle::Camel | CaseStyle::Custom(_) => first,
    };
    let mut out = String::with_capacity(prop.len());
    out.push(first);
    out.push_str(chars.as_str());
    out
}

/// A file path mapped onto the namespace tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePath {
    /// Ordered property-path segments: directory components plus file stem.
    pub props: Vec<String>,
    /// Pascal-cased module identifier, every segment through the `upper`
    /// style, concatenated.
    pub module_name: String,
}

/// Maps a file path relative to its watch root. The extension is stripped
/// here; a root-level file still produces a one-element path.
pub fn module_path(file: &str) -> ModulePath {
    let stem = match file.rfind('.') {
        Some(idx) => &file[..idx],
        None => file,
    };
    let props: Vec<String> = stem.split(['/', '\\']).map(str::to_string).collect();
    let module_name = props
        .iter()
        .map(|p| camel_prop(p, &CaseStyle::Upper))
        .collect();
    ModulePath { props, module_name }
}

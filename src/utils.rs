//! Filesystem and path helpers shared by the generators and commands.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;

use crate::error::DtsgenResult;

/// Builds the matcher for one watched directory: its source glob minus
/// declaration files and `node_modules`.
pub fn build_matcher(dir: &Path, pattern: &str) -> DtsgenResult<Override> {
    let mut builder = OverrideBuilder::new(dir);
    builder.add(pattern)?;
    builder.add("!**/*.d.ts")?;
    builder.add("!**/node_modules/**")?;
    Ok(builder.build()?)
}

/// Lists source files under `dir` matching `pattern`, as sorted
/// `/`-separated paths relative to `dir`. Declaration files are excluded,
/// and a `.js` file is dropped when a same-stem `.ts` exists next to it.
pub fn load_files(dir: &Path, pattern: &str) -> DtsgenResult<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let matcher = build_matcher(dir, pattern)?;
    let mut files = Vec::new();
    for entry in WalkBuilder::new(dir).standard_filters(false).build() {
        let entry = entry?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if !matcher.matched(entry.path(), false).is_whitelist() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        files.push(rel);
    }
    files.sort();

    let stems: HashSet<String> = files
        .iter()
        .filter_map(|f| f.strip_suffix(".ts"))
        .map(str::to_string)
        .collect();
    files.retain(|f| match f.strip_suffix(".js") {
        Some(stem) => !stems.contains(stem),
        None => true,
    });
    Ok(files)
}

/// Relative path from directory `from` to directory `to`, `/`-separated.
pub fn relative_path(from: &Path, to: &Path) -> String {
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let mut parts: Vec<String> = vec!["..".to_string(); from.len() - common];
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// One import line for a generated declaration file.
///
/// `from` is the directory holding the declaration file, `to` the source
/// file the import points at (extension included; it is stripped here).
pub fn import_line(from: &Path, to: &Path, module_name: &str, import_star: bool) -> String {
    let to = to.with_extension("");
    let parent = to.parent().unwrap_or(Path::new(""));
    let stem = to
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut rel = relative_path(from, parent);
    if rel == "." {
        rel.clear();
    } else {
        rel.push('/');
    }
    if !rel.starts_with('.') {
        rel.insert_str(0, "./");
    }
    if import_star {
        format!("import * as {module_name} from '{rel}{stem}';")
    } else {
        format!("import {module_name} from '{rel}{stem}';")
    }
}

/// Writes `content` to `path` atomically, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> DtsgenResult<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;
    let tmp = tempfile::NamedTempFile::new_in(parent)?;
    fs::write(tmp.path(), content)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Applies a generator output: write the file, or delete it when the
/// generator produced no content.
pub fn apply_output(output: &crate::generators::GeneratorOutput) -> DtsgenResult<()> {
    match &output.content {
        Some(content) => write_file(&output.dist, content),
        None => {
            if output.dist.exists() {
                fs::remove_file(&output.dist)?;
            }
            Ok(())
        }
    }
}

/// Deletes the compiled `.js` (and `.map`) siblings of a TypeScript file.
pub fn remove_same_name_js(ts_path: &Path) -> DtsgenResult<()> {
    if ts_path.extension().map(|e| e == "ts").unwrap_or(false)
        && !ts_path
            .to_string_lossy()
            .ends_with(".d.ts")
    {
        for ext in ["js", "js.map"] {
            let sibling = ts_path.with_extension(ext);
            if sibling.is_file() {
                fs::remove_file(&sibling)?;
            }
        }
    }
    Ok(())
}

/// Sweeps the whole project for compiled `.js` files shadowed by a
/// same-stem `.ts`, and removes them.
pub fn clean_js(cwd: &Path) -> DtsgenResult<Vec<PathBuf>> {
    let matcher = build_matcher(cwd, "**/*.ts")?;
    let mut removed = Vec::new();
    for entry in WalkBuilder::new(cwd).standard_filters(false).build() {
        let entry = entry?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if !matcher.matched(entry.path(), false).is_whitelist() {
            continue;
        }
        let js = entry.path().with_extension("js");
        if js.is_file() {
            fs::remove_file(&js)?;
            let map = entry.path().with_extension("js.map");
            if map.is_file() {
                fs::remove_file(&map)?;
            }
            removed.push(js);
        }
    }
    Ok(removed)
}

/// Writes a default `tsconfig.json` unless one exists.
pub fn write_tsconfig(cwd: &Path) -> DtsgenResult<bool> {
    let path = cwd.join("tsconfig.json");
    if path.exists() {
        return Ok(false);
    }
    let value = serde_json::json!({
        "compilerOptions": {
            "target": "es2017",
            "module": "commonjs",
            "strict": true,
            "noImplicitAny": false,
            "experimentalDecorators": true,
            "emitDecoratorMetadata": true,
            "inlineSourceMap": true,
            "importHelpers": true,
            "pretty": true,
            "allowJs": false,
            "noEmitOnError": false,
            "skipLibCheck": true,
            "skipDefaultLibCheck": true,
            "charset": "utf8",
            "allowSyntheticDefaultImports": true,
            "baseUrl": ".",
            "paths": { "*": ["*", "typings/*"] }
        }
    });
    write_file(&path, &format!("{}\n", serde_json::to_string_pretty(&value)?))?;
    Ok(true)
}

/// Writes a default `jsconfig.json` unless one exists.
pub fn write_jsconfig(cwd: &Path) -> DtsgenResult<bool> {
    let path = cwd.join("jsconfig.json");
    if path.exists() {
        return Ok(false);
    }
    let value = serde_json::json!({
        "include": ["**/*"],
        "compilerOptions": {
            "target": "es2017",
            "module": "commonjs",
            "checkJs": true,
            "allowSyntheticDefaultImports": true,
            "baseUrl": ".",
            "paths": { "*": ["*", "typings/*"] }
        }
    });
    write_file(&path, &format!("{}\n", serde_json::to_string_pretty(&value)?))?;
    Ok(true)
}

/// Progress line on stdout, suppressed in silent mode by callers.
pub fn log(message: &str) {
    println!("[dtsgen] {message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export default {};\n").unwrap();
    }

    #[test]
    fn test_load_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.ts"));
        touch(&dir.path().join("a.ts"));
        touch(&dir.path().join("a.js")); // shadowed by a.ts
        touch(&dir.path().join("c.js"));
        touch(&dir.path().join("types.d.ts"));
        touch(&dir.path().join("sub/deep.ts"));
        let files = load_files(dir.path(), "**/*.{ts,js}").unwrap();
        assert_eq!(files, vec!["a.ts", "b.ts", "c.js", "sub/deep.ts"]);
    }

    #[test]
    fn test_load_files_missing_dir() {
        let files = load_files(Path::new("/nonexistent/nowhere"), "**/*.ts").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(
                Path::new("/proj/typings/app/controller"),
                Path::new("/proj/app/controller")
            ),
            "../../../app/controller"
        );
        assert_eq!(
            relative_path(Path::new("/proj/a"), Path::new("/proj/a")),
            "."
        );
    }

    #[test]
    fn test_import_line() {
        let line = import_line(
            Path::new("/proj/typings/app/controller"),
            Path::new("/proj/app/controller/foo.ts"),
            "ExportFoo",
            false,
        );
        assert_eq!(line, "import ExportFoo from '../../../app/controller/foo';");

        let star = import_line(
            Path::new("/proj/typings/config"),
            Path::new("/proj/config/config.default.ts"),
            "ExportConfigDefault",
            true,
        );
        assert_eq!(
            star,
            "import * as ExportConfigDefault from '../../config/config.default';"
        );
    }

    #[test]
    fn test_write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/nested/index.d.ts");
        write_file(&path, "declare module 'egg' {}\n").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "declare module 'egg' {}\n"
        );
    }

    #[test]
    fn test_remove_same_name_js() {
        let dir = tempfile::tempdir().unwrap();
        let ts = dir.path().join("app.ts");
        touch(&ts);
        touch(&dir.path().join("app.js"));
        remove_same_name_js(&ts).unwrap();
        assert!(!dir.path().join("app.js").exists());
        assert!(ts.exists());
    }

    #[test]
    fn test_clean_js_sweep() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.ts"));
        touch(&dir.path().join("a.js"));
        touch(&dir.path().join("solo.js"));
        let removed = clean_js(dir.path()).unwrap();
        assert_eq!(removed.len(), 1);
        assert!(!dir.path().join("a.js").exists());
        assert!(dir.path().join("solo.js").exists());
    }

    #[test]
    fn test_write_tsconfig_once() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_tsconfig(dir.path()).unwrap());
        assert!(!write_tsconfig(dir.path()).unwrap());
        let raw = fs::read_to_string(dir.path().join("tsconfig.json")).unwrap();
        assert!(raw.contains("\"strict\": true"));
    }
}

use std::path::Path;

use proptest::prelude::*;

use dtsgen::config::{Config, WatchDirConfig};
use dtsgen::generators::{ClassGenerator, Generator, GeneratorContext};
use dtsgen::mapper::{camel_prop, format_prop, module_path, CaseStyle};
use dtsgen::resolver::{lexer::lex, resolve_exports};

proptest! {
    #[test]
    fn prop_format_prop_never_grows(prop in "[a-zA-Z0-9._-]{0,32}") {
        prop_assert!(format_prop(&prop).len() <= prop.len());
    }

    #[test]
    fn prop_case_style_fixes_first_char(prop in "[a-zA-Z][a-zA-Z0-9._-]{0,32}") {
        let lower = camel_prop(&prop, &CaseStyle::Lower);
        prop_assert!(lower.chars().next().unwrap().is_ascii_lowercase());
        let upper = camel_prop(&prop, &CaseStyle::Upper);
        prop_assert!(upper.chars().next().unwrap().is_ascii_uppercase());
        // the two styles agree on everything but the first character
        prop_assert_eq!(&lower[1..], &upper[1..]);
    }

    #[test]
    fn prop_module_name_concatenates_segments(
        segs in prop::collection::vec("[a-z][a-z0-9]{0,8}", 1..4)
    ) {
        let file = format!("{}.ts", segs.join("/"));
        let path = module_path(&file);
        prop_assert_eq!(path.props.len(), segs.len());
        let expected: String = segs
            .iter()
            .map(|s| camel_prop(s, &CaseStyle::Upper))
            .collect();
        prop_assert_eq!(path.module_name, expected);
    }

    #[test]
    fn prop_lexer_spans_are_ordered(src in "[ -~\\n]{0,200}") {
        if let Ok(tokens) = lex(&src) {
            let mut prev_end = 0;
            for token in &tokens {
                prop_assert!(token.start >= prev_end);
                prop_assert!(token.end <= src.len());
                prop_assert!(token.start < token.end);
                prev_end = token.end;
            }
        }
    }

    #[test]
    fn prop_resolver_terminates_on_noise(src in "[a-z =.;{}\\n]{0,120}") {
        // parse failures are fine, hangs and panics are not
        let _ = resolve_exports(&src);
    }

    #[test]
    fn prop_class_generator_is_deterministic(
        files in prop::collection::btree_set("[a-z][a-z0-9]{0,6}(/[a-z][a-z0-9]{0,6})?\\.ts", 1..6)
    ) {
        let files: Vec<String> = files.into_iter().collect();
        let options = WatchDirConfig {
            path: "app/controller".to_string(),
            interface: Some("IController".to_string()),
            ..Default::default()
        };
        let ctx = GeneratorContext {
            file: None,
            dir: Path::new("/proj/app/controller"),
            dts_dir: Path::new("/proj/typings/app/controller"),
            file_list: &files,
            options: &options,
        };
        let base = Config::default();
        let generator = ClassGenerator::new();
        let first = generator.generate(&ctx, &base).unwrap();
        let second = generator.generate(&ctx, &base).unwrap();
        prop_assert_eq!(first.content, second.content);
    }
}

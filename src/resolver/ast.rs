//! Root-scope statement parsing.
//!
//! A deliberately shallow parse: the file is split into its top-level
//! statements and each statement's value expressions are captured as spans
//! with a coarse classification. Bodies of functions, classes and nested
//! blocks are skipped, not descended into, which is exactly the granularity
//! export discovery needs.

use crate::error::DtsgenResult;

use super::lexer::{lex, Token, TokenKind};

/// Coarse classification of a captured value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// A bare identifier reference, subject to alias resolution.
    Ident(String),
    /// An object literal.
    Object,
    /// A `function` expression or declaration.
    Function,
    /// An arrow function.
    Arrow,
    /// A `class` expression or declaration.
    Class,
    /// A string/number/template/boolean/null literal.
    Literal,
    /// Anything else.
    Other,
}

/// A captured value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Verbatim source text of the expression.
    pub text: String,
    /// Top-level properties, for object literals.
    pub properties: Vec<Property>,
}

/// One property of an object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: Expr,
}

/// One variable binding inside a `const`/`let`/`var` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBinding {
    /// `None` for destructuring patterns.
    pub name: Option<String>,
    pub init: Option<Expr>,
}

/// A root-scope statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `const`/`let`/`var`, possibly exported.
    Var { exported: bool, bindings: Vec<VarBinding> },
    /// A named declaration (function, class, interface, type, enum, ...),
    /// possibly exported and/or default.
    Decl {
        exported: bool,
        default: bool,
        name: Option<String>,
        value: Expr,
    },
    /// `export default <expr>`
    ExportDefault { value: Expr },
    /// `export = <expr>` (TS export assignment)
    ExportAssign { value: Expr },
    /// Simple assignment: `a = x`, `exports.a = x`, `module.exports = x`.
    /// The target is the dotted identifier path.
    Assign { target: Vec<String>, value: Expr },
    /// Anything else at root scope; ignored by the resolver.
    Other,
}

/// A parsed module: the ordered root-scope statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub statements: Vec<Statement>,
}

/// Traversal control returned by [`walk`] visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Descend into the node's children.
    Into,
    /// Skip the node's children.
    Over,
}

/// A node handed to a [`walk`] visitor.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Statement(&'a Statement),
    Expr(&'a Expr),
}

/// Visits every statement and, when the visitor asks to descend, its value
/// expressions and object-literal properties.
pub fn walk<F: FnMut(Node<'_>) -> Step>(file: &SourceFile, visit: &mut F) {
    for stmt in &file.statements {
        if visit(Node::Statement(stmt)) == Step::Over {
            continue;
        }
        match stmt {
            Statement::Var { bindings, .. } => {
                for b in bindings {
                    if let Some(init) = &b.init {
                        walk_expr(init, visit);
                    }
                }
            }
            Statement::Decl { value, .. }
            | Statement::ExportDefault { value }
            | Statement::ExportAssign { value }
            | Statement::Assign { value, .. } => walk_expr(value, visit),
            Statement::Other => {}
        }
    }
}

fn walk_expr<F: FnMut(Node<'_>) -> Step>(expr: &Expr, visit: &mut F) {
    if visit(Node::Expr(expr)) == Step::Over {
        return;
    }
    for prop in &expr.properties {
        walk_expr(&prop.value, visit);
    }
}

/// Parses module source text into its root-scope statements.
pub fn parse(src: &str) -> DtsgenResult<SourceFile> {
    let tokens = lex(src)?;
    let mut parser = Parser {
        src,
        tokens,
        pos: 0,
    };
    Ok(parser.parse_file())
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse_file(&mut self) -> SourceFile {
        let mut statements = Vec::new();
        while self.pos < self.tokens.len() {
            if self.at(";") {
                self.pos += 1;
                continue;
            }
            let before = self.pos;
            let stmt = self.parse_statement();
            if self.pos == before {
                // never get stuck on input we do not understand
                self.pos += 1;
            }
            statements.push(stmt);
        }
        SourceFile { statements }
    }

    fn parse_statement(&mut self) -> Statement {
        let exported = self.eat("export");
        if exported && self.at("=") {
            self.pos += 1;
            let value = self.parse_expr(true);
            self.eat(";");
            return Statement::ExportAssign { value };
        }
        if exported && (self.at("{") || self.at("*")) {
            // re-export lists carry no value expression
            self.parse_expr(false);
            self.eat(";");
            return Statement::Other;
        }
        let default = exported && self.eat("default");

        match self.cur_text() {
            Some("const") | Some("let") | Some("var") => self.parse_var(exported),
            Some("function") => {
                let (name, value) = self.parse_function();
                Statement::Decl {
                    exported,
                    default,
                    name,
                    value,
                }
            }
            Some("async") if self.text_at(1) == Some("function") => {
                let (name, value) = self.parse_function();
                Statement::Decl {
                    exported,
                    default,
                    name,
                    value,
                }
            }
            Some("class") => {
                let (name, value) = self.parse_class();
                Statement::Decl {
                    exported,
                    default,
                    name,
                    value,
                }
            }
            Some("interface") | Some("enum") | Some("namespace")
                if matches!(self.kind_at(1), Some(TokenKind::Ident)) =>
            {
                let start = self.pos;
                self.pos += 1;
                let name = self.cur_text().map(str::to_string);
                self.pos += 1;
                self.skip_type(&["{"]);
                self.skip_balanced();
                self.braced_decl(exported, name, start)
            }
            Some("type") if matches!(self.kind_at(1), Some(TokenKind::Ident)) => {
                let start = self.pos;
                self.pos += 1;
                let name = self.cur_text().map(str::to_string);
                self.pos += 1;
                if self.at("<") {
                    self.skip_angle();
                }
                if !self.eat("=") {
                    // `type` used as a plain identifier
                    self.pos = start;
                    return self.parse_expr_statement();
                }
                self.skip_type(&[";"]);
                self.eat(";");
                self.braced_decl(exported, name, start)
            }
            Some("import") | Some("declare") => {
                self.parse_expr(false);
                self.eat(";");
                Statement::Other
            }
            _ if default => {
                let value = self.parse_expr(true);
                self.eat(";");
                Statement::ExportDefault { value }
            }
            _ => self.parse_expr_statement(),
        }
    }

    fn braced_decl(&mut self, exported: bool, name: Option<String>, start: usize) -> Statement {
        if exported {
            Statement::Decl {
                exported,
                default: false,
                name,
                value: Expr {
                    kind: ExprKind::Other,
                    text: self.span_from(start),
                    properties: Vec::new(),
                },
            }
        } else {
            Statement::Other
        }
    }

    fn parse_expr_statement(&mut self) -> Statement {
        if let Some(target) = self.try_assign_target() {
            let value = self.parse_expr(true);
            self.eat(";");
            return Statement::Assign { target, value };
        }
        self.parse_expr(false);
        self.eat(";");
        Statement::Other
    }

    /// `ident ('.' ident)* '='`, or nothing (position restored).
    fn try_assign_target(&mut self) -> Option<Vec<String>> {
        let save = self.pos;
        let mut target = Vec::new();
        loop {
            match self.peek(0) {
                Some(tok) if tok.kind == TokenKind::Ident => {
                    target.push(tok.text(self.src).to_string());
                    self.pos += 1;
                }
                _ => {
                    self.pos = save;
                    return None;
                }
            }
            if self.at(".") {
                self.pos += 1;
                continue;
            }
            break;
        }
        if self.at("=") {
            self.pos += 1;
            Some(target)
        } else {
            self.pos = save;
            None
        }
    }

    fn parse_var(&mut self, exported: bool) -> Statement {
        self.pos += 1; // const / let / var
        let mut bindings = Vec::new();
        loop {
            let name = if self.at("[") || self.at("{") {
                self.skip_balanced();
                None
            } else if matches!(self.kind_at(0), Some(TokenKind::Ident)) {
                let name = self.cur_text().map(str::to_string);
                self.pos += 1;
                name
            } else {
                break;
            };
            self.eat("!");
            if self.eat(":") {
                self.skip_type(&["=", ",", ";"]);
            }
            let init = if self.eat("=") {
                Some(self.parse_expr(true))
            } else {
                None
            };
            bindings.push(VarBinding { name, init });
            if !self.eat(",") {
                break;
            }
        }
        self.eat(";");
        Statement::Var { exported, bindings }
    }

    /// Parses an expression. When `stop_at_comma` is false, top-level commas
    /// are consumed too (used for discarding whole statements).
    fn parse_expr(&mut self, stop_at_comma: bool) -> Expr {
        if self.at("{") {
            return self.parse_object();
        }
        if self.at("function") || (self.at("async") && self.text_at(1) == Some("function")) {
            return self.parse_function().1;
        }
        if self.at("class") {
            return self.parse_class().1;
        }

        let start = self.pos;
        let mut depth = 0i32;
        let mut saw_arrow = false;
        while let Some(tok) = self.peek(0) {
            if depth == 0 && self.pos > start && tok.newline_before && self.asi_break() {
                break;
            }
            let text = tok.text(self.src);
            if tok.kind == TokenKind::Punct {
                match text {
                    ";" if depth == 0 => break,
                    "," if depth == 0 && stop_at_comma => break,
                    ")" | "]" | "}" if depth == 0 => break,
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => depth -= 1,
                    "=>" if depth == 0 => saw_arrow = true,
                    _ => {}
                }
            }
            self.pos += 1;
        }

        let end = self.pos;
        let text = self.span(start, end);
        let kind = if saw_arrow {
            ExprKind::Arrow
        } else if end == start + 1 {
            let tok = self.tokens[start];
            match tok.kind {
                TokenKind::Ident => match tok.text(self.src) {
                    "true" | "false" | "null" | "undefined" => ExprKind::Literal,
                    name => ExprKind::Ident(name.to_string()),
                },
                TokenKind::Str | TokenKind::Num | TokenKind::Template => ExprKind::Literal,
                TokenKind::Punct => ExprKind::Other,
            }
        } else {
            ExprKind::Other
        };
        Expr {
            kind,
            text,
            properties: Vec::new(),
        }
    }

    /// Statement-boundary heuristic at a newline: continue only when the
    /// previous token is an operator or when the next one chains onto the
    /// expression.
    fn asi_break(&self) -> bool {
        let cur = self.tokens[self.pos];
        let prev = self.tokens[self.pos - 1];
        let prev_continues = prev.kind == TokenKind::Punct
            && !matches!(prev.text(self.src), ")" | "]" | "}");
        let cur_continues = cur.kind == TokenKind::Punct
            && matches!(
                cur.text(self.src),
                "." | "?."
                    | "+" | "-" | "*" | "/" | "%"
                    | "==" | "===" | "!=" | "!=="
                    | "<" | "<=" | ">" | ">="
                    | "&&" | "||" | "??" | "?" | ":"
                    | "=" | "=>"
            );
        !(prev_continues || cur_continues)
    }

    fn parse_object(&mut self) -> Expr {
        let start = self.pos;
        self.pos += 1; // {
        let mut properties = Vec::new();
        loop {
            while self.eat(",") {}
            if self.at("}") || self.peek(0).is_none() {
                break;
            }
            if self.eat("...") {
                self.parse_expr(true);
                continue;
            }
            // property name, possibly preceded by get/set/async/* modifiers
            let mut name: Option<String> = None;
            loop {
                let Some(tok) = self.peek(0) else { break };
                let text = tok.text(self.src);
                match text {
                    ":" | "(" | "," | "}" => break,
                    "[" => {
                        self.skip_balanced();
                        name = None;
                    }
                    _ if matches!(
                        tok.kind,
                        TokenKind::Ident | TokenKind::Str | TokenKind::Num
                    ) =>
                    {
                        name = Some(strip_quotes(text));
                        self.pos += 1;
                    }
                    _ => self.pos += 1,
                }
            }
            if self.eat(":") {
                let value = self.parse_expr(true);
                if let Some(name) = name {
                    properties.push(Property { name, value });
                }
            } else if self.at("(") {
                let method_start = self.pos;
                self.skip_balanced(); // params
                if self.eat(":") {
                    self.skip_type(&["{", ",", "}"]);
                }
                if self.at("{") {
                    self.skip_balanced();
                }
                if let Some(name) = name {
                    properties.push(Property {
                        name,
                        value: Expr {
                            kind: ExprKind::Function,
                            text: self.span_from(method_start),
                            properties: Vec::new(),
                        },
                    });
                }
            } else if let Some(name) = name {
                // shorthand
                properties.push(Property {
                    name: name.clone(),
                    value: Expr {
                        kind: ExprKind::Ident(name),
                        text: String::new(),
                        properties: Vec::new(),
                    },
                });
            }
        }
        self.eat("}");
        Expr {
            kind: ExprKind::Object,
            text: self.span_from(start),
            properties,
        }
    }

    fn parse_function(&mut self) -> (Option<String>, Expr) {
        let start = self.pos;
        self.eat("async");
        self.eat("function");
        self.eat("*");
        let name = if matches!(self.kind_at(0), Some(TokenKind::Ident)) {
            let name = self.cur_text().map(str::to_string);
            self.pos += 1;
            name
        } else {
            None
        };
        if self.at("<") {
            self.skip_angle();
        }
        if self.at("(") {
            self.skip_balanced();
        }
        if self.eat(":") {
            self.skip_type(&["{", ";", ","]);
        }
        if self.at("{") {
            self.skip_balanced();
        }
        (
            name,
            Expr {
                kind: ExprKind::Function,
                text: self.span_from(start),
                properties: Vec::new(),
            },
        )
    }

    fn parse_class(&mut self) -> (Option<String>, Expr) {
        let start = self.pos;
        self.eat("class");
        let name = if matches!(self.kind_at(0), Some(TokenKind::Ident))
            && !self.at("extends")
            && !self.at("implements")
        {
            let name = self.cur_text().map(str::to_string);
            self.pos += 1;
            name
        } else {
            None
        };
        self.skip_type(&["{"]);
        if self.at("{") {
            self.skip_balanced();
        }
        (
            name,
            Expr {
                kind: ExprKind::Class,
                text: self.span_from(start),
                properties: Vec::new(),
            },
        )
    }

    /// Consumes a balanced bracket group starting at the current opener.
    fn skip_balanced(&mut self) {
        let mut depth = 0i32;
        while let Some(tok) = self.peek(0) {
            match tok.text(self.src) {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth -= 1,
                _ => {}
            }
            self.pos += 1;
            if depth <= 0 {
                break;
            }
        }
    }

    /// Consumes a type annotation until one of `stops` at the outermost
    /// level. Angle brackets nest, so commas and braces inside generics do
    /// not terminate the annotation.
    fn skip_type(&mut self, stops: &[&str]) {
        let mut depth = 0i32;
        let mut angle = 0i32;
        while let Some(tok) = self.peek(0) {
            let text = tok.text(self.src);
            if depth == 0 && angle == 0 && stops.contains(&text) {
                break;
            }
            match text {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                "<" | "<<" if depth == 0 => angle += text.len() as i32,
                t if depth == 0 && !t.is_empty() && t.bytes().all(|b| b == b'>') => {
                    angle -= t.len() as i32;
                    if angle < 0 {
                        angle = 0;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Consumes a `<...>` generic parameter group.
    fn skip_angle(&mut self) {
        let mut depth = 0i32;
        let mut angle = 0i32;
        while let Some(tok) = self.peek(0) {
            let text = tok.text(self.src);
            match text {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth -= 1,
                "<" | "<<" if depth == 0 => angle += text.len() as i32,
                t if depth == 0 && !t.is_empty() && t.bytes().all(|b| b == b'>') => {
                    angle -= t.len() as i32;
                }
                _ => {}
            }
            self.pos += 1;
            if angle <= 0 {
                break;
            }
        }
    }

    fn peek(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).copied()
    }

    fn kind_at(&self, n: usize) -> Option<TokenKind> {
        self.peek(n).map(|t| t.kind)
    }

    fn cur_text(&self) -> Option<&'a str> {
        self.peek(0).map(|t| t.text(self.src))
    }

    fn text_at(&self, n: usize) -> Option<&'a str> {
        self.peek(n).map(|t| t.text(self.src))
    }

    fn at(&self, s: &str) -> bool {
        self.cur_text() == Some(s)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.at(s) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn span(&self, start: usize, end: usize) -> String {
        if end <= start {
            return String::new();
        }
        self.src[self.tokens[start].start..self.tokens[end - 1].end].to_string()
    }

    fn span_from(&self, start: usize) -> String {
        self.span(start, self.pos)
    }
}

fn strip_quotes(text: &str) -> String {
    let t = text.trim_matches(|c| c == '\'' || c == '"');
    t.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> SourceFile {
        parse(src).expect("parse")
    }

    #[test]
    fn test_parse_var_with_object_init() {
        let file = parse_ok("const x = { f: 1 };");
        let Statement::Var { exported, bindings } = &file.statements[0] else {
            panic!("expected var, got {:?}", file.statements[0]);
        };
        assert!(!exported);
        assert_eq!(bindings[0].name.as_deref(), Some("x"));
        let init = bindings[0].init.as_ref().unwrap();
        assert_eq!(init.kind, ExprKind::Object);
        assert_eq!(init.properties[0].name, "f");
    }

    #[test]
    fn test_parse_export_default_ident() {
        let file = parse_ok("export default x;");
        assert_eq!(
            file.statements[0],
            Statement::ExportDefault {
                value: Expr {
                    kind: ExprKind::Ident("x".to_string()),
                    text: "x".to_string(),
                    properties: Vec::new(),
                }
            }
        );
    }

    #[test]
    fn test_parse_export_default_function() {
        let file = parse_ok("export default function() { return 1; }");
        let Statement::Decl {
            exported,
            default,
            name,
            value,
        } = &file.statements[0]
        else {
            panic!("expected decl");
        };
        assert!(*exported && *default);
        assert!(name.is_none());
        assert_eq!(value.kind, ExprKind::Function);
    }

    #[test]
    fn test_parse_module_exports_assignment() {
        let file = parse_ok("module.exports = { a: 1 };");
        let Statement::Assign { target, value } = &file.statements[0] else {
            panic!("expected assign");
        };
        assert_eq!(target, &["module", "exports"]);
        assert_eq!(value.kind, ExprKind::Object);
    }

    #[test]
    fn test_parse_export_assignment() {
        let file = parse_ok("export = config;");
        assert!(matches!(
            &file.statements[0],
            Statement::ExportAssign { value } if value.kind == ExprKind::Ident("config".to_string())
        ));
    }

    #[test]
    fn test_parse_multi_binding() {
        let file = parse_ok("export const a = 1, b = () => 2;");
        let Statement::Var { exported, bindings } = &file.statements[0] else {
            panic!("expected var");
        };
        assert!(exported);
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].init.as_ref().unwrap().kind, ExprKind::Literal);
        assert_eq!(bindings[1].init.as_ref().unwrap().kind, ExprKind::Arrow);
    }

    #[test]
    fn test_parse_typed_binding() {
        let file = parse_ok("const m: Map<string, number> = new Map();");
        let Statement::Var { bindings, .. } = &file.statements[0] else {
            panic!("expected var");
        };
        assert_eq!(bindings[0].name.as_deref(), Some("m"));
        assert_eq!(bindings[0].init.as_ref().unwrap().kind, ExprKind::Other);
    }

    #[test]
    fn test_parse_class_declaration() {
        let file = parse_ok("class Foo extends Bar { baz() { return 1; } }");
        let Statement::Decl { name, value, .. } = &file.statements[0] else {
            panic!("expected decl");
        };
        assert_eq!(name.as_deref(), Some("Foo"));
        assert_eq!(value.kind, ExprKind::Class);
    }

    #[test]
    fn test_parse_asi_two_statements() {
        let file = parse_ok("const a = 1\nmodule.exports = a");
        assert_eq!(file.statements.len(), 2);
        assert!(matches!(&file.statements[1], Statement::Assign { .. }));
    }

    #[test]
    fn test_object_method_and_shorthand() {
        let file = parse_ok("const o = { go() { return 1; }, short, key: 'v' };");
        let Statement::Var { bindings, .. } = &file.statements[0] else {
            panic!("expected var");
        };
        let init = bindings[0].init.as_ref().unwrap();
        let names: Vec<&str> = init.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["go", "short", "key"]);
        assert_eq!(init.properties[0].value.kind, ExprKind::Function);
        assert_eq!(
            init.properties[1].value.kind,
            ExprKind::Ident("short".to_string())
        );
        assert_eq!(init.properties[2].value.kind, ExprKind::Literal);
    }

    #[test]
    fn test_walk_root_only() {
        let file = parse_ok("const a = { b: { c: 1 } };\nexports.d = 2;");
        let mut statements = 0;
        let mut exprs = 0;
        walk(&file, &mut |node| match node {
            Node::Statement(_) => {
                statements += 1;
                Step::Into
            }
            Node::Expr(_) => {
                exprs += 1;
                Step::Over
            }
        });
        assert_eq!(statements, 2);
        // one expr per statement, none of their children
        assert_eq!(exprs, 2);
    }
}

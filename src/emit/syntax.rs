//! Declaration records and the formatting pass that renders them.
//!
//! Generators build a list of [`Item`]s; [`render_items`] turns them into
//! source text in one pass. Keeping the two apart means formatting can
//! change without touching set computation.

const INDENT: &str = "    ";

/// Strict and reserved keywords that need the raw identifier form (`crate`,
/// `self`, `Self` and `super` have none and are left alone).
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Escape a name as a raw identifier when it collides with a keyword.
pub fn ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

/// Render a string as an escaped Rust string literal.
pub fn string_literal(value: &str) -> String {
    format!("{:?}", value)
}

/// A named, typed value: struct field or function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub ty: String,
}

impl Binding {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Binding {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// A function or method declaration with its body lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    pub doc: Option<String>,
    pub public: bool,
    pub name: String,
    pub generics: Option<String>,
    /// Takes `&self` as first parameter
    pub receiver: bool,
    pub params: Vec<Binding>,
    pub returns: Option<String>,
    /// Statements and tail expression, one per line
    pub body: Vec<String>,
}

impl Function {
    /// Create a private free function.
    pub fn new(name: impl Into<String>) -> Self {
        Function {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a `&self` method.
    pub fn method(name: impl Into<String>) -> Self {
        Function {
            name: name.into(),
            receiver: true,
            ..Default::default()
        }
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Struct {
        doc: Option<String>,
        public: bool,
        name: String,
        fields: Vec<Binding>,
    },

    Function(Function),

    /// `impl Trait for Target`
    Impl {
        trait_name: String,
        target: String,
        functions: Vec<Function>,
    },
}

/// Render items separated by blank lines.
pub fn render_items(items: &[Item]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_item(&mut out, item);
    }
    out
}

fn render_item(out: &mut String, item: &Item) {
    match item {
        Item::Struct {
            doc,
            public,
            name,
            fields,
        } => {
            render_doc(out, doc.as_deref(), "");
            let vis = if *public { "pub " } else { "" };
            if fields.is_empty() {
                out.push_str(&format!("{}struct {};\n", vis, name));
                return;
            }
            out.push_str(&format!("{}struct {} {{\n", vis, name));
            for field in fields {
                out.push_str(&format!("{}{}: {},\n", INDENT, ident(&field.name), field.ty));
            }
            out.push_str("}\n");
        }

        Item::Function(function) => render_function(out, function, ""),

        Item::Impl {
            trait_name,
            target,
            functions,
        } => {
            out.push_str(&format!("impl {} for {} {{\n", trait_name, target));
            for (i, function) in functions.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                render_function(out, function, INDENT);
            }
            out.push_str("}\n");
        }
    }
}

fn render_function(out: &mut String, function: &Function, indent: &str) {
    render_doc(out, function.doc.as_deref(), indent);

    let mut params = Vec::new();
    if function.receiver {
        params.push("&self".to_string());
    }
    params.extend(
        function
            .params
            .iter()
            .map(|p| format!("{}: {}", ident(&p.name), p.ty)),
    );

    out.push_str(&format!(
        "{}{}fn {}{}({})",
        indent,
        if function.public { "pub " } else { "" },
        ident(&function.name),
        function.generics.as_deref().unwrap_or(""),
        params.join(", ")
    ));
    if let Some(ret) = &function.returns {
        out.push_str(" -> ");
        out.push_str(ret);
    }
    out.push_str(" {\n");
    for line in &function.body {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("{}{}{}\n", indent, INDENT, line));
        }
    }
    out.push_str(&format!("{}}}\n", indent));
}

fn render_doc(out: &mut String, doc: Option<&str>, indent: &str) {
    let Some(doc) = doc else {
        return;
    };
    for line in doc.lines() {
        if line.is_empty() {
            out.push_str(&format!("{}///\n", indent));
        } else {
            out.push_str(&format!("{}/// {}\n", indent, line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ident_escapes_keywords() {
        assert_eq!(ident("type"), "r#type");
        assert_eq!(ident("title"), "title");
        for reserved in ["abstract", "become", "do", "final", "gen", "macro", "override", "priv"] {
            assert_eq!(ident(reserved), format!("r#{}", reserved));
        }
        assert_eq!(ident("typeof"), "r#typeof");
        assert_eq!(ident("unsized"), "r#unsized");
        assert_eq!(ident("virtual"), "r#virtual");
        assert_eq!(ident("self"), "self");
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("say \"hi\"\n"), r#""say \"hi\"\n""#);
    }

    #[test]
    fn test_render_struct_and_impl() {
        let mut method = Function::method("title");
        method.returns = Some("String".to_string());
        method.body = vec!["self.inner.title()".to_string()];

        let items = vec![
            Item::Struct {
                doc: Some("Wraps a page.".to_string()),
                public: false,
                name: "Wrapper".to_string(),
                fields: vec![Binding::new("inner", "Box<dyn Page>")],
            },
            Item::Impl {
                trait_name: "Page".to_string(),
                target: "Wrapper".to_string(),
                functions: vec![method],
            },
        ];

        let expected = "\
/// Wraps a page.
struct Wrapper {
    inner: Box<dyn Page>,
}

impl Page for Wrapper {
    fn title(&self) -> String {
        self.inner.title()
    }
}
";
        assert_eq!(render_items(&items), expected);
    }

    #[test]
    fn test_render_free_function() {
        let mut f = Function::new("new_wrapper");
        f.public = true;
        f.generics = Some("<T: Page>".to_string());
        f.params = vec![Binding::new("p", "T")];
        f.returns = Some("Wrapper<T>".to_string());
        f.body = vec!["Wrapper { p }".to_string()];

        let expected = "\
pub fn new_wrapper<T: Page>(p: T) -> Wrapper<T> {
    Wrapper { p }
}
";
        assert_eq!(render_items(&[Item::Function(f)]), expected);
    }

    #[test]
    fn test_render_unit_struct_with_paragraphs() {
        let items = vec![Item::Struct {
            doc: Some("first\n\nsecond".to_string()),
            public: true,
            name: "Marker".to_string(),
            fields: Vec::new(),
        }];
        assert_eq!(
            render_items(&items),
            "/// first\n///\n/// second\npub struct Marker;\n"
        );
    }
}

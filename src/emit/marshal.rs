//! Aggregating serializer generation.
//!
//! The generated function calls every getter of a receiver and writes the
//! results as one JSON object, in method set order. Recursion through
//! methods that lead back to the receiver is not detected here; exclude
//! such capabilities, name-exclude the methods, or enable the cycle check
//! in [`resolver::cycles`](crate::resolver::cycles).

use std::collections::HashSet;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::imports::ImportResolver;
use super::syntax::{ident, render_items, string_literal, Binding, Function, Item};
use super::unit::{EmissionUnit, UnitContext};
use crate::core::capability::{CapabilityRef, MethodDescriptor};
use crate::resolver::errors::GenerateError;
use crate::resolver::exclude::{NameExcluder, PatternExcluder};
use crate::resolver::method_set::MethodSet;

/// Name of the receiver parameter in generated functions.
const RECEIVER: &str = "p";

const BUFFER: &str = "buf";
const SERIALIZER: &str = "ser";
const DOCUMENT: &str = "doc";

/// Names the generated body declares besides the field locals.
const RESERVED_LOCALS: &[&str] = &[RECEIVER, BUFFER, SERIALIZER, DOCUMENT];

const ERROR_TYPE: &str = "Box<dyn std::error::Error + Send + Sync>";

const MANDATORY_IMPORTS: &[&str] = &["serde::ser::SerializeMap", "serde::ser::Serializer"];

/// How a method name becomes a field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyStyle {
    /// The method name as written
    #[default]
    Method,

    /// `last_mod` becomes `LastMod`
    Pascal,

    /// `last_mod` becomes `lastMod`
    Camel,
}

impl KeyStyle {
    pub fn apply(self, name: &str) -> String {
        match self {
            KeyStyle::Method => name.to_string(),
            KeyStyle::Pascal => to_pascal(name),
            KeyStyle::Camel => {
                let pascal = to_pascal(name);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

fn to_pascal(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

fn to_snake(name: &str) -> String {
    let mut out = String::new();
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// Settings for one serializer function.
#[derive(Debug, Clone)]
pub struct MarshalSpec {
    /// Generated function name
    pub function: String,

    /// Trait bound on the receiver
    pub receiver: CapabilityRef,

    /// Removed from method names before the key style is applied
    pub key_strip: Option<Regex>,

    pub key_style: KeyStyle,

    pub doc: Option<String>,
}

impl MarshalSpec {
    pub fn new(function: impl Into<String>, receiver: CapabilityRef) -> Self {
        MarshalSpec {
            function: function.into(),
            receiver,
            key_strip: None,
            key_style: KeyStyle::Method,
            doc: None,
        }
    }

    /// Strip matches of `pattern` from method names when deriving keys.
    pub fn with_key_strip(mut self, pattern: &str) -> Result<Self, GenerateError> {
        let regex = Regex::new(pattern).map_err(|source| GenerateError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.key_strip = Some(regex);
        Ok(self)
    }

    pub fn with_key_style(mut self, style: KeyStyle) -> Self {
        self.key_style = style;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Key written for the method named `name`.
    pub fn key_for(&self, name: &str) -> String {
        let stripped = match &self.key_strip {
            Some(regex) => regex.replace_all(name, "").into_owned(),
            None => name.to_string(),
        };
        let base = if stripped.is_empty() {
            name
        } else {
            stripped.as_str()
        };
        self.key_style.apply(base)
    }
}

/// One entry of the generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarshalField {
    pub key: String,
    pub method: String,

    /// Local variable holding the value
    pub local: String,

    /// The getter returns `Result` and is called with `?`
    pub fallible: bool,
}

/// Emits aggregating serializer units.
pub struct MarshalGenerator<'a> {
    spec: &'a MarshalSpec,
    names: Box<dyn NameExcluder + 'a>,
}

impl<'a> MarshalGenerator<'a> {
    pub fn new(spec: &'a MarshalSpec) -> Self {
        MarshalGenerator {
            spec,
            names: Box::new(PatternExcluder::empty()),
        }
    }

    /// Drop methods whose names match `names`.
    pub fn with_names(mut self, names: impl NameExcluder + 'a) -> Self {
        self.names = Box::new(names);
        self
    }

    /// The fields written for `set`, in order.
    pub fn fields(&self, set: &MethodSet) -> Result<Vec<MarshalField>, GenerateError> {
        let mut keys: IndexMap<String, &MethodDescriptor> = IndexMap::new();
        let mut locals: HashSet<String> = HashSet::new();
        let mut fields = Vec::new();

        for method in set {
            if !method.is_getter() {
                tracing::trace!("skipping {}: not a getter", method.name);
                continue;
            }
            if self.names.is_excluded(&method.name) {
                tracing::trace!("skipping {}: excluded by name", method.name);
                continue;
            }

            let key = self.spec.key_for(&method.name);
            if let Some(first) = keys.get(&key) {
                return Err(GenerateError::DuplicateFieldKey {
                    key,
                    first: first.name.clone(),
                    second: method.name.clone(),
                });
            }
            keys.insert(key.clone(), method);

            let mut local = to_snake(&method.name);
            while RESERVED_LOCALS.contains(&local.as_str()) || locals.contains(&local) {
                local.push('_');
            }
            locals.insert(local.clone());

            fields.push(MarshalField {
                key,
                method: method.name.clone(),
                local,
                fallible: method.returns[0].result_ok().is_some(),
            });
        }

        if fields.is_empty() {
            return Err(GenerateError::EmptyMethodSet {
                stage: format!("serializer `{}`", self.spec.function),
            });
        }

        Ok(fields)
    }

    /// Build the serializer function for `set`.
    pub fn function(&self, set: &MethodSet) -> Result<Function, GenerateError> {
        let fields = self.fields(set)?;

        let mut body = Vec::new();
        for field in &fields {
            body.push(format!(
                "let {} = {}.{}(){};",
                ident(&field.local),
                RECEIVER,
                ident(&field.method),
                if field.fallible { "?" } else { "" }
            ));
        }
        body.push(String::new());
        body.push(format!("let mut {} = Vec::new();", BUFFER));
        body.push(format!(
            "let mut {} = serde_json::Serializer::new(&mut {});",
            SERIALIZER, BUFFER
        ));
        body.push(format!(
            "let mut {} = (&mut {}).serialize_map(Some({}))?;",
            DOCUMENT,
            SERIALIZER,
            fields.len()
        ));
        for field in &fields {
            body.push(format!(
                "{}.serialize_entry({}, &{})?;",
                DOCUMENT,
                string_literal(&field.key),
                ident(&field.local)
            ));
        }
        body.push(format!("{}.end()?;", DOCUMENT));
        body.push(format!("Ok({})", BUFFER));

        let mut function = Function::new(self.spec.function.clone());
        function.doc = self.spec.doc.clone();
        function.public = true;
        function.generics = Some(format!("<T: {} + ?Sized>", self.spec.receiver.name));
        function.params = vec![Binding::new(RECEIVER, "&T")];
        function.returns = Some(format!("Result<Vec<u8>, {}>", ERROR_TYPE));
        function.body = body;
        Ok(function)
    }

    /// Generate the unit for `set`.
    ///
    /// Only the receiver trait and the serde traits are imported: methods are
    /// called through the generic bound and no value types are named.
    pub fn generate(
        &self,
        set: &MethodSet,
        context: &UnitContext,
    ) -> Result<EmissionUnit, GenerateError> {
        let function = self.function(set)?;

        let mut imports = ImportResolver::new(context.module.as_deref());
        for path in MANDATORY_IMPORTS {
            imports.add_path(*path);
        }
        if let Some(path) = self.spec.receiver.import_path() {
            imports.add_path(path);
        }

        tracing::debug!(
            "rendering serializer `{}` for `{}`",
            self.spec.function,
            self.spec.receiver.name
        );

        Ok(EmissionUnit::new(
            context,
            imports.finish()?,
            render_items(&[Item::Function(function)]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::MethodDecl;
    use crate::core::types::TypeRef;
    use pretty_assertions::assert_eq;

    fn getter(name: &str, ret: &str) -> MethodDescriptor {
        MethodDescriptor::from_decl(
            &MethodDecl::new(name).with_return(TypeRef::parse(ret).unwrap()),
            CapabilityRef::new("Page"),
        )
    }

    fn set(methods: Vec<MethodDescriptor>) -> MethodSet {
        let mut set = MethodSet::new();
        for method in methods {
            set.insert(method).unwrap();
        }
        set
    }

    fn spec() -> MarshalSpec {
        MarshalSpec::new(
            "marshal_page_to_json",
            CapabilityRef::new("Page").with_module("crate::page"),
        )
    }

    #[test]
    fn test_excluded_name_is_not_a_field() {
        let set = set(vec![getter("Title", "String"), getter("Weight", "i32")]);
        let spec = spec();
        let generator = MarshalGenerator::new(&spec)
            .with_names(PatternExcluder::new(["Weight"]).unwrap());

        let keys: Vec<String> = generator
            .fields(&set)
            .unwrap()
            .into_iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(keys, vec!["Title"]);
    }

    #[test]
    fn test_render_function() {
        let set = set(vec![
            getter("title", "String"),
            getter("p", "Box<dyn Page>"),
            getter("date", "Result<chrono::DateTime<chrono::Utc>, crate::Error>"),
            MethodDescriptor::from_decl(
                &MethodDecl::new("param").with_param(TypeRef::named("String")),
                CapabilityRef::new("Page"),
            ),
        ]);
        let spec = spec()
            .with_key_style(KeyStyle::Pascal)
            .with_doc("Serializes the page as JSON.");
        let unit = MarshalGenerator::new(&spec)
            .generate(&set, &UnitContext::new("", Some("crate::page".into())))
            .unwrap();

        let expected = r#"/// Serializes the page as JSON.
pub fn marshal_page_to_json<T: Page + ?Sized>(p: &T) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let title = p.title();
    let p_ = p.p();
    let date = p.date()?;

    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::new(&mut buf);
    let mut doc = (&mut ser).serialize_map(Some(3))?;
    doc.serialize_entry("Title", &title)?;
    doc.serialize_entry("P", &p_)?;
    doc.serialize_entry("Date", &date)?;
    doc.end()?;
    Ok(buf)
}
"#;
        assert_eq!(unit.body(), expected);
        assert_eq!(
            unit.imports().render(),
            "use {\n    serde::ser::SerializeMap,\n    serde::ser::Serializer,\n};\n"
        );
    }

    #[test]
    fn test_getters_named_like_body_locals() {
        let set = set(vec![
            getter("title", "String"),
            getter("doc", "String"),
            getter("buf", "Vec<u8>"),
            getter("ser", "u32"),
        ]);
        let spec = spec();
        let function = MarshalGenerator::new(&spec).function(&set).unwrap();

        assert_eq!(
            function.body,
            vec![
                "let title = p.title();",
                "let doc_ = p.doc();",
                "let buf_ = p.buf();",
                "let ser_ = p.ser();",
                "",
                "let mut buf = Vec::new();",
                "let mut ser = serde_json::Serializer::new(&mut buf);",
                "let mut doc = (&mut ser).serialize_map(Some(4))?;",
                "doc.serialize_entry(\"title\", &title)?;",
                "doc.serialize_entry(\"doc\", &doc_)?;",
                "doc.serialize_entry(\"buf\", &buf_)?;",
                "doc.serialize_entry(\"ser\", &ser_)?;",
                "doc.end()?;",
                "Ok(buf)",
            ]
        );
    }

    #[test]
    fn test_receiver_import_outside_its_module() {
        let set = set(vec![getter("title", "String")]);
        let spec = spec();
        let unit = MarshalGenerator::new(&spec)
            .generate(&set, &UnitContext::default())
            .unwrap();
        let imports: Vec<&str> = unit.imports().paths().collect();
        assert_eq!(
            imports,
            vec![
                "crate::page::Page",
                "serde::ser::SerializeMap",
                "serde::ser::Serializer",
            ]
        );
    }

    #[test]
    fn test_duplicate_keys() {
        let set = set(vec![getter("get_title", "String"), getter("title", "String")]);
        let spec = spec().with_key_strip("^get_").unwrap();
        let err = MarshalGenerator::new(&spec).fields(&set).unwrap_err();
        match err {
            GenerateError::DuplicateFieldKey { key, first, second } => {
                assert_eq!(key, "title");
                assert_eq!(first, "get_title");
                assert_eq!(second, "title");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_getters_is_empty() {
        let set = set(vec![
            getter("pair", "(String, i32)"),
            getter("nothing", "()"),
        ]);
        let spec = spec();
        let err = MarshalGenerator::new(&spec).fields(&set).unwrap_err();
        assert!(matches!(err, GenerateError::EmptyMethodSet { .. }));
    }

    #[test]
    fn test_key_strip_falls_back_to_name() {
        let spec = spec().with_key_strip("^get_").unwrap();
        assert_eq!(spec.key_for("get_"), "get_");
        assert_eq!(spec.key_for("get_title"), "title");
    }

    #[test]
    fn test_key_styles() {
        assert_eq!(KeyStyle::Method.apply("last_mod"), "last_mod");
        assert_eq!(KeyStyle::Pascal.apply("last_mod"), "LastMod");
        assert_eq!(KeyStyle::Camel.apply("last_mod"), "lastMod");
        assert_eq!(KeyStyle::Camel.apply("Title"), "title");
    }

    #[test]
    fn test_snake_locals() {
        assert_eq!(to_snake("LinkTitle"), "link_title");
        assert_eq!(to_snake("weight"), "weight");
        assert_eq!(to_snake("IsHTML"), "is_html");
    }
}

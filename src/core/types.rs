//! Type expressions used in capability method signatures.
//!
//! These types cover the subset of Rust type syntax that shows up in trait
//! method signatures: paths with generic arguments, references, slices,
//! tuples and trait objects. That is enough to render a signature and to
//! find every module path a generated file has to import.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolver::errors::GenerateError;

/// A parsed Rust type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// Named type, optionally qualified: `std::time::Duration`, `Vec<T>`
    Path {
        module: Option<String>,
        name: String,
        generics: Vec<TypeRef>,
    },

    /// `&T`, `&'a mut T`
    Ref {
        lifetime: Option<String>,
        mutable: bool,
        inner: Box<TypeRef>,
    },

    /// A lifetime argument or bound: `'static`
    Lifetime(String),

    /// `[T]`
    Slice(Box<TypeRef>),

    /// `(A, B)`; the unit type is the empty tuple
    Tuple(Vec<TypeRef>),

    /// `dyn A + B`
    Dyn(Vec<TypeRef>),
}

impl TypeRef {
    /// Parse a type expression.
    pub fn parse(text: &str) -> Result<Self, GenerateError> {
        let mut parser = TypeParser::new(text);
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if !parser.rest().is_empty() {
            return Err(parser.error(format!("unexpected `{}`", parser.rest())));
        }
        Ok(ty)
    }

    /// Create an unqualified path type without generics.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Path {
            module: None,
            name: name.into(),
            generics: Vec::new(),
        }
    }

    /// The unit type `()`.
    pub fn unit() -> Self {
        TypeRef::Tuple(Vec::new())
    }

    /// Check if this is the unit type.
    pub fn is_unit(&self) -> bool {
        matches!(self, TypeRef::Tuple(items) if items.is_empty())
    }

    /// Check if this is a tuple with at least one element.
    pub fn is_tuple(&self) -> bool {
        matches!(self, TypeRef::Tuple(items) if !items.is_empty())
    }

    /// The success type of a `Result<T, E>`, if this is one.
    pub fn result_ok(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Path { name, generics, .. } if name == "Result" => generics.first(),
            _ => None,
        }
    }

    /// Render with short names; imports bring qualified paths into scope.
    pub fn render(&self) -> String {
        self.render_with(false)
    }

    /// Render with every path fully qualified.
    pub fn qualified(&self) -> String {
        self.render_with(true)
    }

    fn render_with(&self, qualified: bool) -> String {
        match self {
            TypeRef::Path {
                module,
                name,
                generics,
            } => {
                let mut out = match module {
                    Some(module) if qualified => format!("{}::{}", module, name),
                    _ => name.clone(),
                };
                if !generics.is_empty() {
                    let args: Vec<String> =
                        generics.iter().map(|g| g.render_with(qualified)).collect();
                    out.push('<');
                    out.push_str(&args.join(", "));
                    out.push('>');
                }
                out
            }
            TypeRef::Ref {
                lifetime,
                mutable,
                inner,
            } => {
                let mut out = String::from("&");
                if let Some(lifetime) = lifetime {
                    out.push('\'');
                    out.push_str(lifetime);
                    out.push(' ');
                }
                if *mutable {
                    out.push_str("mut ");
                }
                out.push_str(&inner.render_with(qualified));
                out
            }
            TypeRef::Lifetime(name) => format!("'{}", name),
            TypeRef::Slice(inner) => format!("[{}]", inner.render_with(qualified)),
            TypeRef::Tuple(items) if items.len() == 1 => {
                format!("({},)", items[0].render_with(qualified))
            }
            TypeRef::Tuple(items) => {
                let items: Vec<String> = items.iter().map(|i| i.render_with(qualified)).collect();
                format!("({})", items.join(", "))
            }
            TypeRef::Dyn(bounds) => {
                let bounds: Vec<String> =
                    bounds.iter().map(|b| b.render_with(qualified)).collect();
                format!("dyn {}", bounds.join(" + "))
            }
        }
    }

    /// Collect every fully-qualified path referenced by this type.
    pub fn collect_paths(&self, out: &mut Vec<String>) {
        match self {
            TypeRef::Path {
                module,
                name,
                generics,
            } => {
                if let Some(module) = module {
                    out.push(format!("{}::{}", module, name));
                }
                for g in generics {
                    g.collect_paths(out);
                }
            }
            TypeRef::Ref { inner, .. } | TypeRef::Slice(inner) => inner.collect_paths(out),
            TypeRef::Tuple(items) | TypeRef::Dyn(items) => {
                for item in items {
                    item.collect_paths(out);
                }
            }
            TypeRef::Lifetime(_) => {}
        }
    }

    /// Collect the short name of every path type referenced by this type.
    pub fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeRef::Path { name, generics, .. } => {
                out.push(name);
                for g in generics {
                    g.collect_names(out);
                }
            }
            TypeRef::Ref { inner, .. } | TypeRef::Slice(inner) => inner.collect_names(out),
            TypeRef::Tuple(items) | TypeRef::Dyn(items) => {
                for item in items {
                    item.collect_names(out);
                }
            }
            TypeRef::Lifetime(_) => {}
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

impl std::str::FromStr for TypeRef {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRef::parse(s)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = GenerateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.qualified()
    }
}

/// Recursive-descent parser over a type expression.
struct TypeParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn new(src: &'a str) -> Self {
        TypeParser { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn error(&self, reason: impl Into<String>) -> GenerateError {
        GenerateError::InvalidType {
            text: self.src.to_string(),
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), GenerateError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", token)))
        }
    }

    /// Consume a keyword only when it is not the prefix of a longer identifier.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let rest = self.rest();
        if !rest.starts_with(keyword) {
            return false;
        }
        let boundary = rest[keyword.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_ident_char(c));
        if boundary {
            self.pos += keyword.len();
        }
        boundary
    }

    fn lifetime(&mut self) -> Result<Option<String>, GenerateError> {
        self.skip_ws();
        if !self.rest().starts_with('\'') {
            return Ok(None);
        }
        self.pos += 1;
        let start = self.pos;
        if self.ident_len() == 0 {
            return Err(self.error("expected a lifetime name"));
        }
        Ok(Some(self.src[start..self.pos].to_string()))
    }

    fn ident_len(&mut self) -> usize {
        let len = self
            .rest()
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map_or(self.rest().len(), |(i, _)| i);
        self.pos += len;
        len
    }

    fn ident(&mut self) -> Result<&'a str, GenerateError> {
        self.skip_ws();
        let start = self.pos;
        if self.rest().chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(self.error("identifier cannot start with a digit"));
        }
        if self.ident_len() == 0 {
            return Err(self.error("expected a type name"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn parse_type(&mut self) -> Result<TypeRef, GenerateError> {
        if self.eat("&") {
            let lifetime = self.lifetime()?;
            let mutable = self.eat_keyword("mut");
            let inner = self.parse_type()?;
            return Ok(TypeRef::Ref {
                lifetime,
                mutable,
                inner: Box::new(inner),
            });
        }

        if self.eat("[") {
            let inner = self.parse_type()?;
            self.expect("]")?;
            return Ok(TypeRef::Slice(Box::new(inner)));
        }

        if self.eat("(") {
            return self.parse_tuple();
        }

        if self.eat_keyword("dyn") {
            let mut bounds = Vec::new();
            loop {
                match self.lifetime()? {
                    Some(lifetime) => bounds.push(TypeRef::Lifetime(lifetime)),
                    None => bounds.push(self.parse_path()?),
                }
                if !self.eat("+") {
                    break;
                }
            }
            if bounds.iter().all(|b| matches!(b, TypeRef::Lifetime(_))) {
                return Err(self.error("trait object needs at least one trait bound"));
            }
            return Ok(TypeRef::Dyn(bounds));
        }

        self.parse_path()
    }

    fn parse_tuple(&mut self) -> Result<TypeRef, GenerateError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        if self.eat(")") {
            return Ok(TypeRef::Tuple(items));
        }
        loop {
            items.push(self.parse_type()?);
            if self.eat(")") {
                break;
            }
            self.expect(",")?;
            if self.eat(")") {
                trailing_comma = true;
                break;
            }
        }
        // `(T)` is a parenthesized type, `(T,)` a one-element tuple
        if items.len() == 1 && !trailing_comma {
            return Ok(items.remove(0));
        }
        Ok(TypeRef::Tuple(items))
    }

    fn parse_path(&mut self) -> Result<TypeRef, GenerateError> {
        let mut segments = vec![self.ident()?];
        while self.eat("::") {
            segments.push(self.ident()?);
        }

        let mut generics = Vec::new();
        if self.eat("<") {
            loop {
                match self.lifetime()? {
                    Some(lifetime) => generics.push(TypeRef::Lifetime(lifetime)),
                    None => generics.push(self.parse_type()?),
                }
                if self.eat(">") {
                    break;
                }
                self.expect(",")?;
                if self.eat(">") {
                    break;
                }
            }
        }

        let name = segments.pop().unwrap_or_default().to_string();
        let module = if segments.is_empty() {
            None
        } else {
            Some(segments.join("::"))
        };

        Ok(TypeRef::Path {
            module,
            name,
            generics,
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

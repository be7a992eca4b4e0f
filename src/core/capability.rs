//! Capability and method metadata.
//!
//! A capability is a named trait exposing a method contract. Capabilities are
//! described declaratively (see [`CapabilityRegistry`](super::registry::CapabilityRegistry))
//! and flattened into [`MethodDescriptor`]s for resolution.

use serde::{Deserialize, Serialize};

use super::types::TypeRef;

/// Reference to the capability a method is declared on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityRef {
    /// Capability (trait) name
    pub name: String,

    /// Module the trait is declared in, if it needs importing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

impl CapabilityRef {
    /// Create a reference to a capability in the current module.
    pub fn new(name: impl Into<String>) -> Self {
        CapabilityRef {
            name: name.into(),
            module: None,
        }
    }

    /// Set the declaring module.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Fully-qualified path of the trait, if it lives in a named module.
    pub fn import_path(&self) -> Option<String> {
        self.module
            .as_ref()
            .map(|module| format!("{}::{}", module, self.name))
    }
}

/// A declared method, before it is attached to its owning capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Method name
    pub name: String,

    /// Parameter types, in order (the `&self` receiver is implicit)
    #[serde(default)]
    pub params: Vec<TypeRef>,

    /// Return types, in order; more than one renders as a tuple
    #[serde(default)]
    pub returns: Vec<TypeRef>,
}

impl MethodDecl {
    /// Create a method with no parameters and no return values.
    pub fn new(name: impl Into<String>) -> Self {
        MethodDecl {
            name: name.into(),
            params: Vec::new(),
            returns: Vec::new(),
        }
    }

    /// Add a parameter type.
    pub fn with_param(mut self, ty: TypeRef) -> Self {
        self.params.push(ty);
        self
    }

    /// Add a return type.
    pub fn with_return(mut self, ty: TypeRef) -> Self {
        self.returns.push(ty);
        self
    }
}

/// A named abstract type exposing zero or more methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Capability name; also its identity
    pub name: String,

    /// Module the trait is declared in
    #[serde(default)]
    pub module: Option<String>,

    /// Embedded capabilities (supertraits), flattened before own methods
    #[serde(default)]
    pub embeds: Vec<String>,

    /// Own methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl Capability {
    /// Create an empty capability.
    pub fn new(name: impl Into<String>) -> Self {
        Capability {
            name: name.into(),
            module: None,
            embeds: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the declaring module.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Embed another capability.
    pub fn with_embed(mut self, name: impl Into<String>) -> Self {
        self.embeds.push(name.into());
        self
    }

    /// Add a method declaration.
    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// Reference to this capability.
    pub fn to_ref(&self) -> CapabilityRef {
        CapabilityRef {
            name: self.name.clone(),
            module: self.module.clone(),
        }
    }
}

/// A method attached to the capability that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,

    /// Declaring capability
    pub owner: CapabilityRef,

    /// Parameter types
    pub params: Vec<TypeRef>,

    /// Return types
    pub returns: Vec<TypeRef>,
}

impl MethodDescriptor {
    /// Attach a declaration to its owner.
    pub fn from_decl(decl: &MethodDecl, owner: CapabilityRef) -> Self {
        MethodDescriptor {
            name: decl.name.clone(),
            owner,
            params: decl.params.clone(),
            returns: decl.returns.clone(),
        }
    }

    /// Two descriptors are duplicates iff name and full signature match.
    pub fn same_signature(&self, other: &MethodDescriptor) -> bool {
        self.name == other.name && self.params == other.params && self.returns == other.returns
    }

    /// Zero parameters and exactly one non-tuple return value.
    pub fn is_getter(&self) -> bool {
        self.params.is_empty()
            && self.returns.len() == 1
            && !self.returns[0].is_unit()
            && !self.returns[0].is_tuple()
    }

    /// Rendered return type, `None` when the method returns nothing.
    pub fn return_type(&self) -> Option<String> {
        match self.returns.as_slice() {
            [] => None,
            [single] => Some(single.render()),
            many => {
                let items: Vec<String> = many.iter().map(TypeRef::render).collect();
                Some(format!("({})", items.join(", ")))
            }
        }
    }

    /// Human-readable signature, fully qualified, for diagnostics.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(TypeRef::qualified).collect();
        let mut sig = format!("fn {}(&self", self.name);
        for param in &params {
            sig.push_str(", ");
            sig.push_str(param);
        }
        sig.push(')');
        match self.returns.as_slice() {
            [] => {}
            [single] => sig.push_str(&format!(" -> {}", single.qualified())),
            many => {
                let items: Vec<String> = many.iter().map(TypeRef::qualified).collect();
                sig.push_str(&format!(" -> ({})", items.join(", ")));
            }
        }
        sig
    }

    /// Every fully-qualified path referenced by parameters and return types.
    pub fn type_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for ty in self.params.iter().chain(self.returns.iter()) {
            ty.collect_paths(&mut paths);
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> TypeRef {
        TypeRef::parse(s).unwrap()
    }

    #[test]
    fn test_signature_rendering() {
        let decl = MethodDecl::new("param")
            .with_param(ty("&str"))
            .with_return(ty("Option<serde_json::Value>"));
        let m = MethodDescriptor::from_decl(&decl, CapabilityRef::new("Page"));

        assert_eq!(
            m.signature(),
            "fn param(&self, &str) -> Option<serde_json::Value>"
        );
        assert_eq!(m.return_type().as_deref(), Some("Option<Value>"));
        assert_eq!(m.type_paths(), vec!["serde_json::Value"]);
    }

    #[test]
    fn test_multiple_returns_render_as_tuple() {
        let decl = MethodDecl::new("bounds")
            .with_return(ty("u32"))
            .with_return(ty("u32"));
        let m = MethodDescriptor::from_decl(&decl, CapabilityRef::new("Shape"));
        assert_eq!(m.return_type().as_deref(), Some("(u32, u32)"));
        assert!(!m.is_getter());
    }

    #[test]
    fn test_same_signature_ignores_owner() {
        let decl = MethodDecl::new("title").with_return(ty("String"));
        let a = MethodDescriptor::from_decl(&decl, CapabilityRef::new("A"));
        let b = MethodDescriptor::from_decl(&decl, CapabilityRef::new("B"));
        assert!(a.same_signature(&b));

        let other = MethodDescriptor::from_decl(
            &MethodDecl::new("title").with_return(ty("i32")),
            CapabilityRef::new("B"),
        );
        assert!(!a.same_signature(&other));

        let borrowed = MethodDescriptor::from_decl(
            &MethodDecl::new("kind").with_return(ty("&str")),
            CapabilityRef::new("A"),
        );
        let fixed = MethodDescriptor::from_decl(
            &MethodDecl::new("kind").with_return(ty("&'static str")),
            CapabilityRef::new("B"),
        );
        assert!(!borrowed.same_signature(&fixed));
    }

    #[test]
    fn test_getter_detection() {
        let owner = CapabilityRef::new("Page");
        let getter = MethodDescriptor::from_decl(
            &MethodDecl::new("title").with_return(ty("String")),
            owner.clone(),
        );
        let unit = MethodDescriptor::from_decl(
            &MethodDecl::new("touch").with_return(ty("()")),
            owner.clone(),
        );
        let with_arg = MethodDescriptor::from_decl(
            &MethodDecl::new("param")
                .with_param(ty("&str"))
                .with_return(ty("String")),
            owner,
        );

        assert!(getter.is_getter());
        assert!(!unit.is_getter());
        assert!(!with_arg.is_getter());
    }

    #[test]
    fn test_capability_import_path() {
        let cap = CapabilityRef::new("Page").with_module("crate::resources::page");
        assert_eq!(
            cap.import_path().as_deref(),
            Some("crate::resources::page::Page")
        );
        assert_eq!(CapabilityRef::new("Page").import_path(), None);
    }
}

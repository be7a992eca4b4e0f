//! Delegating wrapper generation.
//!
//! A wrapper holds one field and implements every owning capability of a
//! method set. Each method runs its behavior fragment and then either
//! forwards to the field ([`WrapperMode::Delegate`]) or returns a default
//! value ([`WrapperMode::ZeroValue`]).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::behavior::WrapperBehavior;
use super::imports::ImportResolver;
use super::syntax::{ident, render_items, Binding, Function, Item};
use super::unit::{EmissionUnit, UnitContext};
use crate::core::capability::{CapabilityRef, MethodDescriptor};
use crate::core::types::TypeRef;
use crate::resolver::errors::GenerateError;
use crate::resolver::method_set::MethodSet;

/// How wrapper methods produce their result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrapperMode {
    /// Forward to the wrapped field and return its result
    #[default]
    Delegate,

    /// Return `Default::default()` without touching the field
    ZeroValue,
}

/// The single field a wrapper holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeRef,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        FieldSpec {
            name: name.into(),
            ty,
        }
    }
}

/// Public constructor emitted next to the wrapper struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorSpec {
    pub name: String,

    /// Declared return type; a `Box<...>` return boxes the wrapper
    pub returns: TypeRef,

    pub doc: Option<String>,
}

/// Everything needed to emit one wrapper besides its method set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperSpec {
    /// Struct name
    pub name: String,

    pub field: FieldSpec,

    pub constructor: Option<ConstructorSpec>,

    pub mode: WrapperMode,

    /// Body expressions for methods that need no fragment
    pub fixed: IndexMap<String, String>,

    /// Traits implemented with an empty block because every method they
    /// carry comes from an embedded capability
    pub implements: Vec<CapabilityRef>,

    /// Paths every unit of this wrapper imports
    pub imports: Vec<String>,

    pub doc: Option<String>,
}

impl WrapperSpec {
    pub fn new(name: impl Into<String>, field: FieldSpec) -> Self {
        WrapperSpec {
            name: name.into(),
            field,
            constructor: None,
            mode: WrapperMode::Delegate,
            fixed: IndexMap::new(),
            implements: Vec::new(),
            imports: Vec::new(),
            doc: None,
        }
    }

    pub fn with_constructor(
        mut self,
        name: impl Into<String>,
        returns: TypeRef,
        doc: Option<String>,
    ) -> Self {
        self.constructor = Some(ConstructorSpec {
            name: name.into(),
            returns,
            doc,
        });
        self
    }

    pub fn with_mode(mut self, mode: WrapperMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_fixed(mut self, method: impl Into<String>, body: impl Into<String>) -> Self {
        self.fixed.insert(method.into(), body.into());
        self
    }

    pub fn with_import(mut self, path: impl Into<String>) -> Self {
        self.imports.push(path.into());
        self
    }

    pub fn implementing(mut self, capability: CapabilityRef) -> Self {
        self.implements.push(capability);
        self
    }
}

/// Emits wrapper units.
pub struct WrapperGenerator<'a> {
    spec: &'a WrapperSpec,
    behavior: &'a WrapperBehavior,
}

impl<'a> WrapperGenerator<'a> {
    pub fn new(spec: &'a WrapperSpec, behavior: &'a WrapperBehavior) -> Self {
        WrapperGenerator { spec, behavior }
    }

    /// Generate the unit for `set`.
    pub fn generate(
        &self,
        set: &MethodSet,
        context: &UnitContext,
    ) -> Result<EmissionUnit, GenerateError> {
        let items = self.items(set)?;

        let mut imports = ImportResolver::new(context.module.as_deref());
        imports
            .add_methods(set)
            .add_owners(set)
            .add_type(&self.spec.field.ty);
        if let Some(ctor) = &self.spec.constructor {
            imports.add_type(&ctor.returns);
        }
        for cap in &self.spec.implements {
            if let Some(path) = cap.import_path() {
                imports.add_path(path);
            }
        }
        for path in &self.spec.imports {
            imports.add_path(path.clone());
        }

        tracing::debug!(
            "rendering wrapper `{}` with {} methods",
            self.spec.name,
            set.len()
        );

        Ok(EmissionUnit::new(
            context,
            imports.finish()?,
            render_items(&items),
        ))
    }

    /// Build the declaration records for `set`.
    ///
    /// Every fragment is looked up before any record is built, so a missing
    /// fragment fails without producing partial output.
    pub fn items(&self, set: &MethodSet) -> Result<Vec<Item>, GenerateError> {
        if set.is_empty() {
            return Err(GenerateError::EmptyMethodSet {
                stage: format!("wrapper `{}`", self.spec.name),
            });
        }

        let fragments = self
            .behavior
            .fragments(set.iter().filter(|m| !self.spec.fixed.contains_key(&m.name)))?;

        let mut items = Vec::new();

        if let Some(ctor) = &self.spec.constructor {
            items.push(Item::Function(self.constructor(ctor)));
        }

        items.push(Item::Struct {
            doc: self.spec.doc.clone(),
            public: self.spec.constructor.is_none(),
            name: self.spec.name.clone(),
            fields: vec![Binding::new(
                self.spec.field.name.clone(),
                self.spec.field.ty.render(),
            )],
        });

        for (owner, methods) in set.grouped_by_owner() {
            let functions = methods
                .into_iter()
                .map(|method| {
                    let fragment = fragments.get(&method.name).cloned().flatten();
                    self.method(method, fragment)
                })
                .collect();
            items.push(Item::Impl {
                trait_name: owner.name.clone(),
                target: self.spec.name.clone(),
                functions,
            });
        }

        let owners: Vec<String> = set.owners().iter().map(|o| o.name.clone()).collect();
        for cap in &self.spec.implements {
            if !owners.contains(&cap.name) {
                items.push(Item::Impl {
                    trait_name: cap.name.clone(),
                    target: self.spec.name.clone(),
                    functions: Vec::new(),
                });
            }
        }

        Ok(items)
    }

    fn constructor(&self, ctor: &ConstructorSpec) -> Function {
        let field = ident(&self.spec.field.name);
        let literal = format!("{} {{ {} }}", self.spec.name, field);
        let body = if is_box(&ctor.returns) {
            format!("Box::new({})", literal)
        } else {
            literal
        };

        let mut function = Function::new(ctor.name.clone());
        function.doc = ctor.doc.clone();
        function.public = true;
        function.params = vec![Binding::new(
            self.spec.field.name.clone(),
            self.spec.field.ty.render(),
        )];
        function.returns = Some(ctor.returns.render());
        function.body = vec![body];
        function
    }

    fn method(&self, method: &MethodDescriptor, fragment: Option<String>) -> Function {
        let prefix = match self.spec.mode {
            WrapperMode::Delegate => "arg",
            WrapperMode::ZeroValue => "_arg",
        };

        let mut function = Function::method(method.name.clone());
        function.params = method
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| Binding::new(format!("{}{}", prefix, i), ty.render()))
            .collect();
        function.returns = method.return_type();

        if let Some(body) = self.spec.fixed.get(&method.name) {
            function.body = vec![body.clone()];
            return function;
        }

        function.body.extend(fragment);

        let returns = !method.returns.is_empty();
        match self.spec.mode {
            WrapperMode::Delegate => {
                let args: Vec<String> = function.params.iter().map(|p| p.name.clone()).collect();
                let call = format!(
                    "self.{}.{}({})",
                    ident(&self.spec.field.name),
                    ident(&method.name),
                    args.join(", ")
                );
                function.body.push(if returns { call } else { call + ";" });
            }
            WrapperMode::ZeroValue => {
                if returns {
                    function.body.push("Default::default()".to_string());
                }
            }
        }

        function
    }
}

fn is_box(ty: &TypeRef) -> bool {
    matches!(ty, TypeRef::Path { name, .. } if name == "Box")
}

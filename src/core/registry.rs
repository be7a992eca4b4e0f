//! Capability metadata providers.
//!
//! The resolver never introspects types itself. It asks a [`MetadataProvider`]
//! for the ordered method list of a capability. [`CapabilityRegistry`] is the
//! declarative implementation fed from `Stencil.toml`.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::capability::{Capability, CapabilityRef, MethodDescriptor};
use crate::resolver::errors::GenerateError;

/// Source of capability metadata.
pub trait MetadataProvider: Sync {
    /// Reference (name + module) of a capability.
    fn capability(&self, name: &str) -> Result<CapabilityRef, GenerateError>;

    /// Ordered method list of a capability, embedded capabilities first.
    fn describe_capability(&self, name: &str) -> Result<Vec<MethodDescriptor>, GenerateError>;

    /// Check whether a capability is known.
    fn has_capability(&self, name: &str) -> bool {
        self.capability(name).is_ok()
    }
}

/// Declarative registry of capabilities, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: IndexMap<String, Capability>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. Returns the previous definition with the same name.
    pub fn insert(&mut self, capability: Capability) -> Option<Capability> {
        self.capabilities
            .insert(capability.name.clone(), capability)
    }

    /// Builder-style registration.
    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name)
    }

    /// Iterate capabilities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.values()
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Names of embedded capabilities that are not registered.
    pub fn dangling_embeds(&self) -> Vec<(String, String)> {
        let mut dangling = Vec::new();
        for cap in self.capabilities.values() {
            for embed in &cap.embeds {
                if !self.capabilities.contains_key(embed) {
                    dangling.push((cap.name.clone(), embed.clone()));
                }
            }
        }
        dangling
    }

    fn unknown(&self, name: &str) -> GenerateError {
        GenerateError::UnknownCapability {
            name: name.to_string(),
            suggestions: self.similar_names(name),
        }
    }

    /// Registered names that look like `name` (case-insensitive substring match).
    fn similar_names(&self, name: &str) -> Vec<String> {
        let needle = name.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.capabilities
            .keys()
            .filter(|candidate| {
                let candidate = candidate.to_lowercase();
                candidate.contains(&needle) || needle.contains(&candidate)
            })
            .cloned()
            .collect()
    }

    fn flatten(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        out: &mut Vec<MethodDescriptor>,
    ) -> Result<(), GenerateError> {
        let cap = self.get(name).ok_or_else(|| self.unknown(name))?;

        // Diamond embeds contribute their methods once
        if !visited.insert(cap.name.clone()) {
            return Ok(());
        }

        for embed in &cap.embeds {
            self.flatten(embed, visited, out)?;
        }

        let owner = cap.to_ref();
        out.extend(
            cap.methods
                .iter()
                .map(|decl| MethodDescriptor::from_decl(decl, owner.clone())),
        );
        Ok(())
    }
}

impl MetadataProvider for CapabilityRegistry {
    fn capability(&self, name: &str) -> Result<CapabilityRef, GenerateError> {
        self.get(name)
            .map(Capability::to_ref)
            .ok_or_else(|| self.unknown(name))
    }

    fn describe_capability(&self, name: &str) -> Result<Vec<MethodDescriptor>, GenerateError> {
        let mut methods = Vec::new();
        let mut visited = HashSet::new();
        self.flatten(name, &mut visited, &mut methods)?;
        Ok(methods)
    }

    fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::MethodDecl;
    use crate::core::types::TypeRef;

    fn getter(name: &str, ret: &str) -> MethodDecl {
        MethodDecl::new(name).with_return(TypeRef::parse(ret).unwrap())
    }

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::new()
            .with(Capability::new("FileProvider").with_method(getter("file", "String")))
            .with(Capability::new("Titled").with_method(getter("title", "String")))
            .with(
                Capability::new("Page")
                    .with_module("crate::page")
                    .with_embed("FileProvider")
                    .with_embed("Titled")
                    .with_method(getter("weight", "i32")),
            )
            .with(
                Capability::new("Section")
                    .with_embed("Page")
                    .with_embed("Titled")
                    .with_method(getter("pages", "Vec<Page>")),
            )
    }

    #[test]
    fn test_describe_flattens_embeds_first() {
        let methods = registry().describe_capability("Page").unwrap();
        let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["file", "title", "weight"]);

        assert_eq!(methods[0].owner.name, "FileProvider");
        assert_eq!(methods[2].owner.name, "Page");
        assert_eq!(methods[2].owner.module.as_deref(), Some("crate::page"));
    }

    #[test]
    fn test_diamond_embed_is_flattened_once() {
        let methods = registry().describe_capability("Section").unwrap();
        let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["file", "title", "weight", "pages"]);
    }

    #[test]
    fn test_unknown_capability_suggests_similar() {
        let err = registry().describe_capability("page").unwrap_err();
        match err {
            GenerateError::UnknownCapability { name, suggestions } => {
                assert_eq!(name, "page");
                assert_eq!(suggestions, vec!["Page".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dangling_embeds() {
        let reg = CapabilityRegistry::new().with(Capability::new("A").with_embed("Missing"));
        assert_eq!(
            reg.dangling_embeds(),
            vec![("A".to_string(), "Missing".to_string())]
        );
    }
}

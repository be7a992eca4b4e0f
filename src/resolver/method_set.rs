//! Ordered, conflict-free method sets.

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

use super::errors::GenerateError;
use crate::core::capability::{CapabilityRef, MethodDescriptor};

/// Mapping from method name to descriptor, in insertion order.
///
/// No two distinct signatures share a name within one set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodSet {
    methods: IndexMap<String, MethodDescriptor>,
}

impl MethodSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a method.
    ///
    /// Returns `Ok(false)` when an identical method is already present (the
    /// first occurrence, including its owner, is kept) and an error when the
    /// name is taken by a different signature.
    pub fn insert(&mut self, method: MethodDescriptor) -> Result<bool, GenerateError> {
        if let Some(existing) = self.methods.get(&method.name) {
            if existing.same_signature(&method) {
                return Ok(false);
            }
            return Err(GenerateError::ConflictingSignature {
                name: method.name.clone(),
                first: existing.signature(),
                second: method.signature(),
            });
        }
        self.methods.insert(method.name.clone(), method);
        Ok(true)
    }

    /// Look up a method by name.
    pub fn get(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// Check whether a method is present.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Number of methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Iterate methods in order.
    pub fn iter(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }

    /// Method names in order.
    pub fn names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// Owning capabilities in order of first appearance.
    pub fn owners(&self) -> Vec<&CapabilityRef> {
        let mut owners: Vec<&CapabilityRef> = Vec::new();
        for method in self.methods.values() {
            if !owners.iter().any(|o| o.name == method.owner.name) {
                owners.push(&method.owner);
            }
        }
        owners
    }

    /// Methods grouped by owning capability, owners in first-appearance order.
    pub fn grouped_by_owner(&self) -> Vec<(&CapabilityRef, Vec<&MethodDescriptor>)> {
        self.owners()
            .into_iter()
            .map(|owner| {
                let methods = self
                    .methods
                    .values()
                    .filter(|m| m.owner.name == owner.name)
                    .collect();
                (owner, methods)
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a MethodSet {
    type Item = &'a MethodDescriptor;
    type IntoIter = indexmap::map::Values<'a, String, MethodDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.methods.values()
    }
}

impl Serialize for MethodSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.methods.values())
    }
}

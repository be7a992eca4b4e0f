//! Method set resolution.
//!
//! Unions the methods of the included capabilities and removes everything
//! claimed by the exclusions. Output order follows input order exactly so
//! that generated text is stable across runs.

use std::collections::HashSet;

use super::errors::GenerateError;
use super::exclude::{NameExcluder, PatternExcluder};
use super::method_set::MethodSet;
use crate::core::registry::MetadataProvider;
use crate::core::types::TypeRef;

/// Capabilities and name patterns removed from a resolution.
pub struct ExclusionSpec {
    /// Excluded capabilities
    pub capabilities: Vec<String>,

    /// Name predicate applied independently of capability membership
    pub names: Box<dyn NameExcluder>,
}

impl ExclusionSpec {
    /// Exclude nothing.
    pub fn none() -> Self {
        ExclusionSpec {
            capabilities: Vec::new(),
            names: Box::new(PatternExcluder::empty()),
        }
    }

    /// Exclude the given capabilities.
    pub fn capabilities<I, S>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExclusionSpec {
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            names: Box::new(PatternExcluder::empty()),
        }
    }

    /// Also exclude names matched by `names`.
    pub fn with_names(mut self, names: impl NameExcluder + 'static) -> Self {
        self.names = Box::new(names);
        self
    }
}

impl Default for ExclusionSpec {
    fn default() -> Self {
        Self::none()
    }
}

type SignatureKey = (String, Vec<TypeRef>, Vec<TypeRef>);

/// Computes working method sets from inclusion/exclusion specs.
pub struct MethodSetResolver<'a> {
    provider: &'a dyn MetadataProvider,
}

impl<'a> MethodSetResolver<'a> {
    /// Create a resolver over a metadata provider.
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        MethodSetResolver { provider }
    }

    /// Resolve the method set for `includes` minus `excludes`.
    ///
    /// Fails when two retained methods share a name with different
    /// signatures, and when nothing is left after exclusion.
    pub fn resolve<S: AsRef<str>>(
        &self,
        includes: &[S],
        excludes: &ExclusionSpec,
    ) -> Result<MethodSet, GenerateError> {
        let mut excluded_owners: HashSet<String> = HashSet::new();
        let mut excluded_signatures: HashSet<SignatureKey> = HashSet::new();

        for cap in &excludes.capabilities {
            excluded_owners.insert(cap.clone());
            for method in self.provider.describe_capability(cap)? {
                excluded_owners.insert(method.owner.name.clone());
                excluded_signatures.insert((method.name, method.params, method.returns));
            }
        }

        let mut set = MethodSet::new();
        for cap in includes {
            let cap = cap.as_ref();
            for method in self.provider.describe_capability(cap)? {
                if excluded_owners.contains(&method.owner.name) {
                    tracing::trace!("excluding {}.{} (owner)", method.owner.name, method.name);
                    continue;
                }

                let key = (
                    method.name.clone(),
                    method.params.clone(),
                    method.returns.clone(),
                );
                if excluded_signatures.contains(&key) {
                    tracing::trace!("excluding {}.{} (signature)", method.owner.name, method.name);
                    continue;
                }

                if excludes.names.is_excluded(&method.name) {
                    tracing::trace!("excluding {}.{} (name)", method.owner.name, method.name);
                    continue;
                }

                set.insert(method)?;
            }
        }

        let included: Vec<&str> = includes.iter().map(|s| s.as_ref()).collect();
        if set.is_empty() {
            return Err(GenerateError::EmptyMethodSet {
                stage: format!("method set for `{}`", included.join("`, `")),
            });
        }

        tracing::debug!(
            "resolved {} methods from {}",
            set.len(),
            included.join(", ")
        );

        Ok(set)
    }
}

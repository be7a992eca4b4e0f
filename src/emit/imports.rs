//! Import aggregation for generated units.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::core::types::TypeRef;
use crate::resolver::errors::GenerateError;
use crate::resolver::method_set::MethodSet;

/// Collects the module paths a unit needs.
///
/// Paths are fully qualified (`crate::page::Page`). Paths that live in the
/// unit's own module are dropped when the block is finished.
#[derive(Debug, Default)]
pub struct ImportResolver {
    local_module: Option<String>,
    paths: BTreeSet<String>,
}

impl ImportResolver {
    /// Create a resolver for a unit declared in `local_module`.
    pub fn new(local_module: Option<&str>) -> Self {
        ImportResolver {
            local_module: local_module.map(str::to_string),
            paths: BTreeSet::new(),
        }
    }

    /// Add every path referenced by the parameter and return types of `set`.
    pub fn add_methods(&mut self, set: &MethodSet) -> &mut Self {
        for method in set {
            let mut found = Vec::new();
            for ty in method.params.iter().chain(&method.returns) {
                ty.collect_paths(&mut found);
            }
            self.paths.extend(found);
        }
        self
    }

    /// Add the trait path of every owning capability in `set`.
    pub fn add_owners(&mut self, set: &MethodSet) -> &mut Self {
        for owner in set.owners() {
            if let Some(path) = owner.import_path() {
                self.paths.insert(path);
            }
        }
        self
    }

    /// Add every path referenced by `ty`.
    pub fn add_type(&mut self, ty: &TypeRef) -> &mut Self {
        let mut found = Vec::new();
        ty.collect_paths(&mut found);
        self.paths.extend(found);
        self
    }

    /// Add a fully-qualified path.
    pub fn add_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.paths.insert(path.into());
        self
    }

    /// Filter local paths and check for short-name collisions.
    pub fn finish(&self) -> Result<ImportBlock, GenerateError> {
        let mut paths = BTreeSet::new();
        let mut by_name: BTreeMap<&str, &str> = BTreeMap::new();

        for path in &self.paths {
            let (module, name) = split_path(path);
            if module.is_none() || module == self.local_module.as_deref() {
                continue;
            }
            if let Some(first) = by_name.insert(name, path.as_str()) {
                return Err(GenerateError::ConflictingImport {
                    name: name.to_string(),
                    first: first.to_string(),
                    second: path.clone(),
                });
            }
            paths.insert(path.clone());
        }

        Ok(ImportBlock { paths })
    }
}

fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once("::") {
        Some((module, name)) => (Some(module), name),
        None => (None, path),
    }
}

/// A sorted, deduplicated set of `use` paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportBlock {
    paths: BTreeSet<String>,
}

impl ImportBlock {
    /// Create a block from explicit paths, skipping the collision check.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ImportBlock {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Render as `use` declarations.
    ///
    /// Nothing for an empty block, a single `use` line for one path and a
    /// braced group, one path per line, otherwise.
    pub fn render(&self) -> String {
        match self.paths.len() {
            0 => String::new(),
            1 => {
                let path = self.paths.iter().next().map(String::as_str).unwrap_or("");
                format!("use {};\n", path)
            }
            _ => {
                let mut out = String::from("use {\n");
                for path in &self.paths {
                    out.push_str("    ");
                    out.push_str(path);
                    out.push_str(",\n");
                }
                out.push_str("};\n");
                out
            }
        }
    }
}

impl fmt::Display for ImportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::{CapabilityRef, MethodDecl, MethodDescriptor};
    use pretty_assertions::assert_eq;

    fn method(owner: CapabilityRef, name: &str, ret: &str) -> MethodDescriptor {
        MethodDescriptor::from_decl(
            &MethodDecl::new(name).with_return(TypeRef::parse(ret).unwrap()),
            owner,
        )
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(ImportBlock::default().render(), "");
    }

    #[test]
    fn test_render_single() {
        let block = ImportBlock::from_paths(["std::time::Duration"]);
        assert_eq!(block.render(), "use std::time::Duration;\n");
    }

    #[test]
    fn test_render_many_sorted() {
        let block = ImportBlock::from_paths(["std::time::Duration", "crate::page::Page"]);
        assert_eq!(
            block.render(),
            "use {\n    crate::page::Page,\n    std::time::Duration,\n};\n"
        );
    }

    #[test]
    fn test_collects_method_and_owner_paths() {
        let page = CapabilityRef::new("Page").with_module("crate::page");
        let mut set = MethodSet::new();
        set.insert(method(page.clone(), "date", "chrono::DateTime<chrono::Utc>"))
            .unwrap();
        set.insert(method(page, "lastmod", "chrono::DateTime<chrono::Utc>"))
            .unwrap();

        let block = ImportResolver::new(None)
            .add_methods(&set)
            .add_owners(&set)
            .finish()
            .unwrap();
        let paths: Vec<&str> = block.paths().collect();
        assert_eq!(
            paths,
            vec!["chrono::DateTime", "chrono::Utc", "crate::page::Page"]
        );
    }

    #[test]
    fn test_local_module_is_dropped() {
        let page = CapabilityRef::new("Page").with_module("crate::page");
        let mut set = MethodSet::new();
        set.insert(method(page, "site", "crate::page::Site")).unwrap();

        let block = ImportResolver::new(Some("crate::page"))
            .add_methods(&set)
            .add_owners(&set)
            .add_path("serde::Serialize")
            .finish()
            .unwrap();
        let paths: Vec<&str> = block.paths().collect();
        assert_eq!(paths, vec!["serde::Serialize"]);
    }

    #[test]
    fn test_conflicting_short_names() {
        let err = ImportResolver::new(None)
            .add_path("crate::a::Error")
            .add_path("crate::b::Error")
            .finish()
            .unwrap_err();
        match err {
            GenerateError::ConflictingImport { name, first, second } => {
                assert_eq!(name, "Error");
                assert_eq!(first, "crate::a::Error");
                assert_eq!(second, "crate::b::Error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

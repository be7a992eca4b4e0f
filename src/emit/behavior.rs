//! Behavior fragments injected into wrapper methods.
//!
//! A fragment is a single statement run before the delegating call, such as
//! a deprecation notice. Fragments are looked up by method name first and
//! then by owning capability; a capability entry is a template that may use
//! the `{name}` and `{capability}` placeholders.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::syntax::string_literal;
use crate::core::capability::MethodDescriptor;
use crate::resolver::errors::GenerateError;

/// What a wrapper method does before it delegates.
///
/// In a manifest this is written as `{ deprecated = "hint" }`,
/// `{ warning = "message" }` or the bare string `"delegate"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Advisory {
    /// Report the method as deprecated with a migration hint
    Deprecated(String),

    /// Log a warning message
    Warning(String),

    /// Delegate without injecting anything
    Delegate,
}

impl Advisory {
    fn expand(&self, method: &MethodDescriptor) -> Advisory {
        match self {
            Advisory::Deprecated(hint) => Advisory::Deprecated(expand(hint, method)),
            Advisory::Warning(msg) => Advisory::Warning(expand(msg, method)),
            Advisory::Delegate => Advisory::Delegate,
        }
    }
}

/// Calls used to report advisories from generated code.
///
/// A call ending in `!` is treated as a macro and receives a format string;
/// anything else is called as a plain function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryCalls {
    /// Called as `deprecated(subject, hint)`
    pub deprecated: String,

    /// Called as `warning(message)`
    pub warning: String,
}

impl Default for AdvisoryCalls {
    fn default() -> Self {
        AdvisoryCalls {
            deprecated: "deprecated".to_string(),
            warning: "tracing::warn!".to_string(),
        }
    }
}

impl AdvisoryCalls {
    /// Render the statement reporting `advisory` for `subject`.
    pub fn render(&self, advisory: &Advisory, subject: &str) -> Option<String> {
        match advisory {
            Advisory::Deprecated(hint) => {
                let args = [string_literal(subject), string_literal(hint)];
                if is_macro(&self.deprecated) {
                    Some(format!(
                        "{}(\"{{}} is deprecated. {{}}\", {}, {});",
                        self.deprecated, args[0], args[1]
                    ))
                } else {
                    Some(format!("{}({}, {});", self.deprecated, args[0], args[1]))
                }
            }
            Advisory::Warning(msg) => {
                if is_macro(&self.warning) {
                    Some(format!(
                        "{}(\"{{}}\", {});",
                        self.warning,
                        string_literal(msg)
                    ))
                } else {
                    Some(format!("{}({});", self.warning, string_literal(msg)))
                }
            }
            Advisory::Delegate => None,
        }
    }
}

fn is_macro(call: &str) -> bool {
    call.ends_with('!')
}

fn expand(template: &str, method: &MethodDescriptor) -> String {
    template
        .replace("{name}", &method.name)
        .replace("{capability}", &method.owner.name)
}

fn default_subject() -> String {
    "{capability}.{name}".to_string()
}

/// Per-method behavior table for a wrapper target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperBehavior {
    /// Subject template for deprecation notices
    #[serde(default = "default_subject")]
    pub subject: String,

    #[serde(default)]
    pub calls: AdvisoryCalls,

    /// Advisories keyed by method name
    #[serde(default)]
    pub methods: IndexMap<String, Advisory>,

    /// Advisory templates keyed by owning capability
    #[serde(default)]
    pub capabilities: IndexMap<String, Advisory>,
}

impl Default for WrapperBehavior {
    fn default() -> Self {
        WrapperBehavior {
            subject: default_subject(),
            calls: AdvisoryCalls::default(),
            methods: IndexMap::new(),
            capabilities: IndexMap::new(),
        }
    }
}

impl WrapperBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an advisory for a method name.
    pub fn method(mut self, name: impl Into<String>, advisory: Advisory) -> Self {
        self.methods.insert(name.into(), advisory);
        self
    }

    /// Register an advisory template for every method owned by `capability`.
    pub fn capability(mut self, capability: impl Into<String>, advisory: Advisory) -> Self {
        self.capabilities.insert(capability.into(), advisory);
        self
    }

    /// Set the subject template.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the advisory calls.
    pub fn with_calls(mut self, calls: AdvisoryCalls) -> Self {
        self.calls = calls;
        self
    }

    /// The advisory that applies to `method`, if any.
    pub fn advisory_for(&self, method: &MethodDescriptor) -> Option<Advisory> {
        if let Some(advisory) = self.methods.get(&method.name) {
            return Some(advisory.clone());
        }
        self.capabilities
            .get(&method.owner.name)
            .map(|template| template.expand(method))
    }

    /// The statement injected into `method`, `None` for plain delegation.
    pub fn fragment_for(&self, method: &MethodDescriptor) -> Result<Option<String>, GenerateError> {
        let advisory = self.advisory_for(method).ok_or_else(|| {
            GenerateError::MissingBehaviorFragment {
                method: method.name.clone(),
                capability: method.owner.name.clone(),
            }
        })?;
        let subject = expand(&self.subject, method);
        Ok(self.calls.render(&advisory, &subject))
    }

    /// Resolve the fragment of every method up front.
    ///
    /// Fails on the first method without one, before any text is produced.
    pub fn fragments<'m, I>(
        &self,
        methods: I,
    ) -> Result<IndexMap<String, Option<String>>, GenerateError>
    where
        I: IntoIterator<Item = &'m MethodDescriptor>,
    {
        methods
            .into_iter()
            .map(|method| Ok((method.name.clone(), self.fragment_for(method)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::{CapabilityRef, MethodDecl};
    use crate::core::types::TypeRef;
    use pretty_assertions::assert_eq;

    fn method(owner: &str, name: &str) -> MethodDescriptor {
        MethodDescriptor::from_decl(
            &MethodDecl::new(name).with_return(TypeRef::named("String")),
            CapabilityRef::new(owner),
        )
    }

    #[test]
    fn test_method_entry_wins_over_capability() {
        let behavior = WrapperBehavior::new()
            .with_subject("Page.{name}")
            .method("url", Advisory::Deprecated("Use .permalink".into()))
            .capability("FileWithoutOverlap", Advisory::Deprecated("Use .file.{name}".into()));

        let url = behavior.fragment_for(&method("FileWithoutOverlap", "url")).unwrap();
        assert_eq!(url.as_deref(), Some(r#"deprecated("Page.url", "Use .permalink");"#));

        let dir = behavior.fragment_for(&method("FileWithoutOverlap", "dir")).unwrap();
        assert_eq!(dir.as_deref(), Some(r#"deprecated("Page.dir", "Use .file.dir");"#));
    }

    #[test]
    fn test_missing_fragment() {
        let behavior = WrapperBehavior::new();
        let err = behavior.fragment_for(&method("Page", "title")).unwrap_err();
        match err {
            GenerateError::MissingBehaviorFragment { method, capability } => {
                assert_eq!(method, "title");
                assert_eq!(capability, "Page");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_delegate_has_no_fragment() {
        let behavior = WrapperBehavior::new().capability("Page", Advisory::Delegate);
        assert_eq!(behavior.fragment_for(&method("Page", "title")).unwrap(), None);
    }

    #[test]
    fn test_macro_calls_use_format_strings() {
        let behavior = WrapperBehavior::new()
            .with_calls(AdvisoryCalls {
                deprecated: "log::warn!".into(),
                warning: "self.log.warn".into(),
            })
            .method("dir", Advisory::Warning("{{ with .File }}".into()))
            .method("url", Advisory::Deprecated("Use \"permalink\"".into()));

        let dir = behavior.fragment_for(&method("File", "dir")).unwrap();
        assert_eq!(dir.as_deref(), Some(r#"self.log.warn("{{ with .File }}");"#));

        let url = behavior.fragment_for(&method("Page", "url")).unwrap();
        assert_eq!(
            url.as_deref(),
            Some(r#"log::warn!("{} is deprecated. {}", "Page.url", "Use \"permalink\"");"#)
        );
    }

    #[test]
    fn test_fragments_fail_before_emission() {
        let behavior = WrapperBehavior::new().method("title", Advisory::Delegate);
        let methods = [method("Page", "title"), method("Page", "weight")];
        assert!(behavior.fragments(&methods).is_err());

        let fragments = behavior.fragments(&methods[..1]).unwrap();
        assert_eq!(fragments.len(), 1);
    }

    #[test]
    fn test_deserialize_advisories() {
        let behavior: WrapperBehavior = toml::from_str(
            r#"
            [calls]
            deprecated = "crate::helpers::deprecated"

            [methods]
            is_draft = { deprecated = "Use .draft." }
            hugo = "delegate"

            [capabilities]
            File = { warning = ".File.{name} on zero object." }
            "#,
        )
        .unwrap();

        assert_eq!(behavior.subject, "{capability}.{name}");
        assert_eq!(behavior.calls.warning, "tracing::warn!");
        assert_eq!(behavior.methods["hugo"], Advisory::Delegate);
        assert_eq!(
            behavior.advisory_for(&method("File", "dir")),
            Some(Advisory::Warning(".File.dir on zero object.".into()))
        );
    }
}

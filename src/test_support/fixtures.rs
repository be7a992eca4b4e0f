//! Test fixtures for common test scenarios.

use std::path::Path;

use crate::core::manifest::{Manifest, MANIFEST_NAME};

/// A manifest with one target of every kind over a small page model.
pub const PAGE_MANIFEST: &str = r#"
[generator]
module = "crate::page"
header = "Copyright 2024 The Authors."

[[capability]]
name = "FileWithoutOverlap"
module = "crate::source"

[[capability.method]]
name = "filename"
returns = ["String"]

[[capability.method]]
name = "path"
returns = ["String"]

[[capability]]
name = "Zeroer"
module = "crate::source"

[[capability.method]]
name = "is_zero"
returns = ["bool"]

[[capability]]
name = "DeprecatedPageMethods"
module = "crate::page"
embeds = ["FileWithoutOverlap"]

[[capability.method]]
name = "url"
returns = ["String"]

[[capability.method]]
name = "param"
params = ["&str"]
returns = ["Option<serde_json::Value>"]

[[target]]
name = "page-deprecated"
kind = "wrapper"
output = "src/page/page_wrappers.rs"
include = ["DeprecatedPageMethods"]
struct = "PageDeprecated"
field = { name = "p", type = "Box<dyn DeprecatedPageMethods>" }
constructor = { name = "new_deprecated_warning_page", returns = "Box<dyn DeprecatedPageMethods>" }
imports = ["crate::helpers::deprecated"]

[target.behavior]
subject = "Page.{name}"

[target.behavior.methods]
url = { deprecated = "Use .permalink" }
param = "delegate"

[target.behavior.capabilities]
FileWithoutOverlap = { deprecated = "Use .file.{name}" }

[[target]]
name = "page-zero"
kind = "zero-value"
output = "src/source/zero_file.rs"
module = "crate::source"
include = ["FileWithoutOverlap", "Zeroer"]
struct = "ZeroFile"
field = { name = "log", type = "crate::log::Logger" }
constructor = { name = "new_zero_file", returns = "ZeroFile" }
fixed = { is_zero = "true" }

[target.behavior.capabilities]
FileWithoutOverlap = { warning = "Accessing {name} on a zero file" }

[[target]]
name = "page-json"
kind = "marshal"
output = "src/page/page_marshaljson.rs"
include = ["DeprecatedPageMethods"]
function = "marshal_page_to_json"
field_excludes = ["^path$"]
key_style = "pascal"
"#;

/// Write `content` as the manifest in `dir` and parse it.
pub fn write_manifest(dir: &Path, content: &str) -> Manifest {
    let path = dir.join(MANIFEST_NAME);
    std::fs::write(&path, content).unwrap();
    Manifest::load(&path).unwrap()
}

//! Emission units: one generated source file each.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::imports::ImportBlock;
use crate::resolver::errors::GenerateError;

/// Marker line placed in every generated file.
pub const GENERATED_MARKER: &str = "This file is @generated by stencil. Do not edit.";

/// Header used when the manifest does not supply one.
pub const DEFAULT_HEADER: &str = GENERATED_MARKER;

/// Settings shared by every unit a manifest produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitContext {
    /// Header text, rendered as `//` comment lines
    pub header: String,

    /// Module the generated file is compiled into
    pub module: Option<String>,
}

impl UnitContext {
    pub fn new(header: impl Into<String>, module: Option<String>) -> Self {
        UnitContext {
            header: header.into(),
            module,
        }
    }
}

impl Default for UnitContext {
    fn default() -> Self {
        UnitContext {
            header: DEFAULT_HEADER.to_string(),
            module: None,
        }
    }
}

/// A fully rendered source file.
///
/// Built once from its parts and never changed afterwards; the driver
/// writes it exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionUnit {
    header: String,
    module: Option<String>,
    imports: ImportBlock,
    body: String,
}

impl EmissionUnit {
    pub fn new(context: &UnitContext, imports: ImportBlock, body: String) -> Self {
        EmissionUnit {
            header: context.header.clone(),
            module: context.module.clone(),
            imports,
            body,
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn imports(&self) -> &ImportBlock {
        &self.imports
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Render the file: header, generated marker, module line, imports, body.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for line in self.header.lines() {
            push_comment(&mut out, line);
        }
        if !self.header.contains(GENERATED_MARKER) {
            if !self.header.is_empty() {
                out.push_str("//\n");
            }
            push_comment(&mut out, GENERATED_MARKER);
        }
        if let Some(module) = &self.module {
            push_comment(&mut out, &format!("module: {}", module));
        }
        out.push('\n');

        if !self.imports.is_empty() {
            out.push_str(&self.imports.render());
            out.push('\n');
        }

        out.push_str(&self.body);
        if !self.body.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    /// Write the rendered unit to `path`.
    ///
    /// The text goes to a temporary file next to `path` that is flushed and
    /// then renamed over the destination, so a failed run never leaves a
    /// truncated file behind.
    pub fn write_to(&self, path: &Path) -> Result<(), GenerateError> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))?;

        let mut file = NamedTempFile::new_in(dir).map_err(|e| GenerateError::io(path, e))?;
        file.write_all(self.render().as_bytes())
            .map_err(|e| GenerateError::io(path, e))?;
        file.flush().map_err(|e| GenerateError::io(path, e))?;
        file.persist(path)
            .map_err(|e| GenerateError::io(path, e.error))?;

        tracing::debug!("wrote {}", path.display());
        Ok(())
    }

    /// Check whether `path` already holds exactly this unit.
    pub fn is_current(&self, path: &Path) -> Result<bool, GenerateError> {
        match fs::read_to_string(path) {
            Ok(existing) => Ok(existing == self.render()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(GenerateError::io(path, e)),
        }
    }
}

fn push_comment(out: &mut String, line: &str) {
    if line.is_empty() {
        out.push_str("//\n");
    } else {
        out.push_str("// ");
        out.push_str(line);
        out.push('\n');
    }
}

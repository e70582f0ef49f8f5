use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;
use miette::{Context, IntoDiagnostic};

pub mod cli;
pub mod emit;
pub mod library;
pub mod naming;
pub mod statics;

pub use cli::CliUnit;
pub use library::LibraryUnit;

/// Iterates a document mapping in ascending key order.
///
/// The discovery format guarantees no member order, so every traversal
/// of a schema, resource, method, property, or parameter mapping goes
/// through this helper to keep generated output reproducible.
pub fn sorted<V>(entries: &IndexMap<String, V>) -> impl Iterator<Item = (&str, &V)> {
    entries
        .iter()
        .map(|(key, value)| (key.as_str(), value))
        .sorted_by_key(|&(key, _)| key)
}

pub fn write_to_disk(output: &Path, code: impl IntoCode) -> miette::Result<()> {
    let code = code.into_code();
    let path = output.join(code.path());
    let string = code.into_string()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .into_diagnostic()
            .with_context(|| format!("Failed to create directory `{}`", parent.display()))?;
    }
    std::fs::write(&path, string)
        .into_diagnostic()
        .with_context(|| format!("Failed to write `{}`", path.display()))?;
    Ok(())
}

pub trait Code {
    fn path(&self) -> &str;
    fn into_string(self) -> miette::Result<String>;
}

impl<T: AsRef<str>> Code for (T, String) {
    fn path(&self) -> &str {
        self.0.as_ref()
    }

    fn into_string(self) -> miette::Result<String> {
        Ok(self.1)
    }
}

pub trait IntoCode {
    type Code: Code;

    fn into_code(self) -> Self::Code;
}

impl<T: Code> IntoCode for T {
    type Code = T;

    fn into_code(self) -> Self::Code {
        self
    }
}

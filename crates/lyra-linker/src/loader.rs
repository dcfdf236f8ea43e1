// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Where module source text comes from.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("module not found: {0}")]
    NotFound(String),
    #[error("cannot read {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: io::Error,
    },
}

/// Fetches the source text of imported modules.
pub trait ModuleLoader {
    fn load(&mut self, url: &str) -> Result<String, LoadError>;

    /// Url of `specifier` as imported by the module at `importer`.
    fn resolve(&self, importer: &str, specifier: &str) -> String {
        join_relative(importer, specifier)
    }
}

/// Resolve `specifier` against the directory of `importer`, folding `.`
/// and `..` segments. Separators are normalized to `/`.
pub fn join_relative(importer: &str, specifier: &str) -> String {
    let base = Path::new(importer).parent().unwrap_or_else(|| Path::new(""));
    let mut out = PathBuf::new();
    for component in base.join(specifier).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let climbs_out = matches!(out.components().next_back(), None | Some(Component::ParentDir));
                if climbs_out {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out.to_string_lossy().replace('\\', "/")
}

/// Reads modules from disk; urls are file paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl ModuleLoader for FsLoader {
    fn load(&mut self, url: &str) -> Result<String, LoadError> {
        fs::read_to_string(url).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LoadError::NotFound(url.to_string())
            } else {
                LoadError::Io { url: url.to_string(), source }
            }
        })
    }
}

/// Modules held in memory, keyed by url. Used by tests and embedders.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    modules: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(url, source);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, source: impl Into<String>) {
        self.modules.insert(url.into(), source.into());
    }
}

impl ModuleLoader for MemoryLoader {
    fn load(&mut self, url: &str) -> Result<String, LoadError> {
        self.modules.get(url).cloned().ok_or_else(|| LoadError::NotFound(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_specifiers_follow_the_importer() {
        assert_eq!(join_relative("app/main.lyra", "./lib.lyra"), "app/lib.lyra");
        assert_eq!(join_relative("app/main.lyra", "../shared/util.lyra"), "shared/util.lyra");
        assert_eq!(join_relative("main.lyra", "./lib/box.lyra"), "lib/box.lyra");
        assert_eq!(join_relative("main.lyra", "../up.lyra"), "../up.lyra");
    }

    #[test]
    fn memory_loader_reports_missing_modules() {
        let mut loader = MemoryLoader::new().with("a.lyra", "let x = 1;");
        assert_eq!(loader.load("a.lyra").unwrap(), "let x = 1;");
        assert!(matches!(loader.load("b.lyra"), Err(LoadError::NotFound(url)) if url == "b.lyra"));
    }

    #[test]
    fn fs_loader_reads_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lib.lyra");
        fs::write(&path, "class Box { }").unwrap();
        let mut loader = FsLoader;
        assert_eq!(loader.load(path.to_str().unwrap()).unwrap(), "class Box { }");
        let missing = dir.path().join("missing.lyra");
        assert!(matches!(loader.load(missing.to_str().unwrap()), Err(LoadError::NotFound(_))));
    }
}

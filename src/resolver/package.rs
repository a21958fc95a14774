//! Locating installed packages that ship a model.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::asset_paths::is_external_reference;
use crate::error::{Result, WidgetError};

const NODE_MODULES_DIR: &str = "node_modules";
const PACKAGE_METADATA_FILE: &str = "package.json";

/// An installed package found by a [`PackageLocator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Package name as declared in its metadata.
    pub name: String,
    /// Declared version, if any.
    pub version: Option<String>,
    /// Package root directory.
    pub dir: PathBuf,
}

impl PackageInfo {
    /// Package name without its `@scope/` prefix.
    pub fn unscoped_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Dependency lookup used by the package strategy.
pub trait PackageLocator {
    /// Find the installed package called `name`.
    ///
    /// Returns `Ok(None)` when no such package is installed and an error when a package
    /// directory exists but its metadata cannot be read.
    fn locate_package(&self, name: &str) -> Result<Option<PackageInfo>>;
}

impl<F> PackageLocator for F
where
    F: Fn(&str) -> Result<Option<PackageInfo>>,
{
    fn locate_package(&self, name: &str) -> Result<Option<PackageInfo>> {
        self(name)
    }
}

/// Looks for `node_modules/<name>` in a start directory and each of its ancestors.
#[derive(Debug, Clone)]
pub struct NodeModulesLocator {
    start_dir: PathBuf,
}

impl NodeModulesLocator {
    /// Locator searching from `start_dir` upwards.
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
        }
    }
}

impl PackageLocator for NodeModulesLocator {
    fn locate_package(&self, name: &str) -> Result<Option<PackageInfo>> {
        if !is_package_name(name) {
            return Ok(None);
        }

        for dir in self.start_dir.ancestors() {
            let candidate = dir.join(NODE_MODULES_DIR).join(name);
            if candidate.is_dir() {
                return read_package(name, &candidate).map(Some);
            }
        }

        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct PackageMetadata {
    name: Option<String>,
    version: Option<String>,
}

fn read_package(name: &str, dir: &Path) -> Result<PackageInfo> {
    let malformed = |reason: String| WidgetError::MalformedPackage {
        name: name.to_string(),
        dir: dir.to_path_buf(),
        reason,
    };

    let metadata_path = dir.join(PACKAGE_METADATA_FILE);
    let content = match fs::read_to_string(&metadata_path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(malformed(format!("missing {PACKAGE_METADATA_FILE}")));
        }
        Err(err) => return Err(WidgetError::io(metadata_path, err)),
    };
    let metadata: PackageMetadata = serde_json::from_str(&content)
        .map_err(|err| malformed(format!("invalid {PACKAGE_METADATA_FILE}: {err}")))?;

    Ok(PackageInfo {
        name: metadata.name.unwrap_or_else(|| name.to_string()),
        version: metadata.version,
        dir: dir.to_path_buf(),
    })
}

/// Whether `value` can be a package name (optionally scoped), as opposed to a path or URL.
pub fn is_package_name(value: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:@[a-z0-9][a-z0-9._~-]*/)?[a-z0-9][a-z0-9._~-]*$")
            .expect("invalid package name regex")
    });

    !is_external_reference(value) && pattern.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn recognises_package_names() {
        assert!(is_package_name("live2d-widget-model-shizuku"));
        assert!(is_package_name("@scope/koharu"));
        assert!(!is_package_name("./models/koharu"));
        assert!(!is_package_name("/abs/models"));
        assert!(!is_package_name("models/koharu"));
        assert!(!is_package_name("https://example.com/a.model.json"));
        assert!(!is_package_name(""));
    }

    #[test]
    fn finds_packages_in_ancestor_directories() {
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("node_modules/live2d-widget-model-z16");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(
            pkg.join("package.json"),
            r#"{"name": "live2d-widget-model-z16", "version": "1.0.5"}"#,
        )
        .unwrap();
        let site = temp.path().join("site");
        fs::create_dir_all(&site).unwrap();

        let info = NodeModulesLocator::new(&site)
            .locate_package("live2d-widget-model-z16")
            .unwrap()
            .unwrap();
        assert_eq!(info.dir, pkg);
        assert_eq!(info.version.as_deref(), Some("1.0.5"));
    }

    #[test]
    fn missing_package_is_none() {
        let temp = tempdir().unwrap();
        let locator = NodeModulesLocator::new(temp.path());
        assert!(locator.locate_package("not-installed-anywhere-xyz").unwrap().is_none());
        assert!(locator.locate_package("models/koharu").unwrap().is_none());
    }

    #[test]
    fn package_without_metadata_is_malformed() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("node_modules/broken")).unwrap();

        let err = NodeModulesLocator::new(temp.path())
            .locate_package("broken")
            .unwrap_err();
        assert!(matches!(err, WidgetError::MalformedPackage { .. }));
    }

    #[test]
    fn package_with_invalid_metadata_is_malformed() {
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("node_modules/@scope/broken");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("package.json"), "{ nope").unwrap();

        let err = NodeModulesLocator::new(temp.path())
            .locate_package("@scope/broken")
            .unwrap_err();
        assert!(err.to_string().contains("invalid package.json"));
    }

    #[test]
    fn strips_scope_from_name() {
        let info = PackageInfo {
            name: "@scope/koharu".into(),
            version: None,
            dir: PathBuf::from("node_modules/@scope/koharu"),
        };
        assert_eq!(info.unscoped_name(), "koharu");
    }
}

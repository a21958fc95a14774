use std::fs;
use std::path::{Path, PathBuf};

use crate::asset_paths::{PublishDir, is_external_reference};
use crate::error::Result;
use crate::manifest::load_manifest;
use crate::models::{ResolvedModel, StrategyKind};
use crate::resolver::ModelStrategy;
use crate::resolver::package::PackageLocator;

/// Loads models from `<root>/<identifier>` when that directory exists.
pub struct DirectoryStrategy {
    kind: StrategyKind,
    root: PathBuf,
}

impl DirectoryStrategy {
    /// Strategy of the given kind looking under `root`.
    pub fn new(kind: StrategyKind, root: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            root: root.into(),
        }
    }
}

impl ModelStrategy for DirectoryStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn try_resolve(&self, identifier: &str, publish: &PublishDir) -> Result<Option<ResolvedModel>> {
        let identifier = identifier.trim();
        if identifier.is_empty() || is_external_reference(identifier) {
            return Ok(None);
        }

        let dir = self.root.join(identifier);
        if !dir.is_dir() {
            return Ok(None);
        }

        let folder = folder_name(&dir);
        tracing::debug!(strategy = %self.kind, "loading model from {}", dir.display());
        let assets = load_manifest(&dir, &publish.join(&folder))?;
        Ok(Some(assets.resolved_by(self.kind)))
    }
}

/// Loads models shipped inside an installed package.
pub struct PackageStrategy {
    locator: Box<dyn PackageLocator>,
    assets_dir: String,
}

impl PackageStrategy {
    /// Strategy reading `<package>/<assets_dir>` for packages found by `locator`.
    pub fn new(locator: Box<dyn PackageLocator>, assets_dir: &str) -> Self {
        Self {
            locator,
            assets_dir: assets_dir.to_string(),
        }
    }
}

impl ModelStrategy for PackageStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Package
    }

    fn try_resolve(&self, identifier: &str, publish: &PublishDir) -> Result<Option<ResolvedModel>> {
        let identifier = identifier.trim();
        if identifier.is_empty() || is_external_reference(identifier) {
            return Ok(None);
        }

        let Some(package) = self.locator.locate_package(identifier)? else {
            return Ok(None);
        };

        let assets_dir = package.dir.join(self.assets_dir.trim_matches('/'));
        tracing::debug!(
            "loading model from package {}@{} at {}",
            package.name,
            package.version.as_deref().unwrap_or("unknown"),
            assets_dir.display()
        );
        let assets = load_manifest(&assets_dir, &publish.join(package.unscoped_name()))?;
        Ok(Some(assets.resolved_by(StrategyKind::Package)))
    }
}

/// Passes any non-blank identifier through as the model URL.
pub struct CustomStrategy;

impl ModelStrategy for CustomStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Custom
    }

    fn try_resolve(&self, identifier: &str, _publish: &PublishDir) -> Result<Option<ResolvedModel>> {
        if identifier.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(ResolvedModel {
            strategy: StrategyKind::Custom,
            model_json_url: identifier.to_string(),
            generators: Vec::new(),
        }))
    }
}

fn folder_name(dir: &Path) -> String {
    let canonical = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WidgetError;
    use crate::resolver::PackageInfo;
    use tempfile::tempdir;

    fn publish() -> PublishDir {
        PublishDir::new("/blog/", "live2dw/assets/")
    }

    #[test]
    fn directory_strategy_skips_missing_and_remote_identifiers() {
        let temp = tempdir().unwrap();
        let strategy = DirectoryStrategy::new(StrategyKind::SiteRelative, temp.path());

        assert!(strategy.try_resolve("absent", &publish()).unwrap().is_none());
        assert!(strategy.try_resolve("", &publish()).unwrap().is_none());
        assert!(
            strategy
                .try_resolve("https://example.com/a.model.json", &publish())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn directory_strategy_uses_folder_name_for_publish_dir() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("source/_models/wanko/");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("wanko.model.json"), r#"{"model": "wanko.moc"}"#).unwrap();

        let strategy = DirectoryStrategy::new(StrategyKind::SiteRelative, temp.path());
        let model = strategy
            .try_resolve("source/_models/wanko/", &publish())
            .unwrap()
            .unwrap();

        assert_eq!(model.model_json_url, "/blog/live2dw/assets/wanko/wanko.model.json");
        assert_eq!(model.generators[1].target, "live2dw/assets/wanko/wanko.moc");
    }

    #[test]
    fn directory_without_descriptor_is_not_found() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("empty")).unwrap();
        let strategy = DirectoryStrategy::new(StrategyKind::BundledModels, temp.path());

        let err = strategy.try_resolve("empty", &publish()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn package_strategy_skips_unknown_packages() {
        let strategy = PackageStrategy::new(
            Box::new(|_: &str| -> Result<Option<PackageInfo>> { Ok(None) }),
            "assets/",
        );
        assert!(strategy.try_resolve("not-installed", &publish()).unwrap().is_none());
    }

    #[test]
    fn package_strategy_propagates_locator_errors() {
        let strategy = PackageStrategy::new(
            Box::new(|name: &str| -> Result<Option<PackageInfo>> {
                Err(WidgetError::MalformedPackage {
                    name: name.to_string(),
                    dir: PathBuf::from("node_modules/broken"),
                    reason: "invalid package.json".into(),
                })
            }),
            "assets/",
        );
        assert!(strategy.try_resolve("broken", &publish()).is_err());
    }

    #[test]
    fn custom_strategy_keeps_identifier_verbatim() {
        let model = CustomStrategy
            .try_resolve("models/remote.model.json", &publish())
            .unwrap()
            .unwrap();
        assert_eq!(model.model_json_url, "models/remote.model.json");
        assert!(CustomStrategy.try_resolve(" ", &publish()).unwrap().is_none());
    }
}

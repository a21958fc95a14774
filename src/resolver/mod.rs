//! Model identifier resolution.
//!
//! A model identifier can name a folder under `live2d_models/`, a directory relative to
//! the site, an installed package, or an arbitrary URL. Each interpretation is a
//! [`ModelStrategy`]; the [`ModelResolver`] tries them in a fixed priority order and the
//! first one that applies wins.

mod package;
mod strategies;

use std::path::Path;

use crate::asset_paths::PublishDir;
use crate::error::{Result, WidgetError};
use crate::models::{ResolvedModel, StrategyKind};

pub use package::{NodeModulesLocator, PackageInfo, PackageLocator, is_package_name};
pub use strategies::{CustomStrategy, DirectoryStrategy, PackageStrategy};

/// Folder under the site base directory holding bundled models.
pub const BUNDLED_MODELS_DIR: &str = "live2d_models";

/// One way of interpreting a model identifier.
pub trait ModelStrategy {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Resolve `identifier`, or return `Ok(None)` when this strategy does not apply.
    fn try_resolve(&self, identifier: &str, publish: &PublishDir) -> Result<Option<ResolvedModel>>;
}

/// Ordered list of strategies evaluated until one resolves the identifier.
pub struct ModelResolver {
    strategies: Vec<Box<dyn ModelStrategy>>,
}

impl ModelResolver {
    /// Build a resolver from strategies in priority order.
    pub fn new(strategies: Vec<Box<dyn ModelStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard order: bundled models, site-relative directories, packages, custom URLs.
    pub fn standard(
        site_base: &Path,
        package_assets_dir: &str,
        locator: Box<dyn PackageLocator>,
    ) -> Self {
        Self::new(vec![
            Box::new(DirectoryStrategy::new(
                StrategyKind::BundledModels,
                site_base.join(BUNDLED_MODELS_DIR),
            )),
            Box::new(DirectoryStrategy::new(StrategyKind::SiteRelative, site_base)),
            Box::new(PackageStrategy::new(locator, package_assets_dir)),
            Box::new(CustomStrategy),
        ])
    }

    /// Strategy kinds in evaluation order.
    pub fn order(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|strategy| strategy.kind()).collect()
    }

    /// Resolve `identifier` with the first applicable strategy.
    ///
    /// A directory that exists but holds no usable descriptor is skipped with a warning
    /// so the next strategy can try. When nothing applies the result is
    /// [`WidgetError::ModelNotFound`].
    pub fn resolve(&self, identifier: &str, publish: &PublishDir) -> Result<ResolvedModel> {
        for strategy in &self.strategies {
            match strategy.try_resolve(identifier, publish) {
                Ok(Some(model)) => return Ok(model),
                Ok(None) => {}
                Err(err) if err.is_not_found() => {
                    tracing::warn!(
                        strategy = %strategy.kind(),
                        "skipping `{}`: {}",
                        identifier,
                        err
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Err(WidgetError::ModelNotFound(identifier.to_string()))
    }
}

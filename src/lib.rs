#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod config;
pub mod error;
pub mod generator;
pub mod inject;
pub mod install;
pub mod manifest;
pub mod models;
pub mod resolver;
pub mod script;

pub use builder::{WidgetAssets, WidgetBuild, WidgetBuilder};
pub use config::{SiteConfig, WidgetConfig};
pub use error::{Result, WidgetError};
pub use generator::build_generator;
pub use manifest::load_manifest;
pub use models::{AssetGenerator, ModelManifest, ModelVersion, ResolvedModel};
pub use resolver::{ModelResolver, ModelStrategy, PackageLocator};
pub use script::{ScriptSource, resolve_script_url};

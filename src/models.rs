//! Data structures produced while resolving widget assets.

use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

/// Instruction for the host to copy a file into the published site output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetGenerator {
  /// Absolute path of the file on disk.
  pub source: PathBuf,
  /// Output-relative path the file is served from.
  pub target: String,
}

/// Parsed view of a model descriptor file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelManifest {
  /// Relative asset paths in first-seen order, starting with the descriptor itself.
  pub files: Vec<String>,
  /// Path of the descriptor file on disk.
  pub model_json_path: PathBuf,
}

impl ModelManifest {
  /// Relative path of the descriptor, which is always the first entry of `files`.
  ///
  /// `None` only for a hand-built manifest with no files.
  pub fn descriptor(&self) -> Option<&str> {
    self.files.first().map(String::as_str)
  }
}

/// Served manifest URL and copy instructions produced by loading a model directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAssets {
  /// Served URL of the model descriptor.
  pub model_json_url: String,
  /// Copy instructions, descriptor first.
  pub generators: Vec<AssetGenerator>,
}

impl ModelAssets {
  /// Attach the strategy that located the model directory.
  pub fn resolved_by(self, strategy: StrategyKind) -> ResolvedModel {
    ResolvedModel {
      strategy,
      model_json_url: self.model_json_url,
      generators: self.generators,
    }
  }
}

/// Model format version, inferred from the manifest URL suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVersion {
  /// `*.model.json` models.
  V2,
  /// `*.model3.json` models.
  V3,
}

impl ModelVersion {
  /// Infer the version from a manifest URL or file name.
  pub fn from_manifest_url(url: &str) -> Self {
    if url.ends_with(".model3.json") {
      Self::V3
    } else {
      Self::V2
    }
  }

  /// Numeric tag understood by the browser runtime.
  pub fn as_u8(self) -> u8 {
    match self {
      Self::V2 => 2,
      Self::V3 => 3,
    }
  }
}

impl Serialize for ModelVersion {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(self.as_u8())
  }
}

/// Resolution strategy that produced a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
  /// `<site>/live2d_models/<identifier>`.
  BundledModels,
  /// `<site>/<identifier>`.
  SiteRelative,
  /// Installed dependency package.
  Package,
  /// Identifier passed through as a URL.
  Custom,
}

impl fmt::Display for StrategyKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Self::BundledModels => "live2d_models folder",
      Self::SiteRelative => "site relative path",
      Self::Package => "package",
      Self::Custom => "custom",
    };
    f.write_str(label)
  }
}

/// A model resolved to a served manifest URL plus the files that must be published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModel {
  /// Strategy that produced this model.
  pub strategy: StrategyKind,
  /// Served URL of the model descriptor.
  pub model_json_url: String,
  /// Copy instructions for the descriptor and every file it references.
  pub generators: Vec<AssetGenerator>,
}

impl ResolvedModel {
  /// Model format version derived from the manifest URL.
  pub fn version(&self) -> ModelVersion {
    ModelVersion::from_manifest_url(&self.model_json_url)
  }

  /// Folder segment directly containing the descriptor in the served URL, if any.
  pub fn folder_name(&self) -> Option<&str> {
    let path = self
      .model_json_url
      .split(['?', '#'])
      .next()
      .unwrap_or_default();
    let mut segments = path.rsplit('/');
    segments.next()?;
    segments.next().filter(|segment| !segment.is_empty())
  }
}

/// Element of the `live2d_models` array handed to the browser runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
  /// Model name, matching the folder the model is served from.
  pub name: String,
  /// Message shown when switching to this model.
  pub message: String,
  /// Model format version.
  pub version: ModelVersion,
}

//! Runtime script URL resolution.

use std::fmt;
use std::fs;
use std::path::Path;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::asset_paths::PublishDir;
use crate::error::{Result, WidgetError};
use crate::generator::build_generator;
use crate::models::AssetGenerator;

/// File name of the widget runtime bundle.
pub const CORE_SCRIPT_NAME: &str = "live2d_bundle.js";
/// Package the runtime bundle is published under on the CDNs.
pub const CDN_PACKAGE_NAME: &str = "Live2dOnWeb";

/// Where the runtime script is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ScriptSource {
    /// Copy the bundled script into the site and serve it locally.
    #[default]
    Local,
    /// Load from jsDelivr.
    Jsdelivr,
    /// Load from unpkg.
    Unpkg,
    /// Any other configured value is used verbatim as the script URL.
    Custom(String),
}

impl From<String> for ScriptSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "local" => Self::Local,
            "jsdelivr" => Self::Jsdelivr,
            "unpkg" => Self::Unpkg,
            _ => Self::Custom(value),
        }
    }
}

impl From<&str> for ScriptSource {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ScriptSource> for String {
    fn from(source: ScriptSource) -> Self {
        source.to_string()
    }
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Jsdelivr => f.write_str("jsdelivr"),
            Self::Unpkg => f.write_str("unpkg"),
            Self::Custom(url) => f.write_str(url),
        }
    }
}

/// Resolved runtime script reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptResolution {
    /// URL to reference from the page.
    pub url: String,
    /// Copy instruction for the local bundle.
    pub generator: Option<AssetGenerator>,
    /// MD5 content hash used as the cache-busting query string.
    pub hash: Option<String>,
}

/// Compute the runtime script URL for `source`.
///
/// Only [`ScriptSource::Local`] touches the filesystem: the script is hashed and a
/// generator copying it into `publish` is returned alongside the URL.
pub fn resolve_script_url(
    source: &ScriptSource,
    local_script: &Path,
    remote_version: &str,
    publish: &PublishDir,
) -> Result<ScriptResolution> {
    let resolution = match source {
        ScriptSource::Local => {
            let hash = file_md5(local_script)?;
            let file_name = local_script
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| CORE_SCRIPT_NAME.to_string());
            let source =
                std::path::absolute(local_script).map_err(|err| WidgetError::io(local_script, err))?;
            let generator = build_generator(source, publish.target_for(&file_name))?;
            ScriptResolution {
                url: format!("{}?{}", publish.url_for(&file_name), hash),
                generator: Some(generator),
                hash: Some(hash),
            }
        }
        ScriptSource::Jsdelivr => remote(format!(
            "https://cdn.jsdelivr.net/npm/{CDN_PACKAGE_NAME}@{remote_version}/lib/{CORE_SCRIPT_NAME}"
        )),
        ScriptSource::Unpkg => remote(format!(
            "https://unpkg.com/{CDN_PACKAGE_NAME}@{remote_version}/lib/{CORE_SCRIPT_NAME}"
        )),
        ScriptSource::Custom(url) => remote(url.clone()),
    };

    Ok(resolution)
}

fn remote(url: String) -> ScriptResolution {
    ScriptResolution {
        url,
        generator: None,
        hash: None,
    }
}

/// Hex-encoded MD5 digest of a file's content.
pub fn file_md5(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|err| WidgetError::io(path, err))?;
    Ok(format!("{:x}", Md5::digest(&bytes)))
}

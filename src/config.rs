//! Layered widget configuration read from the site and theme configuration files.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::asset_paths::normalise_site_root;
use crate::error::{Result, WidgetError};
use crate::script::ScriptSource;

const SITE_CONFIG_FILE: &str = "_config.yml";
const THEMES_DIR: &str = "themes";

/// Options controlling how the widget is resolved and injected.
///
/// Missing keys fall back to the [`Default`] values, so defaults are always applied
/// after every explicit layer has been merged.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Whether the widget is published at all.
    pub enable: bool,
    /// Emit resolution details at `info` level instead of `debug`.
    pub log: bool,
    /// Directory under the plugin root holding the widget scripts.
    pub plugin_js_path: String,
    /// Directory under the plugin root holding models; also the assets folder of model packages.
    pub plugin_model_path: String,
    /// Root directory of every published widget file.
    pub plugin_root_path: String,
    /// Where the runtime script is loaded from.
    pub script_from: ScriptSource,
    /// Expose the markup through a template tag instead of injecting it into every page.
    pub tag_mode: bool,
    /// Character model selection.
    pub model: ModelConfig,
    /// Free-form settings handed to the browser runtime.
    #[serde(rename = "live2d_settings")]
    pub live2d_settings: Map<String, Value>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            enable: true,
            log: false,
            plugin_js_path: "lib/".into(),
            plugin_model_path: "assets/".into(),
            plugin_root_path: "live2dw/".into(),
            script_from: ScriptSource::Local,
            tag_mode: false,
            model: ModelConfig::default(),
            live2d_settings: Map::new(),
        }
    }
}

/// Model selection options.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier: a bundled folder name, a site-relative path, a package name or a URL.
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl WidgetConfig {
    /// Merge configuration layers so that earlier layers win, then apply defaults.
    pub fn from_layers(layers: impl IntoIterator<Item = Value>) -> serde_json::Result<Self> {
        let mut merged = Value::Object(Map::new());
        for layer in layers {
            defaults_deep(&mut merged, &layer);
        }
        serde_json::from_value(merged)
    }

    /// Publish directory of the widget scripts relative to the site output.
    pub fn script_dir(&self) -> String {
        format!("{}{}", self.plugin_root_path, self.plugin_js_path)
    }

    /// Publish directory of the models relative to the site output.
    pub fn model_dir(&self) -> String {
        format!("{}{}", self.plugin_root_path, self.plugin_model_path)
    }
}

/// Fill keys missing from `target` with values from `source`, recursing into objects.
///
/// Values already present in `target` are never overwritten; arrays and scalars are
/// treated as leaves.
pub fn defaults_deep(target: &mut Value, source: &Value) {
    let (Value::Object(target), Value::Object(source)) = (target, source) else {
        return;
    };

    for (key, value) in source {
        match target.get_mut(key) {
            Some(existing) => defaults_deep(existing, value),
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Site-level configuration: where the site lives, its URL root and the widget options.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Base directory of the site sources.
    pub base_dir: PathBuf,
    /// URL root every published file is served under, always wrapped in `/`.
    pub root: String,
    /// Merged widget configuration.
    pub widget: WidgetConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SiteConfigFile {
    root: Option<String>,
    theme: Option<String>,
    live2d: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThemeConfigFile {
    live2d: Option<Value>,
}

impl SiteConfig {
    /// Load the site configuration from `base_dir`.
    ///
    /// The `live2d` key of the site `_config.yml` takes precedence over the same key in
    /// the active theme's `_config.yml`. Missing files are treated as empty.
    pub fn discover(base_dir: &Path) -> Result<Self> {
        let site_path = base_dir.join(SITE_CONFIG_FILE);
        let site: SiteConfigFile = read_yaml(&site_path)?.unwrap_or_default();

        let (theme_path, theme) = match site.theme.as_deref() {
            Some(name) if !name.trim().is_empty() => {
                let theme_path = base_dir.join(THEMES_DIR).join(name).join(SITE_CONFIG_FILE);
                tracing::debug!("reading theme configuration from {}", theme_path.display());
                let theme = read_yaml::<ThemeConfigFile>(&theme_path)?.unwrap_or_default();
                (Some(theme_path), theme)
            }
            _ => (None, ThemeConfigFile::default()),
        };

        let mut layers = Vec::new();
        if let Some(layer) = site.live2d {
            layers.push((site_path.clone(), layer));
        }
        if let (Some(path), Some(layer)) = (theme_path, theme.live2d) {
            layers.push((path, layer));
        }

        // Each layer must be valid on its own so type errors name the file they came from.
        for (path, layer) in &layers {
            serde_json::from_value::<WidgetConfig>(layer.clone()).map_err(|source| {
                WidgetError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;
        }

        let widget = WidgetConfig::from_layers(layers.into_iter().map(|(_, layer)| layer))
            .map_err(|source| WidgetError::Parse {
                path: site_path.clone(),
                source,
            })?;

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            root: normalise_site_root(site.root.as_deref().unwrap_or("/")),
            widget,
        })
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(WidgetError::io(path, err)),
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|source| WidgetError::Config {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn applies_defaults_for_missing_keys() {
        let config = WidgetConfig::from_layers([json!({"log": true})]).unwrap();
        assert!(config.enable);
        assert!(config.log);
        assert_eq!(config.plugin_root_path, "live2dw/");
        assert_eq!(config.script_dir(), "live2dw/lib/");
        assert_eq!(config.model_dir(), "live2dw/assets/");
        assert_eq!(config.script_from, ScriptSource::Local);
        assert!(config.model.identifier.is_none());
    }

    #[test]
    fn earlier_layers_win_and_objects_merge() {
        let site = json!({
            "scriptFrom": "unpkg",
            "model": {"use": "koharu"},
            "live2d_settings": {"modelName": "koharu"}
        });
        let theme = json!({
            "scriptFrom": "jsdelivr",
            "tagMode": true,
            "model": {"use": "shizuku"},
            "live2d_settings": {"modelName": "shizuku", "waifuSize": "280x250"}
        });

        let config = WidgetConfig::from_layers([site, theme]).unwrap();
        assert_eq!(config.script_from, ScriptSource::Unpkg);
        assert!(config.tag_mode);
        assert_eq!(config.model.identifier.as_deref(), Some("koharu"));
        assert_eq!(config.live2d_settings["modelName"], json!("koharu"));
        assert_eq!(config.live2d_settings["waifuSize"], json!("280x250"));
    }

    #[test]
    fn arrays_are_not_merged() {
        let mut target = json!({"list": [1]});
        defaults_deep(&mut target, &json!({"list": [2, 3], "other": [4]}));
        assert_eq!(target, json!({"list": [1], "other": [4]}));
    }

    #[test]
    fn discovers_site_and_theme_configuration() {
        let temp = tempdir().unwrap();
        let base = temp.path();
        fs::write(
            base.join("_config.yml"),
            "root: /blog\ntheme: next\nlive2d:\n  log: true\n  model:\n    use: koharu\n",
        )
        .unwrap();
        fs::create_dir_all(base.join("themes/next")).unwrap();
        fs::write(
            base.join("themes/next/_config.yml"),
            "live2d:\n  log: false\n  tagMode: true\n",
        )
        .unwrap();

        let site = SiteConfig::discover(base).unwrap();
        assert_eq!(site.root, "/blog/");
        assert!(site.widget.log);
        assert!(site.widget.tag_mode);
        assert_eq!(site.widget.model.identifier.as_deref(), Some("koharu"));
    }

    #[test]
    fn missing_files_yield_defaults() {
        let temp = tempdir().unwrap();
        let site = SiteConfig::discover(temp.path()).unwrap();
        assert_eq!(site.root, "/");
        assert!(site.widget.enable);
        assert_eq!(site.base_dir, temp.path());
    }

    #[test]
    fn type_errors_name_the_theme_file() {
        let temp = tempdir().unwrap();
        let base = temp.path();
        fs::write(base.join("_config.yml"), "theme: next\nlive2d:\n  log: true\n").unwrap();
        fs::create_dir_all(base.join("themes/next")).unwrap();
        fs::write(base.join("themes/next/_config.yml"), "live2d:\n  tagMode: sometimes\n").unwrap();

        match SiteConfig::discover(base) {
            Err(WidgetError::Parse { path, .. }) => {
                assert_eq!(path, base.join("themes/next/_config.yml"));
            }
            other => panic!("expected a parse error for the theme file, got {other:?}"),
        }
    }

    #[test]
    fn type_errors_name_the_site_file() {
        let temp = tempdir().unwrap();
        let base = temp.path();
        fs::write(base.join("_config.yml"), "live2d:\n  enable: maybe\n").unwrap();

        match SiteConfig::discover(base) {
            Err(WidgetError::Parse { path, .. }) => assert_eq!(path, base.join("_config.yml")),
            other => panic!("expected a parse error for the site file, got {other:?}"),
        }
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("_config.yml"), "live2d: [unclosed").unwrap();
        assert!(matches!(
            SiteConfig::discover(temp.path()),
            Err(WidgetError::Config { .. })
        ));
    }
}

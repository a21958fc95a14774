//! Widget build orchestrator: resolves the model and scripts for one site build.

use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::asset_paths::PublishDir;
use crate::config::SiteConfig;
use crate::error::{Result, WidgetError};
use crate::generator::build_generator;
use crate::inject::{inject_before_body, inline_config_script, render_widget_markup};
use crate::models::{AssetGenerator, ModelEntry, ResolvedModel};
use crate::resolver::{ModelResolver, NodeModulesLocator, PackageLocator};
use crate::script::resolve_script_url;

/// Published name of the waifu-tips helper script.
pub const WAIFU_SCRIPT_NAME: &str = "waifu-tips.js";

/// Local files shipped with the widget.
#[derive(Debug, Clone)]
pub struct WidgetAssets {
  /// Bundled runtime script, published when the script source is `local`.
  pub core_script: PathBuf,
  /// Waifu-tips helper script, always published.
  pub waifu_script: PathBuf,
  /// Runtime version used in CDN URLs.
  pub widget_version: String,
}

/// Everything one site build needs to publish and inject the widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetBuild {
  /// Copy instructions: model assets, then the waifu-tips script, then the runtime script.
  pub generators: Vec<AssetGenerator>,
  /// URL of the runtime script.
  pub script_url: String,
  /// URL of the waifu-tips script.
  pub waifu_url: String,
  /// Resolved character model, if one was configured and found.
  pub model: Option<ResolvedModel>,
  /// `live2d_settings` object handed to the page.
  pub settings: Map<String, Value>,
  /// `live2d_models` array handed to the page.
  pub models: Vec<ModelEntry>,
  /// Whether the markup is exposed as a tag instead of being injected.
  pub tag_mode: bool,
}

impl WidgetBuild {
  /// Rendered widget markup.
  pub fn markup(&self) -> String {
    let config = inline_config_script(&self.settings, &self.models);
    render_widget_markup(&config, &self.script_url, &self.waifu_url)
  }

  /// Inject the markup into a rendered page unless tag mode is enabled.
  pub fn inject(&self, html: &str) -> String {
    if self.tag_mode {
      return html.to_string();
    }
    inject_before_body(html, &self.markup()).unwrap_or_else(|| html.to_string())
  }

  /// Markup for an explicit template tag; only available in tag mode.
  pub fn tag(&self) -> Option<String> {
    if self.tag_mode {
      Some(self.markup())
    } else {
      tracing::warn!("live2d tag detected but not used; set `tagMode: true` to render it");
      None
    }
  }
}

/// High-level helper threading one immutable configuration through the resolvers.
pub struct WidgetBuilder<'a> {
  site: &'a SiteConfig,
  assets: &'a WidgetAssets,
  locator: Box<dyn PackageLocator>,
}

impl<'a> WidgetBuilder<'a> {
  /// Create a builder that looks up model packages under the site's `node_modules`.
  pub fn new(site: &'a SiteConfig, assets: &'a WidgetAssets) -> Self {
    Self {
      site,
      assets,
      locator: Box::new(NodeModulesLocator::new(&site.base_dir)),
    }
  }

  /// Replace the package locator.
  pub fn with_locator(mut self, locator: Box<dyn PackageLocator>) -> Self {
    self.locator = locator;
    self
  }

  /// Resolve every widget asset; returns `None` when the widget is disabled.
  ///
  /// A model that cannot be resolved is logged and the build continues without it.
  pub fn build(self) -> Result<Option<WidgetBuild>> {
    let config = &self.site.widget;
    if !config.enable {
      return Ok(None);
    }
    let verbose = config.log;
    report(
      verbose,
      format_args!("using Live2dOnWeb@{}", self.assets.widget_version),
    );

    let mut generators = Vec::new();
    let mut settings = config.live2d_settings.clone();
    let mut models = Vec::new();
    let mut model = None;

    if let Some(identifier) = config.model.identifier.as_deref() {
      let publish = PublishDir::new(&self.site.root, &config.model_dir());
      let resolver = ModelResolver::standard(
        &self.site.base_dir,
        &config.plugin_model_path,
        self.locator,
      );

      match resolver.resolve(identifier, &publish) {
        Ok(resolved) => {
          report(
            verbose,
            format_args!(
              "loaded model from {} at '{}'",
              resolved.strategy, resolved.model_json_url
            ),
          );
          let name = settings
            .get("modelName")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| resolved.folder_name().map(str::to_string))
            .unwrap_or_default();
          settings
            .entry("modelName")
            .or_insert_with(|| Value::String(name.clone()));
          settings.insert(
            "modelUrl".into(),
            Value::String(model_base_url(&resolved.model_json_url)),
          );
          models.push(ModelEntry {
            name,
            message: String::new(),
            version: resolved.version(),
          });
          generators.extend(resolved.generators.iter().cloned());
          model = Some(resolved);
        }
        Err(err @ WidgetError::InvalidArgument(_)) => return Err(err),
        Err(err) => {
          tracing::error!("did not find model json: {err}");
        }
      }
    }

    let scripts = PublishDir::new(&self.site.root, &config.script_dir());
    let waifu_source = std::path::absolute(&self.assets.waifu_script)
      .map_err(|err| WidgetError::io(&self.assets.waifu_script, err))?;
    generators.push(build_generator(
      waifu_source,
      scripts.target_for(WAIFU_SCRIPT_NAME),
    )?);
    let waifu_url = scripts.url_for(WAIFU_SCRIPT_NAME);

    let script = resolve_script_url(
      &config.script_from,
      &self.assets.core_script,
      &self.assets.widget_version,
      &scripts,
    )?;
    report(
      verbose,
      format_args!("runtime script from {} at '{}'", config.script_from, script.url),
    );
    generators.extend(script.generator);

    Ok(Some(WidgetBuild {
      generators,
      script_url: script.url,
      waifu_url,
      model,
      settings,
      models,
      tag_mode: config.tag_mode,
    }))
  }
}

/// Directory URL the runtime loads models from: the manifest URL without its
/// `/<folder>/<name>.model(3).json` tail.
pub fn model_base_url(model_json_url: &str) -> String {
  static TAIL: OnceLock<Regex> = OnceLock::new();
  let pattern = TAIL.get_or_init(|| {
    Regex::new(r"/[^/]*/[^/]+\.model3?\.json$").expect("invalid model tail regex")
  });
  pattern.replace(model_json_url, "/").into_owned()
}

fn report(verbose: bool, message: fmt::Arguments<'_>) {
  if verbose {
    tracing::info!("{}", message);
  } else {
    tracing::debug!("{}", message);
  }
}

//! Widget markup rendering and injection into rendered pages.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::models::ModelEntry;

const WIDGET_CONTAINER: &str = r#"<div id="waifu">
  <div id="waifu-message"></div>
  <div class="waifu-tool">
    <span class="icon-next"></span>
    <span class="icon-home"></span>
    <span class="icon-message"></span>
    <span class="icon-camera"></span>
    <span class="icon-volumeup"></span>
    <span class="icon-volumedown"></span>
    <span class="icon-about"></span>
    <span class="icon-cross"></span>
  </div>
  <canvas id="live2d2"></canvas>
  <canvas id="live2d4"></canvas>
</div>"#;

/// Inline script assigning the two runtime configuration globals.
pub fn inline_config_script(settings: &Map<String, Value>, models: &[ModelEntry]) -> String {
    let models: Vec<Value> = models
        .iter()
        .map(|entry| {
            json!({
                "name": entry.name,
                "message": entry.message,
                "version": entry.version.as_u8(),
            })
        })
        .collect();

    let text = format!(
        "live2d_settings={};live2d_models={};",
        Value::Object(settings.clone()),
        Value::Array(models)
    );
    text.replace("</", "<\\/")
}

/// Full widget markup: container, inline configuration and script tags.
pub fn render_widget_markup(config_script: &str, script_url: &str, waifu_url: &str) -> String {
    format!(
        "{container}\n<script>{config}</script>\n<script src=\"{script}\"></script>\n<script async type=\"module\" src=\"{waifu}\"></script>\n",
        container = WIDGET_CONTAINER,
        config = config_script,
        script = escape_attribute(script_url),
        waifu = escape_attribute(waifu_url),
    )
}

/// Insert `markup` immediately before the last closing body tag.
///
/// Returns `None` when the document has no closing body tag.
pub fn inject_before_body(html: &str, markup: &str) -> Option<String> {
    static BODY_END: OnceLock<Regex> = OnceLock::new();
    let pattern = BODY_END.get_or_init(|| Regex::new(r"(?i)</body\s*>").expect("invalid body regex"));

    let position = pattern.find_iter(html).last()?.start();
    let mut output = String::with_capacity(html.len() + markup.len());
    output.push_str(&html[..position]);
    output.push_str(markup);
    output.push_str(&html[position..]);
    Some(output)
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// A URL-relative directory under which copied assets are served.
///
/// The directory is kept separate from the site root: generator targets are relative to
/// the output directory, while injected URLs carry the site root prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishDir {
    site_root: String,
    relative: String,
}

impl PublishDir {
    /// Create a publish directory from a site root (e.g. `/` or `/blog/`) and a relative
    /// directory (e.g. `live2dw/lib/`).
    pub fn new(site_root: &str, relative: &str) -> Self {
        Self {
            site_root: normalise_site_root(site_root),
            relative: normalise_dir(relative),
        }
    }

    /// Site root every served URL starts with.
    pub fn site_root(&self) -> &str {
        &self.site_root
    }

    /// Directory relative to the site output, always ending in `/` unless empty.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Publish directory for a nested folder.
    pub fn join(&self, segment: &str) -> Self {
        Self {
            site_root: self.site_root.clone(),
            relative: normalise_dir(&format!("{}{}", self.relative, segment)),
        }
    }

    /// Output-relative copy target for a file inside this directory.
    ///
    /// `.` and `..` segments are collapsed lexically, so a texture shared by sibling
    /// models (`../shared/tex.png`) lands next to the model folder. Segments that climb
    /// above the output root are kept and rejected at install time.
    pub fn target_for(&self, file: &str) -> String {
        collapse_segments(&format!("{}{}", self.relative, normalise_relative_path(file)))
    }

    /// Served URL for a file inside this directory.
    pub fn url_for(&self, file: &str) -> String {
        format!("{}{}", self.site_root, self.target_for(file))
    }
}

/// Normalise the configured site root so it starts and ends with a single `/`.
pub fn normalise_site_root(root: &str) -> String {
    let trimmed = root.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// Convert a manifest-relative reference into a forward-slash path without `./` prefixes.
pub fn normalise_relative_path(path: &str) -> String {
    let mut value = path.trim().replace('\\', "/");
    while let Some(rest) = value.strip_prefix("./") {
        value = rest.to_string();
    }
    value.trim_start_matches('/').to_string()
}

fn collapse_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn normalise_dir(dir: &str) -> String {
    let value = normalise_relative_path(dir);
    let value = value.trim_end_matches('/');
    if value.is_empty() {
        String::new()
    } else {
        format!("{value}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_site_root_directory_and_file() {
        let publish = PublishDir::new("/", "live2dw/lib/");
        assert_eq!(publish.target_for("live2d_bundle.js"), "live2dw/lib/live2d_bundle.js");
        assert_eq!(publish.url_for("live2d_bundle.js"), "/live2dw/lib/live2d_bundle.js");
    }

    #[test]
    fn tolerates_missing_and_leading_slashes() {
        let publish = PublishDir::new("blog", "/live2dw/assets");
        assert_eq!(publish.site_root(), "/blog/");
        assert_eq!(publish.relative(), "live2dw/assets/");

        let publish = PublishDir::new("", "live2dw/assets");
        assert_eq!(publish.url_for("/a.png"), "/live2dw/assets/a.png");
    }

    #[test]
    fn nests_model_folders() {
        let publish = PublishDir::new("/", "live2dw/assets/").join("shizuku");
        assert_eq!(
            publish.url_for("shizuku.model.json"),
            "/live2dw/assets/shizuku/shizuku.model.json"
        );
    }

    #[test]
    fn collapses_parent_references_into_sibling_folders() {
        let publish = PublishDir::new("/", "live2dw/assets/koharu/");
        assert_eq!(publish.target_for("../shared/tex.png"), "live2dw/assets/shared/tex.png");
        assert_eq!(publish.target_for("motions/./../idle.mtn"), "live2dw/assets/koharu/idle.mtn");
        assert_eq!(publish.url_for("../shared/tex.png"), "/live2dw/assets/shared/tex.png");
    }

    #[test]
    fn keeps_parent_references_that_climb_above_the_output_root() {
        let publish = PublishDir::new("/", "live2dw/");
        assert_eq!(publish.target_for("../../escape.js"), "../escape.js");
    }

    #[test]
    fn normalises_backslashes_and_dot_prefixes() {
        assert_eq!(normalise_relative_path(".\\moc\\model.moc"), "moc/model.moc");
        assert_eq!(normalise_relative_path("././textures/a.png"), "textures/a.png");
    }

    #[test]
    fn normalises_site_roots() {
        assert_eq!(normalise_site_root(""), "/");
        assert_eq!(normalise_site_root("/"), "/");
        assert_eq!(normalise_site_root("/blog"), "/blog/");
    }
}

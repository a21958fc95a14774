//! Construction of copy-on-build generator descriptors.

use std::path::PathBuf;

use crate::error::{Result, WidgetError};
use crate::models::AssetGenerator;

/// Pair a source file with the output-relative path it will be served from.
///
/// No filesystem access happens here; copy failures surface when the generator is
/// installed.
pub fn build_generator(
    source: impl Into<PathBuf>,
    target: impl Into<String>,
) -> Result<AssetGenerator> {
    let source = source.into();
    let target = target.into();

    if source.as_os_str().is_empty() {
        return Err(WidgetError::InvalidArgument("generator source path is empty"));
    }
    if target.is_empty() {
        return Err(WidgetError::InvalidArgument("generator target path is empty"));
    }

    Ok(AssetGenerator { source, target })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_source_and_target() {
        let generator =
            build_generator("/site/lib/waifu-tips.js", "live2dw/lib/waifu-tips.js").unwrap();
        assert_eq!(generator.source, PathBuf::from("/site/lib/waifu-tips.js"));
        assert_eq!(generator.target, "live2dw/lib/waifu-tips.js");
    }

    #[test]
    fn rejects_empty_arguments() {
        assert!(matches!(
            build_generator("", "live2dw/lib/a.js"),
            Err(WidgetError::InvalidArgument(_))
        ));
        assert!(matches!(
            build_generator("/site/a.js", String::new()),
            Err(WidgetError::InvalidArgument(_))
        ));
    }
}

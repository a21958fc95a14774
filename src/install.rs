//! Publishing generators into a site output directory and patching rendered pages.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use same_file::is_same_file;

use crate::builder::WidgetBuild;
use crate::models::AssetGenerator;

/// Copy every generator source into `output_dir`, returning the installed paths.
pub fn install_generators(output_dir: &Path, generators: &[AssetGenerator]) -> Result<Vec<PathBuf>> {
  let mut installed = Vec::with_capacity(generators.len());

  for generator in generators {
    let destination = output_dir.join(checked_target(&generator.target)?);
    if let Some(parent) = destination.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    install_asset(&generator.source, &destination).with_context(|| {
      format!(
        "failed to install {} to {}",
        generator.source.display(),
        destination.display()
      )
    })?;
    tracing::debug!("installed {}", generator.target);
    installed.push(destination);
  }

  Ok(installed)
}

/// Inject the widget markup into every `*.html` page below `output_dir`.
///
/// Returns the number of pages that changed. Nothing is touched in tag mode.
pub fn patch_site_pages(output_dir: &Path, build: &WidgetBuild) -> Result<usize> {
  if build.tag_mode {
    return Ok(0);
  }

  let mut pages = Vec::new();
  collect_html_files(output_dir, &mut pages)?;

  let mut patched = 0;
  for page in pages {
    let html = fs::read_to_string(&page)
      .with_context(|| format!("failed to read {}", page.display()))?;
    let updated = build.inject(&html);
    if updated != html {
      fs::write(&page, updated).with_context(|| format!("failed to write {}", page.display()))?;
      patched += 1;
    }
  }

  Ok(patched)
}

fn checked_target(target: &str) -> Result<PathBuf> {
  let path = PathBuf::from(target);
  let escapes = path.components().any(|component| {
    matches!(
      component,
      Component::ParentDir | Component::RootDir | Component::Prefix(_)
    )
  });
  if escapes {
    bail!("generator target `{target}` escapes the output directory");
  }
  Ok(path)
}

fn collect_html_files(dir: &Path, pages: &mut Vec<PathBuf>) -> Result<()> {
  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
    Err(err) => return Err(err).with_context(|| format!("failed to read {}", dir.display())),
  };

  for entry in entries {
    let entry = entry?;
    let path = entry.path();
    let file_type = entry.file_type()?;
    if file_type.is_dir() {
      collect_html_files(&path, pages)?;
    } else if file_type.is_file()
      && path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    {
      pages.push(path);
    }
  }

  pages.sort();
  Ok(())
}

fn install_asset(source: &Path, destination: &Path) -> std::io::Result<()> {
  if destination.exists() {
    if is_same_file(source, destination)? {
      return Ok(());
    }
    fs::remove_file(destination)?;
  }

  match fs::hard_link(source, destination) {
    Ok(_) => Ok(()),
    Err(err) => {
      if err.kind() == ErrorKind::AlreadyExists {
        Ok(())
      } else {
        fs::copy(source, destination).map(|_| ())
      }
    }
  }
}

//! Locate a model descriptor inside a directory and turn it into copy instructions.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::asset_paths::{PublishDir, normalise_relative_path};
use crate::error::{Result, WidgetError};
use crate::generator::build_generator;
use crate::manifest::descriptor::DescriptorKind;
use crate::models::{ModelAssets, ModelManifest};

/// Find the single `*.model.json` / `*.model3.json` file at the top of `dir`.
pub fn locate_descriptor(dir: &Path) -> Result<(String, DescriptorKind)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(WidgetError::DescriptorNotFound {
                dir: dir.to_path_buf(),
            });
        }
        Err(err) => return Err(WidgetError::io(dir, err)),
    };

    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        if !entry.file_type().is_ok_and(|ft| ft.is_file()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some(kind) = DescriptorKind::from_file_name(&name) {
            candidates.push((name, kind));
        }
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    match candidates.len() {
        0 => Err(WidgetError::DescriptorNotFound {
            dir: dir.to_path_buf(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(WidgetError::AmbiguousDescriptor {
            dir: dir.to_path_buf(),
            candidates: candidates.into_iter().map(|(name, _)| name).collect(),
        }),
    }
}

/// Parse the directory's descriptor into an ordered, de-duplicated file list.
///
/// The descriptor itself is always the first entry. Referenced files are not checked
/// for existence.
pub fn read_manifest(dir: &Path) -> Result<ModelManifest> {
    let (descriptor, kind) = locate_descriptor(dir)?;
    let model_json_path = dir.join(&descriptor);
    let content =
        fs::read_to_string(&model_json_path).map_err(|err| WidgetError::io(&model_json_path, err))?;
    let references = kind
        .referenced_files(&content)
        .map_err(|source| WidgetError::Parse {
            path: model_json_path.clone(),
            source,
        })?;

    let mut seen = BTreeSet::new();
    let mut files = Vec::new();
    for value in std::iter::once(descriptor).chain(references) {
        let relative = normalise_relative_path(&value);
        if relative.is_empty() {
            continue;
        }
        if seen.insert(relative.clone()) {
            files.push(relative);
        }
    }

    Ok(ModelManifest {
        files,
        model_json_path,
    })
}

/// Load the model in `dir` and map each of its files into `publish`.
pub fn load_manifest(dir: &Path, publish: &PublishDir) -> Result<ModelAssets> {
    let root = absolute_dir(dir)?;
    let manifest = read_manifest(&root)?;

    let descriptor = manifest
        .descriptor()
        .ok_or_else(|| WidgetError::DescriptorNotFound { dir: root.clone() })?;

    let generators = manifest
        .files
        .iter()
        .map(|relative| build_generator(root.join(relative), publish.target_for(relative)))
        .collect::<Result<Vec<_>>>()?;

    Ok(ModelAssets {
        model_json_url: publish.url_for(descriptor),
        generators,
    })
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    match fs::canonicalize(dir) {
        Ok(path) => Ok(path),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(WidgetError::DescriptorNotFound {
            dir: dir.to_path_buf(),
        }),
        Err(err) => Err(WidgetError::io(dir, err)),
    }
}

//! Serde views of the two model descriptor schemas.
//!
//! Only the keys that reference files are modelled; everything else in a descriptor
//! (layout, hit areas, parameter groups) is ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Descriptor schema selected from the file name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// `*.model.json`
    ModelJson,
    /// `*.model3.json`
    Model3Json,
}

impl DescriptorKind {
    /// Recognise a descriptor file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".model3.json") {
            Some(Self::Model3Json)
        } else if name.ends_with(".model.json") {
            Some(Self::ModelJson)
        } else {
            None
        }
    }

    /// Parse descriptor content and return the referenced files in declaration order.
    pub fn referenced_files(self, content: &str) -> serde_json::Result<Vec<String>> {
        match self {
            Self::ModelJson => {
                serde_json::from_str::<ModelJsonDescriptor>(content).map(|d| d.referenced_files())
            }
            Self::Model3Json => {
                serde_json::from_str::<Model3JsonDescriptor>(content).map(|d| d.referenced_files())
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelJsonDescriptor {
    model: Option<String>,
    textures: Vec<String>,
    physics: Option<String>,
    pose: Option<String>,
    expressions: Vec<ModelJsonExpression>,
    motions: BTreeMap<String, Vec<ModelJsonMotion>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelJsonExpression {
    file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelJsonMotion {
    file: Option<String>,
    sound: Option<String>,
}

impl ModelJsonDescriptor {
    fn referenced_files(self) -> Vec<String> {
        let mut files = Vec::new();
        files.extend(self.model);
        files.extend(self.textures);
        files.extend(self.physics);
        files.extend(self.pose);
        files.extend(self.expressions.into_iter().filter_map(|e| e.file));
        for motion in self.motions.into_values().flatten() {
            files.extend(motion.file);
            files.extend(motion.sound);
        }
        files
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Model3JsonDescriptor {
    file_references: Model3FileReferences,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Model3FileReferences {
    moc: Option<String>,
    textures: Vec<String>,
    physics: Option<String>,
    pose: Option<String>,
    expressions: Vec<Model3Expression>,
    motions: BTreeMap<String, Vec<Model3Motion>>,
    user_data: Option<String>,
    display_info: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Model3Expression {
    file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Model3Motion {
    file: Option<String>,
    sound: Option<String>,
}

impl Model3JsonDescriptor {
    fn referenced_files(self) -> Vec<String> {
        let refs = self.file_references;
        let mut files = Vec::new();
        files.extend(refs.moc);
        files.extend(refs.textures);
        files.extend(refs.physics);
        files.extend(refs.pose);
        files.extend(refs.expressions.into_iter().filter_map(|e| e.file));
        for motion in refs.motions.into_values().flatten() {
            files.extend(motion.file);
            files.extend(motion.sound);
        }
        files.extend(refs.user_data);
        files.extend(refs.display_info);
        files
    }
}

//! Model descriptor discovery and parsing broken into focused submodules.

mod descriptor;
mod loading;

pub use descriptor::DescriptorKind;
pub use loading::{load_manifest, locate_descriptor, read_manifest};

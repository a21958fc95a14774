//! Helpers for building served paths and normalising asset references.
//!
//! Every path produced here uses forward slashes, regardless of the native separator
//! used when the files were discovered on disk, so generator targets and injected URLs
//! are identical on every platform.

mod filters;
mod publish;

pub use filters::is_external_reference;
pub use publish::{PublishDir, normalise_relative_path, normalise_site_root};

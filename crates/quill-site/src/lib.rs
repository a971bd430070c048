//! Site assembly for quill.
//!
//! Takes the pages produced by `quill-content` and turns them into a
//! deployable output tree: property-based collections, template
//! rendering, output writing, and the one-shot build orchestrator.

pub mod builder;
pub mod collections;
pub mod config;
pub mod templates;
pub mod writer;

pub use builder::{BuildError, BuildReport, SiteBuilder};
pub use collections::{
    build_collection, clean_string, pages_with_property_equals, Collection, CollectionContext,
    ValueGroup,
};
pub use config::{CollectionDef, ConfigError, Mode, PropertyEquals, RawConfig, SiteConfig};
pub use templates::{RenderError, Renderer};
pub use writer::WriteError;

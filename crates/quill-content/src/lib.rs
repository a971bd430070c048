//! Content parsing for quill.
//!
//! This crate turns front-matter-annotated markdown files into fully
//! populated [`Page`] records: front matter extraction, date parsing,
//! markdown conversion, output path/URL resolution, and recursive
//! scanning of a content tree.

pub mod dates;
pub mod frontmatter;
pub mod markdown;
pub mod page;
pub mod paths;
pub mod scanner;

pub use frontmatter::FrontmatterError;
pub use page::{
    parse_page, Membership, Page, PageError, PageRef, PageSource, ParseContext, PropertyValue,
};
pub use paths::{resolve_output, resolve_url, PathError};
pub use scanner::{scan, ScanError};

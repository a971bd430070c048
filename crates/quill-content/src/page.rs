//! The page model and the single-file parser.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_yaml::Value;

use crate::frontmatter::{self, FrontmatterError};
use crate::paths::{self, PathError};
use crate::{dates, markdown};

/// Where a page came from.
///
/// Only `File` pages point at a staged source file that the build may
/// delete after a successful write; `Synthetic` pages are derived by
/// the collection engine and have no file behind them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    File(PathBuf),
    Synthetic,
}

/// A lightweight reference to another page, safe to embed in template
/// contexts (value-page listings, membership cross-links, menus).
#[derive(Debug, Clone, Serialize)]
pub struct PageRef {
    pub title: String,
    pub url: String,
    pub date: String,
}

impl PageRef {
    pub fn of(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            url: page.url.clone(),
            date: page.date_display.clone(),
        }
    }
}

/// A collection value a page belongs to, recorded back onto the page
/// after collection derivation.
#[derive(Debug, Clone, Serialize)]
pub struct Membership {
    pub collection: String,
    pub value: String,
    pub url: String,
}

/// The shape of a page property as seen by the collection engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Scalar(String),
    List(Vec<String>),
    Unsupported,
}

/// One page of the site, source-backed or synthesized.
#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    /// Structured timestamp; all sorting compares this field.
    pub date: NaiveDateTime,
    /// Formatted form of `date`, empty until the build formats it
    /// after the final sort.
    pub date_display: String,
    pub template: String,
    pub tags: Vec<String>,
    /// Body text, already converted to HTML.
    pub content: String,
    pub output_path: PathBuf,
    pub url: String,
    pub source: PageSource,
    /// Front-matter keys beyond the reserved ones, surfaced verbatim
    /// to templates.
    pub extra: BTreeMap<String, Value>,
    /// For synthetic collection pages: the member pages this page
    /// lists (exposed to templates as `pages`).
    pub listing: Vec<PageRef>,
    /// Collection values this page was grouped under.
    pub memberships: Vec<Membership>,
}

impl Page {
    /// Construct a synthetic page (collection value/root page).
    pub fn synthetic(
        title: String,
        date: NaiveDateTime,
        date_display: String,
        template: String,
        output_path: PathBuf,
        url: String,
        listing: Vec<PageRef>,
    ) -> Self {
        Self {
            title,
            date,
            date_display,
            template,
            tags: Vec::new(),
            content: String::new(),
            output_path,
            url,
            source: PageSource::Synthetic,
            extra: BTreeMap::new(),
            listing,
            memberships: Vec::new(),
        }
    }

    /// Look up a groupable property by name.
    ///
    /// Returns `None` when the page does not carry the property at
    /// all; `Unsupported` when it carries something that is neither a
    /// scalar nor a sequence of scalars.
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        if name == "tags" {
            if self.tags.is_empty() {
                return None;
            }
            return Some(PropertyValue::List(self.tags.clone()));
        }

        self.extra.get(name).map(classify_property)
    }
}

fn classify_property(value: &Value) -> PropertyValue {
    match value {
        Value::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match scalar_to_string(item) {
                    Some(s) => out.push(s),
                    None => return PropertyValue::Unsupported,
                }
            }
            PropertyValue::List(out)
        }
        other => match scalar_to_string(other) {
            Some(s) => PropertyValue::Scalar(s),
            None => PropertyValue::Unsupported,
        },
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Errors from parsing a single content file. Every variant is fatal
/// to the whole build.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("{path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },

    #[error("{path}: missing required field '{field}'")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{path}: field '{field}' must be a string")]
    InvalidField { path: PathBuf, field: &'static str },

    #[error("{path}: unrecognized date '{value}'")]
    InvalidDate { path: PathBuf, value: String },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Everything `parse_page` needs beyond the file itself: the roots it
/// resolves paths against and the configured defaults.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub source_root: &'a Path,
    pub output_root: &'a Path,
    pub base_url: &'a str,
    /// Content file extension, without the dot (e.g. `md`).
    pub content_ext: &'a str,
    /// Output file extension, without the dot (e.g. `html`).
    pub output_ext: &'a str,
    pub default_template: &'a str,
}

/// Parse one raw content file into a fully populated [`Page`].
pub fn parse_page(raw: &str, source_path: &Path, ctx: &ParseContext) -> Result<Page, PageError> {
    let (mut meta, body) = frontmatter::split(raw).map_err(|source| PageError::Frontmatter {
        path: source_path.to_path_buf(),
        source,
    })?;

    let title = take_string(&mut meta, "title", source_path)?
        .ok_or_else(|| PageError::MissingField {
            path: source_path.to_path_buf(),
            field: "title",
        })?;

    let date_raw = take_string(&mut meta, "date", source_path)?
        .ok_or_else(|| PageError::MissingField {
            path: source_path.to_path_buf(),
            field: "date",
        })?;
    let date = dates::parse(&date_raw).ok_or_else(|| PageError::InvalidDate {
        path: source_path.to_path_buf(),
        value: date_raw,
    })?;

    let template = take_string(&mut meta, "template", source_path)?
        .unwrap_or_else(|| ctx.default_template.to_string());

    let tags = take_tags(&mut meta, source_path);

    let extra: BTreeMap<String, Value> = meta
        .into_iter()
        .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v)))
        .collect();

    let output_path = paths::resolve_output(
        source_path,
        ctx.source_root,
        ctx.output_root,
        ctx.output_ext,
    )?;
    let url = paths::resolve_url(&output_path, ctx.output_root, ctx.base_url)?;

    Ok(Page {
        title,
        date,
        date_display: String::new(),
        template,
        tags,
        content: markdown::to_html(body),
        output_path,
        url,
        source: PageSource::File(source_path.to_path_buf()),
        extra,
        listing: Vec::new(),
        memberships: Vec::new(),
    })
}

fn take_string(
    meta: &mut serde_yaml::Mapping,
    field: &'static str,
    path: &Path,
) -> Result<Option<String>, PageError> {
    match meta.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(&value)
            .map(Some)
            .ok_or_else(|| PageError::InvalidField {
                path: path.to_path_buf(),
                field,
            }),
    }
}

fn take_tags(meta: &mut serde_yaml::Mapping, path: &Path) -> Vec<String> {
    match meta.remove("tags") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => match classify_property(&value) {
            PropertyValue::List(tags) => tags,
            PropertyValue::Scalar(tag) => vec![tag],
            // An odd shape excludes the page from tag grouping but
            // never fails the build.
            PropertyValue::Unsupported => {
                tracing::warn!(
                    "{}: 'tags' is neither a scalar nor a sequence; ignoring it",
                    path.display()
                );
                Vec::new()
            }
        },
    }
}

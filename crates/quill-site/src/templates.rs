//! Template resolution and rendering.
//!
//! Thin wrapper over minijinja: templates live as `<name>.html` files
//! in one directory, and partials (`{% include %}`) resolve from that
//! same directory through the loader.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use minijinja::{context, AutoEscape, Environment, ErrorKind};
use serde::Serialize;

use quill_content::{Membership, Page, PageRef};

use crate::config::SiteConfig;

/// Template file extension, shared by templates and partials.
pub const TEMPLATE_EXT: &str = "html";

/// Errors resolving or expanding a template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template '{name}' not found in {dir}")]
    TemplateNotFound { name: String, dir: PathBuf },

    #[error("failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Renders pages against the on-disk template directory.
pub struct Renderer {
    env: Environment<'static>,
    template_dir: PathBuf,
}

impl Renderer {
    pub fn new(template_dir: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(template_dir));
        // Mustache-style expansion: substitutions are inserted
        // verbatim. Without this, the `.html` extension would turn on
        // HTML entity escaping and corrupt URLs and the CSS artifact.
        env.set_auto_escape_callback(|_| AutoEscape::None);

        Self {
            env,
            template_dir: template_dir.to_path_buf(),
        }
    }

    /// Render one page. The data context is always the same triple:
    /// `site`, `page`, and `pages` — the complete, sorted,
    /// collection-augmented master list — plus the site `menu`.
    pub fn render_page(
        &self,
        template: &str,
        site: &SiteConfig,
        page: &Page,
        all_pages: &[Page],
        menu: &[PageRef],
    ) -> Result<String, RenderError> {
        let name = template_file(template);
        let tmpl = self.get(&name)?;

        let all: Vec<minijinja::Value> = all_pages.iter().map(page_value).collect();

        tmpl.render(context! {
            site => site,
            page => page_value(page),
            pages => all,
            menu => menu,
        })
        .map_err(|source| RenderError::Render { name, source })
    }

    /// Render a template against the site config alone (the
    /// stylesheet artifact).
    pub fn render_site(&self, template: &str, site: &SiteConfig) -> Result<String, RenderError> {
        let name = template_file(template);
        let tmpl = self.get(&name)?;

        tmpl.render(context! { site => site })
            .map_err(|source| RenderError::Render { name, source })
    }

    fn get(&self, name: &str) -> Result<minijinja::Template<'_, '_>, RenderError> {
        self.env.get_template(name).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                RenderError::TemplateNotFound {
                    name: name.to_string(),
                    dir: self.template_dir.clone(),
                }
            } else {
                RenderError::Render {
                    name: name.to_string(),
                    source: e,
                }
            }
        })
    }
}

fn template_file(template: &str) -> String {
    format!("{template}.{TEMPLATE_EXT}")
}

/// What a template sees for one page: the fixed fields plus every
/// extra front-matter key, flattened alongside them. `date` is the
/// formatted display string; `pages` is the listing of a synthetic
/// collection page (empty otherwise).
#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    date: &'a str,
    url: &'a str,
    template: &'a str,
    tags: &'a [String],
    content: &'a str,
    pages: &'a [PageRef],
    memberships: &'a [Membership],
    #[serde(flatten)]
    extra: &'a BTreeMap<String, serde_yaml::Value>,
}

fn page_value(page: &Page) -> minijinja::Value {
    minijinja::Value::from_serialize(PageContext {
        title: &page.title,
        date: &page.date_display,
        url: &page.url,
        template: &page.template,
        tags: &page.tags,
        content: &page.content,
        pages: &page.listing,
        memberships: &page.memberships,
        extra: &page.extra,
    })
}

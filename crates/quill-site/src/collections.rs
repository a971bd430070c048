//! The collection engine: grouping pages by a shared property and
//! synthesizing the derived index pages.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDateTime;

use quill_content::paths::{self, PathError};
use quill_content::{dates, Membership, Page, PageRef, PropertyValue};

use crate::config::CollectionDef;

/// All pages sharing one configured grouping property.
///
/// A collection never owns pages: `members`, `values`, `root_page`,
/// and `value_pages` are indices into the master page list, which is
/// also where the synthesized pages are appended.
#[derive(Debug)]
pub struct Collection {
    pub name: String,
    /// Pages possessing the property, in master-list order.
    pub members: Vec<usize>,
    /// One group per distinct property value, in first-seen order.
    pub values: Vec<ValueGroup>,
    /// Synthesized root index page, if a root template is configured.
    pub root_page: Option<usize>,
    /// Synthesized per-value index pages, parallel to `values`.
    pub value_pages: Vec<usize>,
}

/// One distinct value of the grouping property and its pages.
#[derive(Debug)]
pub struct ValueGroup {
    pub name: String,
    pub members: Vec<usize>,
}

/// Everything the engine needs to mint output paths and URLs for the
/// pages it synthesizes.
#[derive(Debug, Clone, Copy)]
pub struct CollectionContext<'a> {
    pub output_root: &'a Path,
    pub base_url: &'a str,
    pub output_ext: &'a str,
    pub date_format: &'a str,
    pub default_template: &'a str,
}

/// Build one configured collection over the master page list.
///
/// Synthesized value/root pages are appended to `pages` so they render
/// and write like ordinary content, and every grouped page gets a
/// [`Membership`] cross-link back to the values it appeared under.
pub fn build_collection(
    pages: &mut Vec<Page>,
    name: &str,
    def: &CollectionDef,
    ctx: &CollectionContext,
    build_time: NaiveDateTime,
) -> Result<Collection, PathError> {
    if let Some(eq) = &def.property_equals {
        return build_equals_collection(pages, name, def, eq, ctx, build_time);
    }

    if !def.has_property {
        tracing::warn!(
            "collection '{}' sets neither hasProperty nor propertyEquals; nothing to group",
            name
        );
        return Ok(Collection {
            name: name.to_string(),
            members: Vec::new(),
            values: Vec::new(),
            root_page: None,
            value_pages: Vec::new(),
        });
    }

    // Flatten property occurrences across all pages. Distinct value
    // names are kept in first-seen order so the output tree is
    // deterministic run to run.
    let mut members = Vec::new();
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, page) in pages.iter().enumerate() {
        let Some(value) = page.property(name) else {
            continue;
        };

        let occurrences = match value {
            PropertyValue::Scalar(s) => vec![s],
            PropertyValue::List(items) => items,
            PropertyValue::Unsupported => {
                tracing::warn!(
                    "page '{}' has an unsupported '{}' value; skipping it in this grouping",
                    page.title,
                    name
                );
                continue;
            }
        };

        members.push(idx);
        for occurrence in occurrences {
            if seen.insert(occurrence.clone()) {
                order.push(occurrence);
            }
        }
    }

    let values: Vec<ValueGroup> = order
        .into_iter()
        .map(|value| {
            let group_members = members
                .iter()
                .copied()
                .filter(|&idx| property_matches(&pages[idx], name, &value))
                .collect();
            ValueGroup {
                name: value,
                members: group_members,
            }
        })
        .collect();

    // Synthesize one index page per distinct value.
    let date_display = dates::format(&build_time, ctx.date_format);
    let value_template = def
        .prop_value_template
        .as_deref()
        .unwrap_or(ctx.default_template);

    let mut synthesized: Vec<Page> = Vec::with_capacity(values.len() + 1);
    let mut memberships: Vec<(usize, Membership)> = Vec::new();

    for group in &values {
        let output_path = ctx
            .output_root
            .join(name)
            .join(format!("{}.{}", clean_string(&group.name), ctx.output_ext));
        let url = paths::resolve_url(&output_path, ctx.output_root, ctx.base_url)?;

        let listing = group.members.iter().map(|&i| PageRef::of(&pages[i])).collect();

        for &idx in &group.members {
            memberships.push((
                idx,
                Membership {
                    collection: name.to_string(),
                    value: group.name.clone(),
                    url: url.clone(),
                },
            ));
        }

        synthesized.push(Page::synthetic(
            group.name.clone(),
            build_time,
            date_display.clone(),
            value_template.to_string(),
            output_path,
            url,
            listing,
        ));
    }

    let root = synthesize_root(pages, &members, name, def, ctx, build_time)?;

    for (idx, membership) in memberships {
        pages[idx].memberships.push(membership);
    }

    let mut value_pages = Vec::with_capacity(synthesized.len());
    for page in synthesized {
        value_pages.push(pages.len());
        pages.push(page);
    }

    let root_page = root.map(|page| {
        pages.push(page);
        pages.len() - 1
    });

    Ok(Collection {
        name: name.to_string(),
        members,
        values,
        root_page,
        value_pages,
    })
}

/// The `propertyEquals` mode: a flat named list of pages whose
/// property scalar-equals a fixed value. Only the root page is
/// synthesized.
fn build_equals_collection(
    pages: &mut Vec<Page>,
    name: &str,
    def: &CollectionDef,
    eq: &crate::config::PropertyEquals,
    ctx: &CollectionContext,
    build_time: NaiveDateTime,
) -> Result<Collection, PathError> {
    let members = pages_with_property_equals(pages, &eq.property, &eq.value);

    let root = synthesize_root(pages, &members, name, def, ctx, build_time)?;

    let root_page = root.map(|page| {
        pages.push(page);
        pages.len() - 1
    });

    Ok(Collection {
        name: name.to_string(),
        members,
        values: Vec::new(),
        root_page,
        value_pages: Vec::new(),
    })
}

fn synthesize_root(
    pages: &[Page],
    members: &[usize],
    name: &str,
    def: &CollectionDef,
    ctx: &CollectionContext,
    build_time: NaiveDateTime,
) -> Result<Option<Page>, PathError> {
    let Some(template) = &def.root_template else {
        return Ok(None);
    };

    let output_path = ctx
        .output_root
        .join(format!("all{}.{}", clean_string(name), ctx.output_ext));
    let url = paths::resolve_url(&output_path, ctx.output_root, ctx.base_url)?;

    let title = def
        .root_title
        .clone()
        .unwrap_or_else(|| format!("All {name}"));
    let listing = members.iter().map(|&i| PageRef::of(&pages[i])).collect();

    Ok(Some(Page::synthetic(
        title,
        build_time,
        dates::format(&build_time, ctx.date_format),
        template.clone(),
        output_path,
        url,
        listing,
    )))
}

/// Indices of pages whose `property` scalar-equals `value`.
pub fn pages_with_property_equals(pages: &[Page], property: &str, value: &str) -> Vec<usize> {
    pages
        .iter()
        .enumerate()
        .filter(|(_, page)| {
            matches!(page.property(property), Some(PropertyValue::Scalar(s)) if s == value)
        })
        .map(|(idx, _)| idx)
        .collect()
}

fn property_matches(page: &Page, property: &str, value: &str) -> bool {
    match page.property(property) {
        Some(PropertyValue::Scalar(s)) => s == value,
        Some(PropertyValue::List(items)) => items.iter().any(|i| i == value),
        _ => false,
    }
}

/// Reduce an arbitrary label to a filesystem- and URL-safe slug:
/// every character outside `[A-Za-z0-9 ]` becomes `_`, then spaces
/// become `_`. Idempotent. Two distinct values that clean to the same
/// slug are an accepted limitation.
pub fn clean_string(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_content::PageSource;
    use serde_yaml::Value;
    use std::path::PathBuf;

    fn page(title: &str, date: &str) -> Page {
        Page {
            title: title.to_string(),
            date: dates::parse(date).unwrap(),
            date_display: date.to_string(),
            template: "default".to_string(),
            tags: Vec::new(),
            content: String::new(),
            output_path: PathBuf::from(format!("dest/{title}.html")),
            url: format!("https://example.org/{title}.html"),
            source: PageSource::File(PathBuf::from(format!("dest/{title}.md"))),
            extra: Default::default(),
            listing: Vec::new(),
            memberships: Vec::new(),
        }
    }

    fn tagged(title: &str, date: &str, tags: &[&str]) -> Page {
        let mut p = page(title, date);
        p.tags = tags.iter().map(|t| t.to_string()).collect();
        p
    }

    fn ctx() -> CollectionContext<'static> {
        CollectionContext {
            output_root: Path::new("dest"),
            base_url: "https://example.org",
            output_ext: "html",
            date_format: "%Y-%m-%d",
            default_template: "default",
        }
    }

    fn def_with_values() -> CollectionDef {
        CollectionDef {
            has_property: true,
            prop_value_template: Some("tag".to_string()),
            ..Default::default()
        }
    }

    fn build_time() -> NaiveDateTime {
        dates::parse("2024-06-01 12:00:00").unwrap()
    }

    #[test]
    fn groups_multi_valued_property() {
        let mut pages = vec![
            tagged("A", "2024-01-02", &["x", "y"]),
            tagged("B", "2024-01-01", &["y"]),
        ];

        let col =
            build_collection(&mut pages, "tags", &def_with_values(), &ctx(), build_time())
                .unwrap();

        assert_eq!(col.members, vec![0, 1]);
        assert_eq!(col.values.len(), 2);
        assert_eq!(col.values[0].name, "x");
        assert_eq!(col.values[0].members, vec![0]);
        assert_eq!(col.values[1].name, "y");
        assert_eq!(col.values[1].members, vec![0, 1]);
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let mut pages = vec![
            tagged("A", "2024-01-03", &["zebra", "apple"]),
            tagged("B", "2024-01-02", &["apple", "mango"]),
        ];

        let col =
            build_collection(&mut pages, "tags", &def_with_values(), &ctx(), build_time())
                .unwrap();

        let names: Vec<_> = col.values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn value_pages_are_appended_and_populated() {
        let mut pages = vec![tagged("A", "2024-01-02", &["rust"])];

        let col =
            build_collection(&mut pages, "tags", &def_with_values(), &ctx(), build_time())
                .unwrap();

        assert_eq!(pages.len(), 2);
        let value_page = &pages[col.value_pages[0]];
        assert_eq!(value_page.title, "rust");
        assert_eq!(value_page.template, "tag");
        assert_eq!(value_page.output_path, PathBuf::from("dest/tags/rust.html"));
        assert_eq!(value_page.url, "https://example.org/tags/rust.html");
        assert_eq!(value_page.source, PageSource::Synthetic);
        assert_eq!(value_page.date_display, "2024-06-01");
        assert_eq!(value_page.listing.len(), 1);
        assert_eq!(value_page.listing[0].title, "A");
    }

    #[test]
    fn members_gain_membership_cross_links() {
        let mut pages = vec![tagged("A", "2024-01-02", &["x", "y"])];

        build_collection(&mut pages, "tags", &def_with_values(), &ctx(), build_time())
            .unwrap();

        let links = &pages[0].memberships;
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].collection, "tags");
        assert_eq!(links[0].value, "x");
        assert_eq!(links[0].url, "https://example.org/tags/x.html");
        assert_eq!(links[1].value, "y");
    }

    #[test]
    fn unsupported_value_is_skipped_not_fatal() {
        let mut with_mapping = page("Odd", "2024-01-01");
        with_mapping.extra.insert(
            "topic".to_string(),
            serde_yaml::from_str::<Value>("{nested: true}").unwrap(),
        );
        let mut scalar = page("Plain", "2024-01-02");
        scalar
            .extra
            .insert("topic".to_string(), Value::from("news"));

        let mut pages = vec![with_mapping, scalar];
        let col =
            build_collection(&mut pages, "topic", &def_with_values(), &ctx(), build_time())
                .unwrap();

        // Only the scalar page participates; the odd one still exists
        // in the master list.
        assert_eq!(col.members, vec![1]);
        assert_eq!(col.values.len(), 1);
        assert_eq!(col.values[0].name, "news");
        assert_eq!(pages[0].title, "Odd");
    }

    #[test]
    fn root_page_is_synthesized_when_configured() {
        let def = CollectionDef {
            has_property: true,
            prop_value_template: Some("tag".to_string()),
            root_template: Some("tags".to_string()),
            root_title: Some("Every tag".to_string()),
            ..Default::default()
        };
        let mut pages = vec![tagged("A", "2024-01-02", &["x"])];

        let col = build_collection(&mut pages, "tags", &def, &ctx(), build_time()).unwrap();

        let root = &pages[col.root_page.unwrap()];
        assert_eq!(root.title, "Every tag");
        assert_eq!(root.template, "tags");
        assert_eq!(root.output_path, PathBuf::from("dest/alltags.html"));
        assert_eq!(root.listing.len(), 1);
    }

    #[test]
    fn no_root_template_means_no_root_page() {
        let mut pages = vec![tagged("A", "2024-01-02", &["x"])];

        let col =
            build_collection(&mut pages, "tags", &def_with_values(), &ctx(), build_time())
                .unwrap();

        assert!(col.root_page.is_none());
    }

    #[test]
    fn property_equals_builds_flat_collection() {
        let mut a = page("A", "2024-01-02");
        a.extra.insert("kind".to_string(), Value::from("post"));
        let mut b = page("B", "2024-01-01");
        b.extra.insert("kind".to_string(), Value::from("draft"));
        let def = CollectionDef {
            property_equals: Some(crate::config::PropertyEquals {
                property: "kind".to_string(),
                value: "post".to_string(),
            }),
            root_template: Some("posts".to_string()),
            ..Default::default()
        };

        let mut pages = vec![a, b];
        let col = build_collection(&mut pages, "posts", &def, &ctx(), build_time()).unwrap();

        assert_eq!(col.members, vec![0]);
        assert!(col.values.is_empty());
        assert!(col.value_pages.is_empty());
        let root = &pages[col.root_page.unwrap()];
        assert_eq!(root.listing.len(), 1);
        assert_eq!(root.listing[0].title, "A");
    }

    #[test]
    fn definition_without_a_mode_groups_nothing() {
        let mut pages = vec![tagged("A", "2024-01-02", &["x"])];

        let col = build_collection(
            &mut pages,
            "tags",
            &CollectionDef::default(),
            &ctx(),
            build_time(),
        )
        .unwrap();

        assert!(col.members.is_empty());
        assert!(col.values.is_empty());
        assert!(col.root_page.is_none());
        // Nothing was appended to the master list.
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn clean_string_sanitizes() {
        assert_eq!(clean_string("Rust & Friends"), "Rust___Friends");
        assert_eq!(clean_string("c++"), "c__");
        assert_eq!(clean_string("plain"), "plain");
    }

    #[test]
    fn clean_string_is_idempotent() {
        for s in ["Rust & Friends", "c++", "a b c", "weird/π/name"] {
            let once = clean_string(s);
            assert_eq!(clean_string(&once), once);
        }
    }
}

//! Static copy of the published handbook.
//!
//! Renders `index.html` plus one `<slug>.html` per published page with tera
//! templates. The default templates are compiled in; a template directory
//! may override `base.html` and `page.html` individually.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use handbook_shared::{
    page_url, Breadcrumb, CmsSettings, Design, NodeDocument, PageTree, TreeError, HOME_TITLE,
    HOME_URL,
};
use serde::Serialize;
use tera::{Context, Tera};
use tokio::fs;

use crate::media::UPLOADS_URL_PREFIX;
use crate::sanitize::HtmlSanitizer;

const BASE_TEMPLATE: &str = include_str!("../templates/base.html");
const PAGE_TEMPLATE: &str = include_str!("../templates/page.html");
const TEMPLATE_NAMES: [&str; 2] = ["base.html", "page.html"];

#[derive(Debug, thiserror::Error)]
pub enum SiteGenError {
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Outcome of one [`SiteGenerator::generate`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub out_dir: PathBuf,
    /// Generated page files, not counting `index.html`.
    pub pages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    title: &'a str,
    content: String,
    design: &'a Design,
    meta_description: Option<&'a str>,
    meta_keywords: Option<&'a str>,
    custom_css: Option<String>,
    placeholder_image: Option<&'a str>,
    embedded_video: Option<&'a str>,
}

pub struct SiteGenerator {
    tera: Tera,
    asset_prefix: String,
    sanitizer: HtmlSanitizer,
}

impl SiteGenerator {
    /// `asset_prefix` replaces the `/uploads` prefix of image sources, so the
    /// static copy can serve uploads from another location.
    pub fn new(
        templates_dir: Option<&Path>,
        asset_prefix: impl Into<String>,
    ) -> Result<Self, SiteGenError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", BASE_TEMPLATE),
            ("page.html", PAGE_TEMPLATE),
        ])?;

        if let Some(dir) = templates_dir {
            let overrides: Vec<(PathBuf, Option<&str>)> = TEMPLATE_NAMES
                .iter()
                .map(|name| (dir.join(name), Some(*name)))
                .filter(|(path, _)| path.is_file())
                .collect();
            if !overrides.is_empty() {
                tracing::info!(
                    "Using {} template override(s) from {}",
                    overrides.len(),
                    dir.display()
                );
                tera.add_template_files(overrides)?;
            }
        }

        Ok(Self {
            tera,
            asset_prefix: asset_prefix.into(),
            sanitizer: HtmlSanitizer::new(),
        })
    }

    pub fn render_index(
        &self,
        tree: &PageTree,
        settings: &CmsSettings,
    ) -> Result<String, SiteGenError> {
        let published = tree.project_published();
        let title = settings.site_title.as_deref().unwrap_or("Handbook");
        let design = Design::new();
        let page = PageView {
            title,
            content: String::new(),
            design: &design,
            meta_description: None,
            meta_keywords: None,
            custom_css: None,
            placeholder_image: None,
            embedded_video: None,
        };
        let breadcrumbs = vec![Breadcrumb {
            title: HOME_TITLE.to_string(),
            url: HOME_URL.to_string(),
            active: true,
        }];

        let mut context = Context::new();
        context.insert("page", &page);
        context.insert("site", settings);
        context.insert("sidebar_menu", &sidebar_html(&published, None));
        context.insert("breadcrumbs", &breadcrumbs);

        Ok(self.tera.render("base.html", &context)?)
    }

    /// Renders the published page with `slug`. Content is sanitized and its
    /// upload paths rewritten.
    pub fn render_page(
        &self,
        tree: &PageTree,
        slug: &str,
        settings: &CmsSettings,
    ) -> Result<String, SiteGenError> {
        let node = tree.find_by_slug(slug)?;
        if !tree.is_visible(node.id)? {
            return Err(TreeError::NotFound.into());
        }
        let content = node.content().ok_or(TreeError::NotFound)?;

        let page = PageView {
            title: &node.title,
            content: rewrite_asset_paths(&self.sanitizer.clean(content), &self.asset_prefix),
            design: &node.design,
            meta_description: node.meta_description.as_deref(),
            meta_keywords: node.meta_keywords.as_deref(),
            custom_css: node.custom_css.as_deref().map(|css| css.replace("</", "<\\/")),
            placeholder_image: node.placeholder_image.as_deref(),
            embedded_video: node.embedded_video.as_deref(),
        };

        let mut context = Context::new();
        context.insert("page", &page);
        context.insert("site", settings);
        context.insert(
            "sidebar_menu",
            &sidebar_html(&tree.project_published(), Some(slug)),
        );
        context.insert("breadcrumbs", &tree.breadcrumbs(slug)?);

        Ok(self.tera.render("page.html", &context)?)
    }

    /// Writes the whole published site into `out_dir`.
    pub async fn generate(
        &self,
        tree: &PageTree,
        settings: &CmsSettings,
        out_dir: &Path,
    ) -> Result<GenerateReport, SiteGenError> {
        fs::create_dir_all(out_dir).await?;

        fs::write(out_dir.join("index.html"), self.render_index(tree, settings)?).await?;
        tracing::info!("Generated {}", out_dir.join("index.html").display());

        let mut pages = Vec::new();
        for slug in published_slugs(&tree.project_published()) {
            let html = self.render_page(tree, &slug, settings)?;
            let path = out_dir.join(format!("{}.html", slug));
            fs::write(&path, html).await?;
            tracing::info!("Generated {}", path.display());
            pages.push(slug);
        }

        Ok(GenerateReport {
            out_dir: out_dir.to_path_buf(),
            pages,
        })
    }
}

fn published_slugs(items: &[NodeDocument]) -> Vec<String> {
    let mut slugs = Vec::new();
    for item in items {
        if let Some(slug) = &item.slug {
            slugs.push(slug.clone());
        }
        if let Some(children) = &item.children {
            slugs.extend(published_slugs(children));
        }
    }
    slugs
}

/// Points `src="/uploads/..."` at `prefix` instead.
pub fn rewrite_asset_paths(html: &str, prefix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix == UPLOADS_URL_PREFIX {
        return html.to_string();
    }
    html.replace(
        &format!("src=\"{}/", UPLOADS_URL_PREFIX),
        &format!("src=\"{}/", prefix),
    )
}

/// Sidebar navigation for an already-filtered published forest.
///
/// The current page's link is marked `active`, and every chapter containing
/// it is `expanded`. Chapters with no visible children are left out.
pub fn sidebar_html(items: &[NodeDocument], current_slug: Option<&str>) -> String {
    let mut html = String::new();
    render_sidebar_items(&mut html, items, current_slug);
    html
}

fn render_sidebar_items(html: &mut String, items: &[NodeDocument], current_slug: Option<&str>) {
    for item in items {
        let title = tera::escape_html(&item.title);
        match (&item.children, &item.slug) {
            (Some(children), _) if !children.is_empty() => {
                let expanded = current_slug.is_some_and(|slug| contains_slug(children, slug));
                let class = if expanded {
                    "menu-item has-children expanded"
                } else {
                    "menu-item has-children"
                };
                let _ = writeln!(html, "<div class=\"{}\">", class);
                let _ = writeln!(
                    html,
                    "<a href=\"#\" class=\"menu-link\" aria-expanded=\"{}\">{}</a>",
                    expanded, title
                );
                html.push_str("<ul class=\"submenu\">\n");
                render_sidebar_items(html, children, current_slug);
                html.push_str("</ul>\n</div>\n");
            }
            (None, Some(slug)) => {
                let class = if current_slug == Some(slug.as_str()) {
                    "menu-link active"
                } else {
                    "menu-link"
                };
                let _ = writeln!(
                    html,
                    "<div class=\"menu-item\"><a href=\"{}\" class=\"{}\">{}</a></div>",
                    page_url(slug),
                    class,
                    title
                );
            }
            _ => {}
        }
    }
}

fn contains_slug(items: &[NodeDocument], slug: &str) -> bool {
    items.iter().any(|item| {
        item.slug.as_deref() == Some(slug)
            || item
                .children
                .as_deref()
                .is_some_and(|children| contains_slug(children, slug))
    })
}

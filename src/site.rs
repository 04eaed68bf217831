use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, SiteConfig};
use crate::content_loader::{load_layout, load_posts, ContentError, POSTS_DIR};
use crate::models::PostSummary;
use crate::page::IndexPage;
use crate::render::{render_index, render_post};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("site configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{file_path} has no usable route (slug {slug:?})")]
    InvalidSlug { file_path: String, slug: String },
    #[error("failed to serialize page data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub pages_written: usize,
    pub slug_collisions: usize,
}

/// Resolves site config from the process environment, then builds.
pub fn build_site(options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let site = SiteConfig::from_env()?;
    build_site_with(options, site)
}

pub fn build_site_with(options: &BuildOptions, site: SiteConfig) -> Result<BuildReport, BuildError> {
    info!(name = %site.name, "resolved site config");

    let layout = load_layout(&options.content_dir)?;
    let posts = load_posts(&options.content_dir.join(POSTS_DIR))?;
    let page = IndexPage::assemble(site, posts);

    let out = &options.output_dir;
    // Checked up front so a bad slug never leaves a half-written site behind.
    let post_paths = page
        .posts
        .iter()
        .map(|post| post_page_path(out, post))
        .collect::<Result<Vec<_>, _>>()?;

    write_file(&out.join("index.html"), &render_index(&layout, &page))?;
    write_file(&out.join("index.json"), &serde_json::to_string_pretty(&page)?)?;

    for (post, path) in page.posts.iter().zip(&post_paths) {
        write_file(path, &render_post(&layout, &page.global_data, post))?;
    }

    let report = BuildReport {
        pages_written: page.posts.len() + 1,
        slug_collisions: page.slug_collisions().len(),
    };
    info!(
        pages = report.pages_written,
        out = %out.display(),
        "site built"
    );
    Ok(report)
}

/// `posts/<slug>/index.html` under `out`. The slug must be a single normal
/// path component, otherwise the page would land outside its own directory.
fn post_page_path(out: &Path, post: &PostSummary) -> Result<PathBuf, BuildError> {
    let slug = post.slug();
    let mut components = Path::new(slug).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == slug => {
            Ok(out.join(POSTS_DIR).join(slug).join("index.html"))
        }
        _ => Err(BuildError::InvalidSlug {
            file_path: post.file_path.clone(),
            slug: slug.to_string(),
        }),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    let write_error = |source: io::Error| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, contents).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostData;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    const LAYOUT: &str = "<html><head><title>{{ title }}</title></head>\
        <body>{{ header }}{{ content }}{{ footer }}</body></html>";

    fn content_tree(posts: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("layout.html"), LAYOUT).unwrap();
        fs::create_dir(dir.path().join(POSTS_DIR)).unwrap();
        for (name, body) in posts {
            fs::write(dir.path().join(POSTS_DIR).join(name), body).unwrap();
        }
        dir
    }

    fn options(content: &TempDir, out: &TempDir) -> BuildOptions {
        BuildOptions {
            content_dir: content.path().to_path_buf(),
            output_dir: out.path().join("site"),
        }
    }

    #[test]
    fn writes_index_json_and_post_pages() {
        let content = content_tree(&[
            ("hello-world.mdx", "---\ntitle: Hello\ndate: 2024-02-01\n---\n## Hi\n"),
            ("notes.md", "---\ndate: 2023-01-01\ndescription: Notes\n---\ntext\n"),
        ]);
        let out = TempDir::new().unwrap();
        let options = options(&content, &out);

        let report = build_site_with(&options, SiteConfig::default()).unwrap();
        assert_eq!(
            report,
            BuildReport {
                pages_written: 3,
                slug_collisions: 0
            }
        );

        let site = &options.output_dir;
        let index = fs::read_to_string(site.join("index.html")).unwrap();
        assert!(index.contains("href=\""));
        assert!(index.contains("Full stack developer portfolio"));
        assert!(site.join("posts/hello-world/index.html").is_file());
        assert!(site.join("posts/notes/index.html").is_file());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(site.join("index.json")).unwrap()).unwrap();
        assert_eq!(json["globalData"]["blogTitle"], "Full stack developer portfolio");
        assert_eq!(json["posts"][0]["filePath"], "hello-world.mdx");
        assert_eq!(json["posts"][1]["data"]["description"], "Notes");
    }

    #[test]
    fn builds_with_no_posts() {
        let content = content_tree(&[]);
        let out = TempDir::new().unwrap();
        let report = build_site_with(&options(&content, &out), SiteConfig::default()).unwrap();
        assert_eq!(report.pages_written, 1);
    }

    #[test]
    fn reports_slug_collisions() {
        let content = content_tree(&[("intro.md", "one"), ("intro.mdx", "two")]);
        let out = TempDir::new().unwrap();
        let report = build_site_with(&options(&content, &out), SiteConfig::default()).unwrap();
        assert_eq!(report.slug_collisions, 1);
    }

    #[test]
    fn missing_layout_fails_the_build() {
        let content = TempDir::new().unwrap();
        fs::create_dir(content.path().join(POSTS_DIR)).unwrap();
        let out = TempDir::new().unwrap();
        let err = build_site_with(&options(&content, &out), SiteConfig::default()).unwrap_err();
        assert!(matches!(err, BuildError::Content(ContentError::Io { .. })));
    }

    #[test]
    fn dot_slugs_fail_before_anything_is_written() {
        for name in ["...md", "..mdx"] {
            let content = content_tree(&[(name, "---\ntitle: Evil\n---\nbody\n")]);
            let out = TempDir::new().unwrap();
            let options = options(&content, &out);

            let err = build_site_with(&options, SiteConfig::default()).unwrap_err();
            match err {
                BuildError::InvalidSlug { file_path, .. } => assert_eq!(file_path, name),
                other => panic!("unexpected error for {name}: {other}"),
            }
            assert!(!options.output_dir.join("index.html").exists());
        }
    }

    #[test]
    fn post_page_path_stays_under_posts_dir() {
        let out = Path::new("site");
        let post = PostSummary::new("hello-world.mdx", PostData::default());
        assert_eq!(
            post_page_path(out, &post).unwrap(),
            Path::new("site/posts/hello-world/index.html")
        );

        for file_path in ["...md", "..mdx", ".md"] {
            let post = PostSummary::new(file_path, PostData::default());
            assert!(matches!(
                post_page_path(out, &post),
                Err(BuildError::InvalidSlug { .. })
            ));
        }
    }

    #[test]
    #[serial]
    fn site_config_comes_from_the_environment() {
        let content = content_tree(&[]);
        let out = TempDir::new().unwrap();
        let options = options(&content, &out);

        env::set_var("BLOG_TITLE", "Caf%C3%A9%20notes");
        let result = build_site(&options);
        env::remove_var("BLOG_TITLE");
        result.unwrap();

        let json: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(options.output_dir.join("index.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(json["globalData"]["blogTitle"], "Café notes");
        assert_eq!(json["globalData"]["name"], "Adeyemi Opeyemi");
    }

    #[test]
    #[serial]
    fn malformed_environment_value_fails_the_build() {
        let content = content_tree(&[]);
        let out = TempDir::new().unwrap();
        let options = options(&content, &out);

        env::set_var("BLOG_TITLE", "%E4");
        let result = build_site(&options);
        env::remove_var("BLOG_TITLE");

        assert!(matches!(
            result,
            Err(BuildError::Config(ConfigError::InvalidUtf8 { var: "BLOG_TITLE", .. }))
        ));
        assert!(!options.output_dir.join("index.html").exists());
    }
}

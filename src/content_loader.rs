use std::cmp::Reverse;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate};
use gray_matter::{engine::YAML, Matter};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::models::{PostData, PostSummary};

pub const POSTS_DIR: &str = "posts";
pub const LAYOUT_FILE: &str = "layout.html";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("post file name is not valid unicode: {}", .0.display())]
    FileName(PathBuf),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ContentError + '_ {
    move |source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn load_layout(content_dir: &Path) -> Result<String, ContentError> {
    let path = content_dir.join(LAYOUT_FILE);
    fs::read_to_string(&path).map_err(io_error(&path))
}

/// Loads every `.md`/`.mdx` file in `posts_dir`, newest first.
pub fn load_posts(posts_dir: &Path) -> Result<Vec<PostSummary>, ContentError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(posts_dir).map_err(io_error(posts_dir))? {
        let entry = entry.map_err(io_error(posts_dir))?;
        let path = entry.path();
        let is_file = entry.file_type().map_err(io_error(&path))?.is_file();
        if is_file && is_post_file(&path) {
            paths.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-post entry");
        }
    }
    // read_dir order is platform dependent
    paths.sort();

    let mut posts = paths
        .iter()
        .map(|path| load_post(path))
        .collect::<Result<Vec<_>, _>>()?;
    sort_by_date(&mut posts);

    info!(count = posts.len(), dir = %posts_dir.display(), "loaded posts");
    Ok(posts)
}

fn is_post_file(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext == "md" || ext == "mdx")
}

fn load_post(path: &Path) -> Result<PostSummary, ContentError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ContentError::FileName(path.to_path_buf()))?;
    let file_content = fs::read_to_string(path).map_err(io_error(path))?;

    let (data, content) = parse_front_matter(&file_content, file_name);
    Ok(PostSummary {
        content,
        ..PostSummary::new(file_name, data)
    })
}

/// Splits YAML front matter from the body. Unreadable front matter is logged
/// and replaced with empty data.
pub fn parse_front_matter(file_content: &str, file_name: &str) -> (PostData, String) {
    let matter = Matter::<YAML>::new();
    match matter.parse::<PostData>(file_content) {
        Ok(parsed) => (parsed.data.unwrap_or_default(), parsed.content),
        Err(e) => {
            error!(file = file_name, "Failed to parse front matter: {}", e);
            (PostData::default(), strip_front_matter(file_content).to_string())
        }
    }
}

fn strip_front_matter(file_content: &str) -> &str {
    let Some(rest) = file_content.strip_prefix("---") else {
        return file_content;
    };
    match rest.find("\n---") {
        Some(end) => {
            let after = &rest[end + 4..];
            after.split_once('\n').map_or("", |(_, body)| body)
        }
        None => file_content,
    }
}

fn sort_by_date(posts: &mut [PostSummary]) {
    // Stable: undated posts and equal dates keep file name order.
    posts.sort_by_key(|post| Reverse(post.data.date.as_deref().and_then(parse_date)));
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

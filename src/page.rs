use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::config::SiteConfig;
use crate::models::PostSummary;

/// Everything the index page renders from. Built once per build and never
/// mutated afterwards.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IndexPage {
    pub global_data: SiteConfig,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCollision {
    pub slug: String,
    pub file_paths: Vec<String>,
}

impl IndexPage {
    /// Keeps `posts` in the order the loader returned them.
    pub fn assemble(global_data: SiteConfig, posts: Vec<PostSummary>) -> Self {
        let page = Self { global_data, posts };
        for collision in page.slug_collisions() {
            warn!(
                slug = %collision.slug,
                files = ?collision.file_paths,
                "posts share a route; links to this slug are ambiguous"
            );
        }
        page
    }

    pub fn slug_collisions(&self) -> Vec<SlugCollision> {
        let mut by_slug: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for post in &self.posts {
            by_slug
                .entry(post.slug())
                .or_default()
                .push(post.file_path.clone());
        }

        by_slug
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(slug, file_paths)| SlugCollision {
                slug: slug.to_string(),
                file_paths,
            })
            .collect()
    }
}

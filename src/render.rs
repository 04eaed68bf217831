use htmlescape::{encode_attribute, encode_minimal};

use crate::config::SiteConfig;
use crate::markdown::render_markdown_to_html;
use crate::models::PostSummary;
use crate::page::IndexPage;

/// Values substituted into `layout.html`. `header`, `content` and `footer`
/// are HTML; `title` and `description` are plain text.
pub struct LayoutSlots<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub header: &'a str,
    pub content: &'a str,
    pub footer: &'a str,
}

/// Fills `{{ name }}` placeholders in one pass, so placeholders inside the
/// substituted values stay literal. Unknown names are left as they are.
pub fn render_with_layout(layout: &str, slots: &LayoutSlots<'_>) -> String {
    let title = encode_minimal(slots.title);
    let description = encode_attribute(slots.description);

    let mut page = String::with_capacity(layout.len() + slots.content.len());
    let mut rest = layout;
    while let Some(open) = rest.find("{{") {
        page.push_str(&rest[..open]);
        rest = &rest[open..];
        let Some(close) = rest.find("}}") else {
            break;
        };

        let placeholder = &rest[..close + 2];
        let value = match placeholder[2..close].trim() {
            "title" => title.as_str(),
            "description" => description.as_str(),
            "header" => slots.header,
            "content" => slots.content,
            "footer" => slots.footer,
            _ => placeholder,
        };
        page.push_str(value);
        rest = &rest[close + 2..];
    }
    page.push_str(rest);
    page
}

fn site_header(site: &SiteConfig) -> String {
    format!(
        "<header class=\"site-header\"><a href=\"/\">{}</a></header>",
        encode_minimal(&site.name)
    )
}

fn site_footer(site: &SiteConfig) -> String {
    format!(
        "<footer class=\"site-footer\"><p>{}</p></footer>",
        encode_minimal(&site.footer_text)
    )
}

fn post_list_item(post: &PostSummary) -> String {
    let mut item = format!(
        "<li class=\"post\"><a href=\"{}\">",
        encode_attribute(&post.route())
    );
    if let Some(date) = &post.data.date {
        item.push_str(&format!("<p class=\"post-date\">{}</p>", encode_minimal(date)));
    }
    item.push_str(&format!("<h2>{}</h2>", encode_minimal(post.display_title())));
    if let Some(description) = &post.data.description {
        item.push_str(&format!(
            "<p class=\"post-description\">{}</p>",
            encode_minimal(description)
        ));
    }
    item.push_str("</a></li>");
    item
}

pub fn render_index(layout: &str, page: &IndexPage) -> String {
    let site = &page.global_data;
    let list_items: String = page.posts.iter().map(post_list_item).collect();
    let content = format!(
        "<main><h1>{}</h1><ul class=\"posts\">{}</ul></main>",
        encode_minimal(&site.blog_title),
        list_items
    );

    render_with_layout(
        layout,
        &LayoutSlots {
            title: &site.name,
            description: &site.blog_title,
            header: &site_header(site),
            content: &content,
            footer: &site_footer(site),
        },
    )
}

pub fn render_post(layout: &str, site: &SiteConfig, post: &PostSummary) -> String {
    let mut content = format!("<article><h1>{}</h1>", encode_minimal(post.display_title()));
    if let Some(date) = &post.data.date {
        content.push_str(&format!("<p class=\"post-date\">{}</p>", encode_minimal(date)));
    }
    content.push_str(&render_markdown_to_html(&post.content));
    content.push_str("</article>");

    let title = format!("{} | {}", post.display_title(), site.name);
    render_with_layout(
        layout,
        &LayoutSlots {
            title: &title,
            description: post.data.description.as_deref().unwrap_or(&site.blog_title),
            header: &site_header(site),
            content: &content,
            footer: &site_footer(site),
        },
    )
}

use serde::{Deserialize, Deserializer, Serialize};

/// Front matter fields the listing reads. Every field is optional.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PostData {
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

/// YAML reads `date: 2024` or `title: 1984` as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    /// File name relative to the posts directory, e.g. `hello-world.mdx`.
    pub file_path: String,
    pub data: PostData,
    #[serde(skip)]
    pub content: String,
}

impl PostSummary {
    pub fn new(file_path: impl Into<String>, data: PostData) -> Self {
        Self {
            file_path: file_path.into(),
            data,
            content: String::new(),
        }
    }

    pub fn slug(&self) -> &str {
        slug_for(&self.file_path)
    }

    pub fn route(&self) -> String {
        format!("/posts/{}", self.slug())
    }

    /// Heading text: the front matter title, or the slug when there is none.
    pub fn display_title(&self) -> &str {
        self.data.title.as_deref().unwrap_or_else(|| self.slug())
    }
}

/// Strips one trailing `.mdx` or `.md` from a post's file path.
pub fn slug_for(file_path: &str) -> &str {
    file_path
        .strip_suffix(".mdx")
        .or_else(|| file_path.strip_suffix(".md"))
        .unwrap_or(file_path)
}

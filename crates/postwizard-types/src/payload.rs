use serde::{Deserialize, Serialize};

/// Body of `POST /wp-json/wp/v2/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPayload {
    pub slug: String,
    pub status: String,
    #[serde(rename = "type")]
    pub post_type: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub featured_media: u64,
    pub tags: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pornstars: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u64>>,
}

/// Image attributes sent when uploading or updating media.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPayload {
    pub alt_text: String,
    pub caption: String,
    pub description: String,
}

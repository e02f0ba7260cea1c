use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One entry of the local mirror of `GET /wp-json/wp/v2/posts`.
///
/// Only the fields the pipeline reads are typed; everything else is kept in
/// `extra` so a cache file survives a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WpPost {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default, deserialize_with = "class_list")]
    pub class_list: Vec<String>,
    #[serde(default)]
    pub tags: Vec<u64>,
    #[serde(default)]
    pub categories: Vec<u64>,
    #[serde(default)]
    pub pornstars: Vec<u64>,
    #[serde(default)]
    pub photos_tag: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yoast_head_json: Option<YoastHead>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YoastHead {
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// WordPress serializes `class_list` as an array, or as an object keyed by
/// index once a filter has removed entries.
fn class_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Keyed(Map<String, Value>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(items) => items,
        Raw::Keyed(map) => {
            // Keys are list positions; the map orders them as strings ("10" < "2").
            let mut entries: Vec<(usize, String)> = map
                .into_iter()
                .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_str()?.to_string())))
                .collect();
            entries.sort_by_key(|(index, _)| *index);
            entries.into_iter().map(|(_, class)| class).collect()
        }
    })
}

/// Taxonomies the pipeline resolves names to IDs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Taxonomy {
    Tags,
    Categories,
    Models,
    Photos,
}

impl Taxonomy {
    /// Prefix of the `class_list` entries for this taxonomy, e.g. `tag-big-city`.
    pub fn marker(&self) -> &'static str {
        match self {
            Taxonomy::Tags => "tag",
            Taxonomy::Categories => "category",
            Taxonomy::Models => "pornstars",
            Taxonomy::Photos => "photos_tag",
        }
    }

    /// REST field holding the IDs for this taxonomy.
    pub fn field(&self) -> &'static str {
        match self {
            Taxonomy::Tags => "tags",
            Taxonomy::Categories => "categories",
            Taxonomy::Models => "pornstars",
            Taxonomy::Photos => "photos_tag",
        }
    }
}

impl WpPost {
    pub fn taxonomy_ids(&self, taxonomy: Taxonomy) -> &[u64] {
        match taxonomy {
            Taxonomy::Tags => &self.tags,
            Taxonomy::Categories => &self.categories,
            Taxonomy::Models => &self.pornstars,
            Taxonomy::Photos => &self.photos_tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_class_list_is_accepted() {
        let json = r#"{
            "id": 7,
            "slug": "a-post",
            "class_list": {"0": "post-7", "3": "tag-city-lights"},
            "status": "publish"
        }"#;
        let post: WpPost = serde_json::from_str(json).unwrap();
        assert_eq!(post.class_list.len(), 2);
        assert!(post.class_list.contains(&"tag-city-lights".to_string()));
        assert_eq!(post.extra.get("status"), Some(&Value::from("publish")));
    }

    #[test]
    fn keyed_class_list_keeps_numeric_order() {
        let mut classes = serde_json::Map::new();
        classes.insert("0".into(), Value::from("post-1"));
        classes.insert("1".into(), Value::from("type-post"));
        for i in 2..=11 {
            classes.insert(i.to_string(), Value::from(format!("tag-t{}", i)));
        }
        let post: WpPost = serde_json::from_value(serde_json::json!({
            "id": 1,
            "class_list": classes,
            "tags": (102..=111).collect::<Vec<u64>>(),
        }))
        .unwrap();

        let expected: Vec<String> = ["post-1".to_string(), "type-post".to_string()]
            .into_iter()
            .chain((2..=11).map(|i| format!("tag-t{}", i)))
            .collect();
        assert_eq!(post.class_list, expected);
    }

    #[test]
    fn unknown_fields_survive_reserialization() {
        let json = r#"{"id": 1, "title": {"rendered": "Hi"}, "meta": {"views": 3}}"#;
        let post: WpPost = serde_json::from_str(json).unwrap();
        let back = serde_json::to_value(&post).unwrap();
        assert_eq!(back["meta"]["views"], 3);
        assert_eq!(back["title"]["rendered"], "Hi");
    }
}

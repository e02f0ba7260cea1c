use std::collections::HashMap;

use postwizard_types::wordpress::Taxonomy;

use crate::strings::{split_char, title_case};
use crate::wp_cache::WpPostCache;

fn push_unique(ids: &mut Vec<u64>, id: u64) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

/// IDs of the site terms matching `tags`, compared case-insensitively after
/// turning any separator into a space (`big_city` matches `Big City`).
pub fn get_tag_ids<S: AsRef<str>>(cache: &WpPostCache, tags: &[S], taxonomy: Taxonomy) -> Vec<u64> {
    let lookup: HashMap<String, u64> = cache
        .map_taxonomy_ids(taxonomy)
        .into_iter()
        .map(|(name, id)| (name.to_lowercase(), id))
        .collect();

    let mut ids = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        let cleaned = match split_char(tag) {
            Some(sep) => tag.split(sep).collect::<Vec<_>>().join(" "),
            None => tag.to_string(),
        };
        if let Some(&id) = lookup.get(&cleaned.trim().to_lowercase()) {
            push_unique(&mut ids, id);
        }
    }
    ids
}

/// IDs of the model (`pornstars`) terms for `models`.
pub fn get_model_ids<S: AsRef<str>>(cache: &WpPostCache, models: &[S]) -> Vec<u64> {
    let lookup = cache.map_taxonomy_ids(Taxonomy::Models);
    let mut ids = Vec::new();
    for model in models {
        if let Some(&id) = lookup.get(&title_case(model.as_ref().trim())) {
            push_unique(&mut ids, id);
        }
    }
    ids
}

/// Items that did not resolve to a term, so they can be created first.
///
/// `None` when every item got an ID.
pub fn identify_missing<S: AsRef<str>>(
    map: &HashMap<String, u64>,
    items: &[S],
    ids: &[u64],
    ignore_case: bool,
) -> Option<Vec<String>> {
    if items.len() == ids.len() {
        return None;
    }
    let known: Vec<String> = if ignore_case {
        map.keys().map(|k| k.to_lowercase()).collect()
    } else {
        map.keys().cloned().collect()
    };
    let missing = items
        .iter()
        .map(|item| {
            if ignore_case {
                item.as_ref().to_lowercase()
            } else {
                item.as_ref().to_string()
            }
        })
        .filter(|item| !known.contains(item))
        .collect();
    Some(missing)
}

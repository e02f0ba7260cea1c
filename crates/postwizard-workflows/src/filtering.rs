use std::collections::HashSet;

use postwizard_db::content::ContentRecord;
use postwizard_db::schema::value_to_text;
use postwizard_db::{ColumnMap, ContentField};

use crate::wp_cache::{TitleSource, WpPostCache};

/// Title of a record: its title column, or for dumps without one the first
/// text value that is not a URL.
pub fn record_title(record: &ContentRecord, columns: &ColumnMap<ContentField>) -> Option<String> {
    columns
        .get_text(record, ContentField::Title)
        .or_else(|| {
            record
                .iter()
                .filter_map(value_to_text)
                .find(|v| !v.starts_with("http") && v.chars().any(char::is_alphanumeric))
        })
        .map(|t| t.trim().to_string())
}

/// Records not yet on the site, matched by title and, when the dump has a
/// slug column, by slug.
pub fn filter_published(
    records: Vec<ContentRecord>,
    columns: &ColumnMap<ContentField>,
    cache: &WpPostCache,
    source: TitleSource,
) -> Vec<ContentRecord> {
    let titles: HashSet<String> = cache.titles(source).into_iter().collect();
    let slugs: HashSet<&str> = cache.slugs().into_iter().collect();

    records
        .into_iter()
        .filter(|record| {
            let title_seen = record_title(record, columns).is_some_and(|t| titles.contains(&t));
            let slug_seen = columns
                .get_text(record, ContentField::Slug)
                .is_some_and(|s| slugs.contains(s.as_str()));
            !title_seen && !slug_seen
        })
        .collect()
}

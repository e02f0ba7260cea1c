use std::fs;
use std::path::Path;

use anyhow::Context;
use postwizard_db::ContentDb;
use postwizard_db::content::VideoRow;
use tracing::{debug, info, warn};

use crate::dates::{MonthStyle, parse_date_to_iso};

/// Number of `|`-separated fields in a dump line.
const FIELD_COUNT: usize = 9;

#[derive(Debug, Default)]
pub struct DumpReport {
    pub rows: Vec<VideoRow>,
    pub skipped: usize,
}

fn optional(field: &str) -> Option<String> {
    let field = field.trim();
    (!field.is_empty()).then(|| field.to_string())
}

/// Parse one line of a partner text dump:
///
/// `title|description|models|tags|site name|date|source|thumbnail|tracking`
///
/// Returns `Ok(None)` for lines without a downloadable source.
pub fn parse_dump_line(line: &str) -> anyhow::Result<Option<VideoRow>> {
    let fields: Vec<&str> = line.split('|').collect();
    let [title, description, models, tags, site_name, date, source, thumbnail, tracking] = fields[..] else {
        anyhow::bail!("expected {} fields, found {}", FIELD_COUNT, fields.len());
    };

    let source = source.trim();
    if !source.starts_with("http") {
        return Ok(None);
    }

    let date = parse_date_to_iso(date.trim(), MonthStyle::Abbreviated)
        .with_context(|| format!("bad date {:?}", date.trim()))?;

    let file_name = source.rsplit('/').next().unwrap_or(source);
    let stem = file_name.split_once('.').map_or(file_name, |(stem, _)| stem);
    let parts: Vec<&str> = stem.split('_').collect();
    let (duration, pre_slug) = match parts.split_last() {
        Some((last, rest)) if !rest.is_empty() => {
            let joined = rest.join("-");
            let pre_slug = if joined.is_empty() { stem.to_string() } else { joined };
            (Some(last.to_string()), pre_slug)
        }
        _ => (None, stem.to_string()),
    };
    let wp_slug = format!("{}-{}", site_name.trim().to_lowercase().replace(' ', "-"), pre_slug);

    Ok(Some(VideoRow {
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        models: optional(models),
        tags: optional(tags),
        date: date.format("%Y-%m-%d").to_string(),
        duration,
        source_url: source.to_string(),
        thumbnail_url: thumbnail.trim().to_string(),
        tracking_url: tracking.trim().to_string(),
        wp_slug,
    }))
}

/// Parse every line of a dump. Malformed lines are logged and counted as
/// skipped along with lines that have no source.
pub fn parse_txt_dump(text: &str) -> DumpReport {
    let mut report = DumpReport::default();
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_dump_line(line) {
            Ok(Some(row)) => report.rows.push(row),
            Ok(None) => {
                debug!("Line {}: no source URL, skipped", n + 1);
                report.skipped += 1;
            }
            Err(e) => {
                warn!("Line {}: {:#}", n + 1, e);
                report.skipped += 1;
            }
        }
    }
    report
}

/// Convert a text dump into a SQLite content database.
pub fn import_dump(txt: &Path, db: &Path) -> anyhow::Result<DumpReport> {
    let text = fs::read_to_string(txt).with_context(|| format!("reading {}", txt.display()))?;
    let report = parse_txt_dump(&text);
    ContentDb::import_videos(db, &report.rows)?;
    info!(
        "Dump {} -> {}: {} rows, {} skipped",
        txt.display(),
        db.display(),
        report.rows.len(),
        report.skipped
    );
    Ok(report)
}

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use postwizard_types::wordpress::{Taxonomy, WpPost};
use thiserror::Error;
use tracing::{debug, info};

use crate::strings::title_case;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("WordPress cache not found at {0}. Rebuild your WordPress cache")]
    NotFound(PathBuf),

    #[error("WordPress cache at {path} is unreadable: {source}. Rebuild your WordPress cache")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cache file error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("hot sync integrity check failed: site reports {expected} posts but {fetched} were fetched")]
    HotFileSyncIntegrity { expected: usize, fetched: usize },

    #[error("fetching posts failed: {0:#}")]
    Source(anyhow::Error),
}

/// Where the post list comes from during a hot sync.
pub trait PostSource: Send {
    /// Post count the site reports (`X-WP-Total`).
    fn total_posts(&mut self) -> anyhow::Result<usize>;

    fn fetch_posts(&mut self) -> anyhow::Result<Vec<WpPost>>;
}

/// A JSON export of the posts endpoint on disk.
pub struct JsonExportSource {
    path: PathBuf,
}

impl JsonExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PostSource for JsonExportSource {
    fn total_posts(&mut self) -> anyhow::Result<usize> {
        Ok(self.fetch_posts()?.len())
    }

    fn fetch_posts(&mut self) -> anyhow::Result<Vec<WpPost>> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Which title a post is known by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleSource {
    /// `title.rendered`
    #[default]
    Rendered,
    /// Yoast SEO title minus the trailing `- Site Name`
    Yoast,
}

/// Outcome of a hot sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub total: usize,
    pub added: Vec<u64>,
    pub removed: Vec<u64>,
    pub changed: Vec<u64>,
}

impl SyncReport {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} posts ({} added, {} removed, {} changed)",
            self.total,
            self.added.len(),
            self.removed.len(),
            self.changed.len()
        )
    }
}

/// Undo the HTML entities WordPress puts into rendered titles.
fn decode_entities(text: &str) -> String {
    const ENTITIES: [(&str, &str); 9] = [
        ("&#8217;", "'"),
        ("&#8216;", "'"),
        ("&#039;", "'"),
        ("&#8220;", "\""),
        ("&#8221;", "\""),
        ("&quot;", "\""),
        ("&#8211;", "-"),
        ("&#038;", "&"),
        ("&amp;", "&"),
    ];
    let mut out = text.to_string();
    for (entity, plain) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, plain);
        }
    }
    out
}

/// Local mirror of the site's posts.
pub struct WpPostCache {
    path: PathBuf,
    posts: Vec<WpPost>,
}

impl WpPostCache {
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CacheError::NotFound(path.to_path_buf())
            } else {
                CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let posts: Vec<WpPost> = serde_json::from_str(&raw).map_err(|source| CacheError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded {} cached posts from {}", posts.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            posts,
        })
    }

    pub fn from_posts(path: impl Into<PathBuf>, posts: Vec<WpPost>) -> Self {
        Self {
            path: path.into(),
            posts,
        }
    }

    /// Write the cache through a temporary file so readers never see half a file.
    pub fn save(&self) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.posts).map_err(|source| CacheError::Json {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn posts(&self) -> &[WpPost] {
        &self.posts
    }

    pub fn titles(&self, source: TitleSource) -> Vec<String> {
        self.posts
            .iter()
            .map(|post| match source {
                TitleSource::Rendered => decode_entities(post.title.rendered.trim()),
                TitleSource::Yoast => {
                    let title = post.yoast_head_json.as_ref().map(|y| y.title.as_str()).unwrap_or_default();
                    let words: Vec<&str> = title.split(' ').collect();
                    let keep = words.len().saturating_sub(2);
                    decode_entities(words[..keep].join(" ").trim())
                }
            })
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.posts.iter().map(|p| p.slug.as_str()).collect()
    }

    pub fn links(&self) -> Vec<&str> {
        self.posts.iter().map(|p| p.link.as_str()).collect()
    }

    pub fn link_for_slug(&self, slug: &str) -> Option<&str> {
        self.posts
            .iter()
            .find(|p| p.slug == slug)
            .map(|p| p.link.as_str())
    }

    /// Whether a post with this exact title is already on the site.
    pub fn is_published(&self, title: &str, source: TitleSource) -> bool {
        let title = title.trim();
        self.titles(source).iter().any(|t| t == title)
    }

    pub fn has_slug(&self, slug: &str) -> bool {
        self.posts.iter().any(|p| p.slug == slug)
    }

    /// Term name to term ID for one taxonomy.
    ///
    /// Names come from the post's `class_list` entries (`tag-city-lights` is
    /// `City Lights`), paired in order with the post's term IDs. The first
    /// pairing seen for a name wins.
    pub fn map_taxonomy_ids(&self, taxonomy: Taxonomy) -> HashMap<String, u64> {
        let prefix = format!("{}-", taxonomy.marker());
        let mut map = HashMap::new();
        for post in &self.posts {
            let names = post
                .class_list
                .iter()
                .filter_map(|class| class.strip_prefix(&prefix))
                .map(|rest| title_case(&rest.replace('-', " ")));
            for (name, id) in names.zip(post.taxonomy_ids(taxonomy)) {
                map.entry(name).or_insert(*id);
            }
        }
        map
    }

    /// Replace the cache with the site's current posts.
    ///
    /// Fails without touching the cache when the fetched count does not
    /// match the count the site reports.
    pub fn hot_sync(&mut self, source: &mut dyn PostSource) -> Result<SyncReport, CacheError> {
        let expected = source.total_posts().map_err(CacheError::Source)?;
        let fresh = source.fetch_posts().map_err(CacheError::Source)?;
        if fresh.len() != expected {
            return Err(CacheError::HotFileSyncIntegrity {
                expected,
                fetched: fresh.len(),
            });
        }

        let old: HashMap<u64, &WpPost> = self.posts.iter().map(|p| (p.id, p)).collect();
        let fresh_ids: HashSet<u64> = fresh.iter().map(|p| p.id).collect();

        let mut report = SyncReport {
            total: fresh.len(),
            ..Default::default()
        };
        for post in &fresh {
            match old.get(&post.id) {
                None => report.added.push(post.id),
                Some(prev) if *prev != post => report.changed.push(post.id),
                Some(_) => {}
            }
        }
        report.removed = self
            .posts
            .iter()
            .map(|p| p.id)
            .filter(|id| !fresh_ids.contains(id))
            .collect();

        self.posts = fresh;
        self.save()?;
        info!("Hot sync of {}: {}", self.path.display(), report);
        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use postwizard_types::wordpress::{Rendered, YoastHead};

    use super::*;

    pub(crate) fn post(id: u64, slug: &str, title: &str, classes: &[&str], tags: &[u64], stars: &[u64]) -> WpPost {
        WpPost {
            id,
            slug: slug.into(),
            link: format!("https://site.example/{}/", slug),
            title: Rendered {
                rendered: title.into(),
            },
            class_list: classes.iter().map(|c| c.to_string()).collect(),
            tags: tags.to_vec(),
            categories: vec![],
            pornstars: stars.to_vec(),
            photos_tag: vec![],
            yoast_head_json: Some(YoastHead {
                title: format!("{} - Example", title),
                extra: Default::default(),
            }),
            extra: Default::default(),
        }
    }

    struct Fixed {
        total: usize,
        posts: Vec<WpPost>,
    }

    impl PostSource for Fixed {
        fn total_posts(&mut self) -> anyhow::Result<usize> {
            Ok(self.total)
        }

        fn fetch_posts(&mut self) -> anyhow::Result<Vec<WpPost>> {
            Ok(self.posts.clone())
        }
    }

    #[test]
    fn titles_slugs_and_links() {
        let cache = WpPostCache::from_posts(
            "unused.json",
            vec![
                post(1, "first-post", " Don&#8217;t Stop ", &[], &[], &[]),
                post(2, "second-post", "Second", &[], &[], &[]),
            ],
        );
        assert_eq!(cache.titles(TitleSource::Rendered), vec!["Don't Stop", "Second"]);
        assert_eq!(cache.titles(TitleSource::Yoast), vec!["Don't Stop", "Second"]);
        assert_eq!(cache.slugs(), vec!["first-post", "second-post"]);
        assert_eq!(cache.link_for_slug("second-post"), Some("https://site.example/second-post/"));
        assert!(cache.is_published("Second ", TitleSource::Rendered));
        assert!(!cache.is_published("Third", TitleSource::Rendered));
    }

    #[test]
    fn taxonomy_names_map_to_ids() {
        let cache = WpPostCache::from_posts(
            "unused.json",
            vec![
                post(1, "a", "A", &["post-1", "tag-city-lights", "tag-night", "pornstars-jane-doe"], &[10, 11], &[50]),
                post(2, "b", "B", &["tag-night", "tag-rooftop"], &[99, 12], &[]),
            ],
        );
        let tags = cache.map_taxonomy_ids(Taxonomy::Tags);
        assert_eq!(tags.get("City Lights"), Some(&10));
        // first pairing wins
        assert_eq!(tags.get("Night"), Some(&11));
        assert_eq!(tags.get("Rooftop"), Some(&12));
        assert_eq!(cache.map_taxonomy_ids(Taxonomy::Models).get("Jane Doe"), Some(&50));
    }

    #[test]
    fn keyed_class_list_pairs_with_the_right_ids() {
        let mut classes = serde_json::Map::new();
        classes.insert("0".into(), "post-1".into());
        classes.insert("1".into(), "type-post".into());
        for i in 2..=11 {
            classes.insert(i.to_string(), format!("tag-t{}", i).into());
        }
        let post: WpPost = serde_json::from_value(serde_json::json!({
            "id": 1,
            "class_list": classes,
            "tags": (102..=111).collect::<Vec<u64>>(),
        }))
        .unwrap();

        let tags = WpPostCache::from_posts("unused.json", vec![post]).map_taxonomy_ids(Taxonomy::Tags);
        assert_eq!(tags.get("T2"), Some(&102));
        assert_eq!(tags.get("T10"), Some(&110));
        assert_eq!(tags.get("T11"), Some(&111));
    }

    #[test]
    fn hot_sync_reports_differences_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wp").join("wp-posts.json");
        let mut cache = WpPostCache::from_posts(&path, vec![post(1, "a", "A", &[], &[], &[]), post(2, "b", "B", &[], &[], &[])]);

        let mut source = Fixed {
            total: 2,
            posts: vec![post(2, "b", "B renamed", &[], &[], &[]), post(3, "c", "C", &[], &[], &[])],
        };
        let report = cache.hot_sync(&mut source).unwrap();
        assert_eq!(report.added, vec![3]);
        assert_eq!(report.removed, vec![1]);
        assert_eq!(report.changed, vec![2]);
        assert_eq!(report.to_string(), "2 posts (1 added, 1 removed, 1 changed)");

        let reloaded = WpPostCache::load(&path).unwrap();
        assert_eq!(reloaded.posts(), cache.posts());
    }

    #[test]
    fn hot_sync_rejects_incomplete_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = WpPostCache::from_posts(dir.path().join("c.json"), vec![post(1, "a", "A", &[], &[], &[])]);
        let mut source = Fixed {
            total: 5,
            posts: vec![post(2, "b", "B", &[], &[], &[])],
        };
        assert!(matches!(
            cache.hot_sync(&mut source),
            Err(CacheError::HotFileSyncIntegrity { expected: 5, fetched: 1 })
        ));
        assert_eq!(cache.slugs(), vec!["a"]);
    }

    #[test]
    fn missing_cache_asks_for_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let err = WpPostCache::load(&dir.path().join("absent.json")).err().unwrap();
        assert!(matches!(err, CacheError::NotFound(_)));
        assert!(err.to_string().contains("Rebuild your WordPress cache"));
    }

    #[test]
    fn json_export_source_reads_posts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        fs::write(&path, r#"[{"id": 4, "slug": "d", "link": "https://site.example/d/"}]"#).unwrap();
        let mut source = JsonExportSource::new(&path);
        assert_eq!(source.total_posts().unwrap(), 1);
        assert_eq!(source.fetch_posts().unwrap()[0].slug, "d");
    }
}

pub mod classifier;
pub mod dates;
pub mod dump;
pub mod filtering;
pub mod payload;
pub mod publish_checker;
pub mod slug;
pub mod strings;
pub mod taxonomy;
pub mod wp_cache;

pub use payload::SiteConfig;
pub use wp_cache::{CacheError, JsonExportSource, PostSource, TitleSource, WpPostCache};

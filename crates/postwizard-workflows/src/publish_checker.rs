use std::time::Duration;

use tracing::{debug, info, warn};

use crate::wp_cache::{CacheError, PostSource, WpPostCache};

/// Back-off between cache syncs while waiting for a post to go live.
///
/// Waits start at `initial_offset` seconds and shrink by one per attempt;
/// after a zero-second wait they start over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySchedule {
    pub initial_offset: u64,
    pub max_attempts: Option<u32>,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            initial_offset: 5,
            max_attempts: None,
        }
    }
}

impl RetrySchedule {
    fn next_offset(&self, offset: u64) -> u64 {
        if offset == 0 { self.initial_offset } else { offset - 1 }
    }
}

/// Sync the cache until `slug` shows up and return its link. The first
/// check happens right away; waits come between checks.
///
/// `None` when the schedule runs out of attempts. A failed sync aborts.
pub async fn wait_for_publication(
    cache: &mut WpPostCache,
    source: &mut dyn PostSource,
    slug: &str,
    schedule: RetrySchedule,
) -> Result<Option<String>, CacheError> {
    let mut offset = schedule.initial_offset;
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        let report = cache.hot_sync(source)?;
        if let Some(link) = cache.link_for_slug(slug) {
            info!("{} is live at {} ({})", slug, link, report);
            return Ok(Some(link.to_string()));
        }
        if schedule.max_attempts.is_some_and(|max| attempts >= max) {
            warn!("{} not published after {} attempts", slug, attempts);
            return Ok(None);
        }

        debug!("{} not live yet, checking again in {}s", slug, offset);
        tokio::time::sleep(Duration::from_secs(offset)).await;
        offset = schedule.next_offset(offset);
    }
}

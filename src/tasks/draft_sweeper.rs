use crate::survey::SurveyService;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use chrono::{DateTime, Duration, Utc};
use log::{error, info};
use tokio::time::interval;

const CHECK_INTERVAL_SECONDS: u64 = 300; // Check every 5 minutes

/// Oldest touch time a draft may have and survive. `None` when the TTL
/// doesn't fit chrono's range.
pub fn stale_cutoff(now: DateTime<Utc>, ttl_minutes: i64) -> Option<DateTime<Utc>> {
    Duration::try_minutes(ttl_minutes).and_then(|ttl| now.checked_sub_signed(ttl))
}

/// Forgets unsubmitted form choices that haven't been touched for `ttl_minutes`.
pub async fn sweep_stale_drafts_task(service: Arc<SurveyService>, ttl_minutes: i64) {
    info!("Starting background task to expire drafts older than {} minutes...", ttl_minutes);
    let mut interval = interval(StdDuration::from_secs(CHECK_INTERVAL_SECONDS));

    loop {
        interval.tick().await;
        let Some(cutoff) = stale_cutoff(Utc::now(), ttl_minutes) else {
            error!("Draft TTL of {} minutes is out of range, stopping the draft sweeper", ttl_minutes);
            return;
        };

        let removed = service.drafts().sweep(cutoff).await;
        if removed > 0 {
            info!("Expired {} stale draft(s), {} still open.", removed, service.drafts().len().await);
        }
    }
}

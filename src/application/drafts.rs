use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::gateway::profile::ProfileReader;
use crate::application::synchronizer::{ProfileSynchronizer, SyncStatus};
use crate::domain::entities::handle::Handle;

pub type SharedDraft = Arc<Mutex<ProfileSynchronizer>>;

/// Unsaved drafts nobody touched for this long are dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

struct DraftEntry {
    draft: SharedDraft,
    last_access: Instant,
}

impl DraftEntry {
    /// Only the registry holds the draft and it either matches the store or went stale.
    fn is_evictable(&self, now: Instant, idle_timeout: Duration) -> bool {
        if Arc::strong_count(&self.draft) > 1 {
            return false;
        }
        match self.draft.try_lock() {
            Ok(synchronizer) => {
                synchronizer.status() == SyncStatus::Clean || now.duration_since(self.last_access) > idle_timeout
            }
            Err(_) => false,
        }
    }
}

/// Open drafts of this process, one per handle.
pub struct DraftRegistry {
    drafts: Mutex<HashMap<String, DraftEntry>>,
    idle_timeout: Duration,
}

impl Default for DraftRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl DraftRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            drafts: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn open_count(&self) -> usize {
        self.drafts.lock().await.len()
    }

    pub async fn get(&self, handle: &str) -> Option<SharedDraft> {
        let mut drafts = self.drafts.lock().await;
        let entry = drafts.get_mut(handle)?;
        entry.last_access = Instant::now();
        Some(entry.draft.clone())
    }

    /// Keeps an already registered draft if another request loaded it first. Unused drafts of
    /// other handles are evicted on the way.
    pub async fn insert_if_absent(&self, handle: &str, synchronizer: ProfileSynchronizer) -> SharedDraft {
        let mut drafts = self.drafts.lock().await;
        let now = Instant::now();
        let before = drafts.len();
        drafts.retain(|key, entry| key == handle || !entry.is_evictable(now, self.idle_timeout));
        if drafts.len() < before {
            debug!("Evicted {} unused drafts", before - drafts.len());
        }

        let entry = drafts.entry(handle.to_string()).or_insert_with(|| DraftEntry {
            draft: Arc::new(Mutex::new(synchronizer)),
            last_access: now,
        });
        entry.last_access = now;
        entry.draft.clone()
    }

    pub async fn remove(&self, handle: &str) -> Option<SharedDraft> {
        self.drafts.lock().await.remove(handle).map(|entry| entry.draft)
    }

    /// Drops the draft of `handle` if no request holds it and it has nothing left to save.
    pub async fn release(&self, handle: &str) -> bool {
        let mut drafts = self.drafts.lock().await;
        let releasable = drafts
            .get(handle)
            .is_some_and(|entry| entry.is_evictable(Instant::now(), Duration::MAX));
        if releasable {
            drafts.remove(handle);
        }
        releasable
    }

    /// Returns the owner's draft for `handle`, loading it from the store on first access.
    pub async fn open_owned(
        &self,
        profile_reader: &dyn ProfileReader,
        handle: &str,
        user_id: &str,
    ) -> AppResult<SharedDraft> {
        if let Some(draft) = self.get(handle).await {
            if draft.lock().await.document().owner_id != user_id {
                return Err(AppError::AccessDenied);
            }
            return Ok(draft);
        }

        let handle = Handle::parse(handle).map_err(|_| AppError::ProfileNotFound)?;
        let document = profile_reader
            .find_by_handle(&handle)
            .await?
            .ok_or(AppError::ProfileNotFound)?;
        if document.owner_id != user_id {
            return Err(AppError::AccessDenied);
        }
        info!("Draft opened for {}", handle);
        Ok(self
            .insert_if_absent(handle.as_str(), ProfileSynchronizer::new(document))
            .await)
    }
}

//! The shared store handle.
//!
//! [`TimelineStore`] owns the state tree behind an async read-write lock,
//! the backend client, the key-value mirror and the change broadcast. It is
//! constructed once per application instance and cloned into every
//! consumer; clones share all of it.
//!
//! # Load cycles
//!
//! [`set_slug`](TimelineStore::set_slug) bumps the state's generation.
//! Each loader records the generation before its request and commits only
//! if it is unchanged when the response arrives, so a late response for a
//! previous slug never lands in the new timeline. The write lock is never
//! held across the network call; every commit is atomic.
//!
//! # Key-value mirror
//!
//! Mirror writes run on the blocking pool after the state lock is
//! released. They are serialized and always write the tree's current
//! values, so the stored slug, title and subtitle converge to the state
//! even when setters race.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use timeline_types::{
    Endpoint, EventRecord, EventType, GroupEntry, GroupId, LoadStatus, Metadata, RegionGroup,
    Slug, ThemeList, Validate, YearSettings,
};
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::client::BackendClient;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::state::{StateChange, TimelineState};
use crate::storage::{
    FileStorage, KeyValueStorage, MemoryStorage, SLUG_KEY, SUBTITLE_KEY, StoredSession, TITLE_KEY,
};

/// Capacity of the change broadcast channel.
///
/// A subscriber that falls behind by more than this many changes receives
/// [`broadcast::error::RecvError::Lagged`] and should re-read a snapshot.
const CHANGE_CAPACITY: usize = 256;

/// Result of a loader whose request completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was committed to the state tree.
    Applied,
    /// The slug changed while the request was in flight; the response was
    /// discarded.
    Stale,
}

/// Results of [`TimelineStore::load_all`], one per endpoint.
#[derive(Debug)]
pub struct LoadReport {
    results: Vec<(Endpoint, Result<LoadOutcome, StoreError>)>,
}

impl LoadReport {
    /// Result for one endpoint.
    pub fn get(&self, endpoint: Endpoint) -> Option<&Result<LoadOutcome, StoreError>> {
        self.results
            .iter()
            .find(|(e, _)| *e == endpoint)
            .map(|(_, result)| result)
    }

    /// Whether every endpoint was committed.
    pub fn all_applied(&self) -> bool {
        self.results
            .iter()
            .all(|(_, result)| matches!(result, Ok(LoadOutcome::Applied)))
    }

    /// Endpoints that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (Endpoint, &StoreError)> {
        self.results
            .iter()
            .filter_map(|(endpoint, result)| result.as_ref().err().map(|e| (*endpoint, e)))
    }

    /// All results, in request order.
    pub fn iter(&self) -> impl Iterator<Item = &(Endpoint, Result<LoadOutcome, StoreError>)> {
        self.results.iter()
    }
}

/// Shared handle to the timeline state.
#[derive(Clone)]
pub struct TimelineStore {
    state: Arc<RwLock<TimelineState>>,
    client: BackendClient,
    storage: Arc<dyn KeyValueStorage>,
    mirror_lock: Arc<Mutex<()>>,
    tx: broadcast::Sender<StateChange>,
}

impl TimelineStore {
    /// Create a store with default state.
    pub fn new(client: BackendClient, storage: Arc<dyn KeyValueStorage>) -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(TimelineState::new())),
            client,
            storage,
            mirror_lock: Arc::new(Mutex::new(())),
            tx,
        }
    }

    /// Create a store from configuration.
    ///
    /// Uses [`FileStorage`] when `storage.path` is set and
    /// [`MemoryStorage`] otherwise.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = BackendClient::new(&config.backend)?;
        let storage: Arc<dyn KeyValueStorage> = match &config.storage.path {
            Some(path) => Arc::new(FileStorage::open(path.clone())?),
            None => Arc::new(MemoryStorage::new()),
        };
        info!(
            base_url = config.backend.base_url,
            timeout_ms = config.backend.request_timeout_ms,
            persistent = config.storage.path.is_some(),
            "timeline store configured"
        );
        Ok(Self::new(client, storage))
    }

    /// Subscribe to applied mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.tx.subscribe()
    }

    /// Clone of the whole state tree.
    pub async fn snapshot(&self) -> TimelineState {
        self.state.read().await.clone()
    }

    /// Run `f` against the current state under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&TimelineState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Values last written to the key-value mirror.
    pub fn stored_session(&self) -> Result<StoredSession, StoreError> {
        StoredSession::read(self.storage.as_ref())
    }

    fn publish(&self, change: StateChange) {
        // send fails only when nobody is subscribed, which is normal.
        let _ = self.tx.send(change);
    }

    /// Copy the current values of `keys` from the tree to storage.
    async fn mirror(&self, keys: &'static [&'static str]) {
        let _ordered = self.mirror_lock.lock().await;
        let values: Vec<(&'static str, String)> = self
            .read(|state| {
                keys.iter()
                    .filter_map(|key| mirrored_value(state, key).map(|value| (*key, value)))
                    .collect()
            })
            .await;

        let storage = Arc::clone(&self.storage);
        let written = tokio::task::spawn_blocking(move || {
            values
                .iter()
                .try_for_each(|(key, value)| storage.set(key, value))
        })
        .await;

        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(?keys, error = %e, "failed to mirror values to storage"),
            Err(e) => warn!(?keys, error = %e, "storage mirror task did not complete"),
        }
    }

    async fn mutate(&self, f: impl FnOnce(&mut TimelineState) -> StateChange) {
        let change = {
            let mut state = self.state.write().await;
            f(&mut state)
        };
        self.publish(change);
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    /// Select a timeline, mirror the slug and start a new load cycle.
    pub async fn set_slug(&self, slug: impl Into<Slug>) {
        let slug = slug.into();
        let change = {
            let mut state = self.state.write().await;
            state.set_slug(slug.clone())
        };
        if let StateChange::Slug { generation, .. } = &change {
            info!(%slug, generation, "timeline selected");
        }
        self.publish(change);
        self.mirror(&[SLUG_KEY]).await;
    }

    /// Set one group's visibility, inserting the group if it is unseen.
    pub async fn set_group_status(&self, id: impl Into<GroupId>, visible: bool) {
        let id = id.into();
        self.mutate(|state| state.set_group_status(id, visible)).await;
    }

    /// Replace the selected event.
    pub async fn set_selected_event(&self, event: Option<EventRecord>) {
        self.mutate(|state| state.set_selected_event(event)).await;
    }

    /// Replace the user's lower year bound.
    pub async fn set_min_year(&self, year: Option<i32>) {
        self.mutate(|state| state.set_min_year(year)).await;
    }

    /// Replace the user's upper year bound.
    pub async fn set_max_year(&self, year: Option<i32>) {
        self.mutate(|state| state.set_max_year(year)).await;
    }

    /// Replace the camera zoom.
    pub async fn set_zoom_level(&self, zoom_level: f64) {
        self.mutate(|state| state.set_zoom_level(zoom_level)).await;
    }

    /// Set one event type's visibility.
    pub async fn set_event_type_status(&self, kind: EventType, visible: bool) {
        self.mutate(|state| state.set_event_type_status(kind, visible))
            .await;
    }

    /// Set one event type's visibility by wire name.
    ///
    /// Names outside the fixed set are rejected with
    /// [`StoreError::UnknownEventType`] and leave the state untouched.
    pub async fn set_event_type_status_by_name(
        &self,
        name: &str,
        visible: bool,
    ) -> Result<(), StoreError> {
        let kind: EventType = name.parse()?;
        self.set_event_type_status(kind, visible).await;
        Ok(())
    }

    /// Make every event type visible.
    pub async fn activate_all_event_types(&self) {
        self.mutate(TimelineState::activate_all_event_types).await;
    }

    /// Make every group visible, or defer until groups are loaded.
    pub async fn activate_all_groups(&self) {
        self.mutate(TimelineState::activate_all_groups).await;
    }

    // -----------------------------------------------------------------------
    // Loaders
    // -----------------------------------------------------------------------

    /// Load title and subtitle from `meta` and mirror both to storage.
    pub async fn load_metadata(&self) -> Result<LoadOutcome, StoreError> {
        let outcome = self
            .load(Endpoint::Meta, |state, metadata: Metadata| {
                state.apply_metadata(metadata)
            })
            .await?;
        if outcome == LoadOutcome::Applied {
            self.mirror(&[TITLE_KEY, SUBTITLE_KEY]).await;
        }
        Ok(outcome)
    }

    /// Load the group list from `groups` and merge it in.
    pub async fn load_groups(&self) -> Result<LoadOutcome, StoreError> {
        self.load(Endpoint::Groups, |state, entries: Vec<GroupEntry>| {
            state.apply_groups(entries)
        })
        .await
    }

    /// Load the region grouping from `groups-by-region`.
    pub async fn load_groups_by_region(&self) -> Result<LoadOutcome, StoreError> {
        self.load(Endpoint::GroupsByRegion, |state, regions: Vec<RegionGroup>| {
            state.apply_groups_by_region(regions)
        })
        .await
    }

    /// Load the absolute year bounds from `year-settings`.
    pub async fn load_years(&self) -> Result<LoadOutcome, StoreError> {
        self.load(Endpoint::YearSettings, |state, years: YearSettings| {
            state.apply_years(years)
        })
        .await
    }

    /// Load the theme list from `themes`.
    pub async fn load_themes(&self) -> Result<LoadOutcome, StoreError> {
        self.load(Endpoint::Themes, |state, themes: ThemeList| {
            state.apply_themes(themes.0)
        })
        .await
    }

    /// Run every loader concurrently.
    pub async fn load_all(&self) -> LoadReport {
        let (meta, groups, regions, years, themes) = tokio::join!(
            self.load_metadata(),
            self.load_groups(),
            self.load_groups_by_region(),
            self.load_years(),
            self.load_themes(),
        );
        let report = LoadReport {
            results: vec![
                (Endpoint::Meta, meta),
                (Endpoint::Groups, groups),
                (Endpoint::GroupsByRegion, regions),
                (Endpoint::YearSettings, years),
                (Endpoint::Themes, themes),
            ],
        };
        debug!(
            applied = report.all_applied(),
            failures = report.failures().count(),
            "load cycle finished"
        );
        report
    }

    /// Fetch one endpoint for the current slug and commit it if the load
    /// cycle is still current.
    async fn load<T, F>(&self, endpoint: Endpoint, commit: F) -> Result<LoadOutcome, StoreError>
    where
        T: DeserializeOwned + Validate,
        F: FnOnce(&mut TimelineState, T) -> StateChange,
    {
        let (slug, generation, pending) = {
            let mut state = self.state.write().await;
            if state.slug().is_empty() {
                warn!(%endpoint, "load requested before a timeline was selected");
                return Err(StoreError::NoSlug);
            }
            let pending = state.mark_load(endpoint, LoadStatus::Pending);
            (state.slug().clone(), state.generation(), pending)
        };
        self.publish(pending);

        let fetched = self.client.fetch::<T>(&slug, endpoint).await;

        let mut state = self.state.write().await;
        if state.generation() != generation {
            debug!(
                %slug,
                %endpoint,
                generation,
                current = state.generation(),
                "discarding response for superseded timeline"
            );
            return Ok(LoadOutcome::Stale);
        }

        match fetched {
            Ok(payload) => {
                let change = commit(&mut state, payload);
                let ready = state.mark_load(endpoint, LoadStatus::Ready);
                drop(state);
                debug!(%slug, %endpoint, generation, "committed timeline resource");
                self.publish(change);
                self.publish(ready);
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                let failed = state.mark_load(endpoint, LoadStatus::Failed(e.to_string()));
                drop(state);
                warn!(%slug, %endpoint, generation, error = %e, "failed to load timeline resource");
                self.publish(failed);
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Getters
    // -----------------------------------------------------------------------

    /// Selected timeline slug.
    pub async fn slug(&self) -> Slug {
        self.read(|state| state.slug().clone()).await
    }

    /// Timeline title.
    pub async fn title(&self) -> String {
        self.read(|state| state.title().to_owned()).await
    }

    /// Ids of the visible groups, in insertion order.
    pub async fn active_group_ids(&self) -> Vec<GroupId> {
        self.read(TimelineState::active_group_ids).await
    }

    /// Wire names of the visible event types.
    pub async fn active_event_type_names(&self) -> Vec<&'static str> {
        self.read(TimelineState::active_event_type_names).await
    }

    /// Visibility of a group, or `None` for an unknown id.
    pub async fn group_status(&self, id: &str) -> Option<bool> {
        self.read(|state| state.group_status(id)).await
    }

    /// Display name of a group, or `None` for an unknown id.
    pub async fn group_name(&self, id: &str) -> Option<String> {
        self.read(|state| state.group_name(id).map(ToOwned::to_owned))
            .await
    }

    /// Visibility of an event type by name, or `None` for an unknown name.
    pub async fn event_type_status(&self, name: &str) -> Option<bool> {
        self.read(|state| state.event_type_status(name)).await
    }

    /// Absolute year bounds as `(min, max)`.
    pub async fn absolute_years(&self) -> (i32, i32) {
        self.read(|state| (state.absolute_min_year(), state.absolute_max_year()))
            .await
    }

    /// Load status of one endpoint.
    pub async fn load_status(&self, endpoint: Endpoint) -> LoadStatus {
        self.read(|state| state.load_status(endpoint)).await
    }
}

fn mirrored_value(state: &TimelineState, key: &str) -> Option<String> {
    match key {
        SLUG_KEY => Some(state.slug().to_string()),
        TITLE_KEY => Some(state.title().to_owned()),
        SUBTITLE_KEY => Some(state.subtitle().to_owned()),
        _ => None,
    }
}

impl std::fmt::Debug for TimelineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineStore")
            .field("client", &self.client)
            .field("subscribers", &self.tx.receiver_count())
            .finish_non_exhaustive()
    }
}

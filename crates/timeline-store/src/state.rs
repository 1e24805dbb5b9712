//! The timeline state tree and its mutation rules.
//!
//! [`TimelineState`] is plain data: every mutation is a `&mut self` method
//! that runs to completion and reports what changed as a [`StateChange`].
//! The [`TimelineStore`](crate::store::TimelineStore) handle wraps it in a
//! lock and is the only writer in a running application. Reads go through
//! the getters; derived views are recomputed on every call.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use timeline_types::{
    Endpoint, EventRecord, EventType, GroupEntry, GroupId, LoadStatus, Metadata, RegionGroup,
    Slug, Theme, YearSettings,
};

/// Absolute lower year bound before `year-settings` is loaded.
pub const DEFAULT_ABSOLUTE_MIN_YEAR: i32 = 1850;
/// Absolute upper year bound before `year-settings` is loaded.
pub const DEFAULT_ABSOLUTE_MAX_YEAR: i32 = 1930;
/// Initial camera zoom.
pub const DEFAULT_ZOOM_LEVEL: f64 = 1.0;

/// Plot marker symbols for the groups that have a dedicated one.
const SYMBOL_TRANSLATION: [(&str, &str); 7] = [
    ("jewish", "diamond-1"),
    ("indian", "circle-3"),
    ("chinese", "circle-2"),
    ("japanese", "circle-1"),
    ("mexican", "polygon-2"),
    ("russian", "diamond-2"),
    ("italian", "square-2"),
];

/// A single applied mutation, published to store subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateChange {
    /// A new timeline was selected and a new load cycle started.
    Slug {
        /// The selected slug.
        slug: Slug,
        /// Load cycle the slug belongs to.
        generation: u64,
    },
    /// Title and subtitle were replaced.
    Metadata,
    /// A groups payload was merged in.
    GroupsLoaded {
        /// Number of ids seen for the first time.
        added: usize,
    },
    /// One group's visibility was set.
    GroupStatus {
        /// The group.
        id: GroupId,
        /// Its new visibility.
        visible: bool,
    },
    /// Bulk activation of every group was requested.
    AllGroupsActivated {
        /// True when no groups existed yet and activation was deferred to
        /// the next groups load.
        deferred: bool,
    },
    /// The region grouping was replaced.
    GroupsByRegion,
    /// Absolute year bounds were replaced.
    AbsoluteYears {
        /// New lower bound.
        min: i32,
        /// New upper bound.
        max: i32,
    },
    /// The theme list was replaced.
    Themes,
    /// One or more event-type flags changed.
    EventTypes,
    /// The selected event changed.
    SelectedEvent,
    /// The user's lower year bound changed.
    MinYear {
        /// New bound.
        year: Option<i32>,
    },
    /// The user's upper year bound changed.
    MaxYear {
        /// New bound.
        year: Option<i32>,
    },
    /// The camera zoom changed.
    ZoomLevel {
        /// New zoom.
        zoom_level: f64,
    },
    /// An endpoint's load status changed.
    Load {
        /// The endpoint.
        endpoint: Endpoint,
        /// Its new status.
        status: LoadStatus,
    },
}

/// The complete client-side state of the timeline explorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineState {
    slug: Slug,
    title: String,
    subtitle: String,
    groups: IndexMap<GroupId, bool>,
    group_names: IndexMap<GroupId, String>,
    groups_by_region: Vec<RegionGroup>,
    themes: Vec<Theme>,
    event_types: BTreeMap<EventType, bool>,
    event: Option<EventRecord>,
    min_year: Option<i32>,
    max_year: Option<i32>,
    absolute_min_year: i32,
    absolute_max_year: i32,
    zoom_level: f64,
    activate_all_groups_when_loaded: bool,
    symbol_translation: BTreeMap<GroupId, String>,
    generation: u64,
    load_status: BTreeMap<Endpoint, LoadStatus>,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            slug: Slug::default(),
            title: String::new(),
            subtitle: String::new(),
            groups: IndexMap::new(),
            group_names: IndexMap::new(),
            groups_by_region: Vec::new(),
            themes: Vec::new(),
            event_types: EventType::ALL.into_iter().map(|kind| (kind, false)).collect(),
            event: None,
            min_year: None,
            max_year: None,
            absolute_min_year: DEFAULT_ABSOLUTE_MIN_YEAR,
            absolute_max_year: DEFAULT_ABSOLUTE_MAX_YEAR,
            zoom_level: DEFAULT_ZOOM_LEVEL,
            activate_all_groups_when_loaded: false,
            symbol_translation: SYMBOL_TRANSLATION
                .into_iter()
                .map(|(group, symbol)| (GroupId::from(group), symbol.to_owned()))
                .collect(),
            generation: 0,
            load_status: Endpoint::ALL
                .into_iter()
                .map(|endpoint| (endpoint, LoadStatus::Idle))
                .collect(),
        }
    }
}

impl TimelineState {
    /// Create the tree with its startup defaults.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    /// Select a timeline and start a new load cycle.
    ///
    /// Bumps the generation so responses still in flight for the previous
    /// slug are discarded, and resets every load status to idle.
    pub fn set_slug(&mut self, slug: Slug) -> StateChange {
        self.slug = slug;
        self.generation = self.generation.wrapping_add(1);
        for status in self.load_status.values_mut() {
            *status = LoadStatus::Idle;
        }
        StateChange::Slug {
            slug: self.slug.clone(),
            generation: self.generation,
        }
    }

    /// Set one group's visibility, inserting the group if it is unseen.
    pub fn set_group_status(&mut self, id: GroupId, visible: bool) -> StateChange {
        self.groups.insert(id.clone(), visible);
        StateChange::GroupStatus { id, visible }
    }

    /// Replace the selected event.
    pub fn set_selected_event(&mut self, event: Option<EventRecord>) -> StateChange {
        self.event = event;
        StateChange::SelectedEvent
    }

    /// Replace the user's lower year bound. Not checked against the
    /// absolute bounds.
    pub const fn set_min_year(&mut self, year: Option<i32>) -> StateChange {
        self.min_year = year;
        StateChange::MinYear { year }
    }

    /// Replace the user's upper year bound. Not checked against the
    /// absolute bounds.
    pub const fn set_max_year(&mut self, year: Option<i32>) -> StateChange {
        self.max_year = year;
        StateChange::MaxYear { year }
    }

    /// Replace the camera zoom.
    pub const fn set_zoom_level(&mut self, zoom_level: f64) -> StateChange {
        self.zoom_level = zoom_level;
        StateChange::ZoomLevel { zoom_level }
    }

    /// Set one event type's visibility.
    pub fn set_event_type_status(&mut self, kind: EventType, visible: bool) -> StateChange {
        self.event_types.insert(kind, visible);
        StateChange::EventTypes
    }

    /// Make every event type visible.
    pub fn activate_all_event_types(&mut self) -> StateChange {
        for visible in self.event_types.values_mut() {
            *visible = true;
        }
        StateChange::EventTypes
    }

    /// Make every group visible.
    ///
    /// With no groups loaded yet there is nothing to flip, so the request
    /// is remembered and applied to the groups of the next groups load.
    pub fn activate_all_groups(&mut self) -> StateChange {
        if self.groups.is_empty() {
            self.activate_all_groups_when_loaded = true;
            return StateChange::AllGroupsActivated { deferred: true };
        }
        for visible in self.groups.values_mut() {
            *visible = true;
        }
        StateChange::AllGroupsActivated { deferred: false }
    }

    // -----------------------------------------------------------------------
    // Commits of loaded payloads
    // -----------------------------------------------------------------------

    /// Replace title and subtitle.
    pub fn apply_metadata(&mut self, metadata: Metadata) -> StateChange {
        self.title = metadata.title;
        self.subtitle = metadata.subtitle;
        StateChange::Metadata
    }

    /// Merge a groups payload.
    ///
    /// Ids seen for the first time start visible if a bulk activation is
    /// pending and hidden otherwise. Ids already present keep their
    /// visibility. Display names are always overwritten. The pending flag
    /// is cleared afterwards.
    pub fn apply_groups(&mut self, entries: Vec<GroupEntry>) -> StateChange {
        let initial = self.activate_all_groups_when_loaded;
        let mut added: usize = 0;
        for GroupEntry(id, name) in entries {
            if !self.groups.contains_key(&id) {
                self.groups.insert(id.clone(), initial);
                added = added.saturating_add(1);
            }
            self.group_names.insert(id, name);
        }
        self.activate_all_groups_when_loaded = false;
        StateChange::GroupsLoaded { added }
    }

    /// Replace the region grouping.
    pub fn apply_groups_by_region(&mut self, regions: Vec<RegionGroup>) -> StateChange {
        self.groups_by_region = regions;
        StateChange::GroupsByRegion
    }

    /// Replace the absolute year bounds.
    pub const fn apply_years(&mut self, years: YearSettings) -> StateChange {
        self.absolute_min_year = years.min;
        self.absolute_max_year = years.max;
        StateChange::AbsoluteYears {
            min: years.min,
            max: years.max,
        }
    }

    /// Replace the theme list.
    pub fn apply_themes(&mut self, themes: Vec<Theme>) -> StateChange {
        self.themes = themes;
        StateChange::Themes
    }

    /// Record the load status of one endpoint.
    pub fn mark_load(&mut self, endpoint: Endpoint, status: LoadStatus) -> StateChange {
        self.load_status.insert(endpoint, status.clone());
        StateChange::Load { endpoint, status }
    }

    // -----------------------------------------------------------------------
    // Derived getters
    // -----------------------------------------------------------------------

    /// Ids of the visible groups, in insertion order.
    pub fn active_group_ids(&self) -> Vec<GroupId> {
        self.groups
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Visible event types, in display order.
    pub fn active_event_types(&self) -> Vec<EventType> {
        self.event_types
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Wire names of the visible event types, in display order.
    pub fn active_event_type_names(&self) -> Vec<&'static str> {
        self.active_event_types()
            .into_iter()
            .map(EventType::as_str)
            .collect()
    }

    /// Visibility of a group, or `None` for an unknown id.
    pub fn group_status(&self, id: &str) -> Option<bool> {
        self.groups.get(id).copied()
    }

    /// Display name of a group, or `None` for an unknown id.
    pub fn group_name(&self, id: &str) -> Option<&str> {
        self.group_names.get(id).map(String::as_str)
    }

    /// Visibility of an event type by wire name, or `None` for an unknown
    /// name.
    pub fn event_type_status(&self, name: &str) -> Option<bool> {
        let kind: EventType = name.parse().ok()?;
        self.event_types.get(&kind).copied()
    }

    /// Plot marker symbol for a group, if it has a dedicated one.
    pub fn symbol_for(&self, id: &str) -> Option<&str> {
        self.symbol_translation.get(id).map(String::as_str)
    }

    /// Display labels of every event type.
    pub fn event_translation(&self) -> BTreeMap<EventType, &'static str> {
        self.event_types
            .keys()
            .map(|kind| (*kind, kind.label()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Field projections
    // -----------------------------------------------------------------------

    /// Selected timeline slug; empty when none is selected.
    pub const fn slug(&self) -> &Slug {
        &self.slug
    }

    /// Timeline title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Timeline subtitle.
    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    /// Group visibility map, in insertion order.
    pub const fn groups(&self) -> &IndexMap<GroupId, bool> {
        &self.groups
    }

    /// Group display names, in insertion order.
    pub const fn group_names(&self) -> &IndexMap<GroupId, String> {
        &self.group_names
    }

    /// Groups nested under their regions.
    pub fn groups_by_region(&self) -> &[RegionGroup] {
        &self.groups_by_region
    }

    /// Theme list.
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// Event-type visibility map.
    pub const fn event_types(&self) -> &BTreeMap<EventType, bool> {
        &self.event_types
    }

    /// Currently selected event.
    pub const fn selected_event(&self) -> Option<&EventRecord> {
        self.event.as_ref()
    }

    /// User's lower year bound.
    pub const fn min_year(&self) -> Option<i32> {
        self.min_year
    }

    /// User's upper year bound.
    pub const fn max_year(&self) -> Option<i32> {
        self.max_year
    }

    /// Earliest year the timeline covers.
    pub const fn absolute_min_year(&self) -> i32 {
        self.absolute_min_year
    }

    /// Latest year the timeline covers.
    pub const fn absolute_max_year(&self) -> i32 {
        self.absolute_max_year
    }

    /// Camera zoom.
    pub const fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    /// Whether a bulk group activation is waiting for the groups load.
    pub const fn activate_all_groups_when_loaded(&self) -> bool {
        self.activate_all_groups_when_loaded
    }

    /// Group-to-symbol table.
    pub const fn symbol_translation(&self) -> &BTreeMap<GroupId, String> {
        &self.symbol_translation
    }

    /// Current load cycle; bumped by every [`set_slug`](Self::set_slug).
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Load status of one endpoint.
    pub fn load_status(&self, endpoint: Endpoint) -> LoadStatus {
        self.load_status.get(&endpoint).cloned().unwrap_or_default()
    }

    /// Load status of every endpoint.
    pub const fn load_statuses(&self) -> &BTreeMap<Endpoint, LoadStatus> {
        &self.load_status
    }
}

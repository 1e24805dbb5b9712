//! Enumeration types shared between the store and its consumers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Fixed classification of timeline events, used as a display filter.
///
/// The set is closed: the store keeps exactly one visibility flag per
/// variant and never grows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// An event in U.S. history.
    Us,
    /// An event in world history.
    World,
    /// A piece of legislation.
    Legislation,
    /// A court decision.
    Caselaw,
}

impl EventType {
    /// Every event type, in display order.
    pub const ALL: [Self; 4] = [Self::Us, Self::World, Self::Legislation, Self::Caselaw];

    /// Wire name of the event type (`us`, `world`, `legislation`, `caselaw`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::World => "world",
            Self::Legislation => "legislation",
            Self::Caselaw => "caselaw",
        }
    }

    /// Human-readable label shown in the filter panel.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Us => "U.S. Event",
            Self::World => "World Event",
            Self::Legislation => "Legislation",
            Self::Caselaw => "Case Law",
        }
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the fixed event types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type: {0}")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Backend endpoints
// ---------------------------------------------------------------------------

/// A per-timeline resource served by the backend data API.
///
/// Requests go to `<base_url>/<slug>/<path>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum Endpoint {
    /// Timeline title and subtitle.
    Meta,
    /// Flat list of `[id, display name]` pairs.
    Groups,
    /// Groups nested under their geographic regions.
    GroupsByRegion,
    /// Absolute year bounds of the timeline.
    YearSettings,
    /// Theme slugs and names.
    Themes,
}

impl Endpoint {
    /// Every endpoint, in the order a full load issues them.
    pub const ALL: [Self; 5] = [
        Self::Meta,
        Self::Groups,
        Self::GroupsByRegion,
        Self::YearSettings,
        Self::Themes,
    ];

    /// Path segment appended after the slug.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Groups => "groups",
            Self::GroupsByRegion => "groups-by-region",
            Self::YearSettings => "year-settings",
            Self::Themes => "themes",
        }
    }
}

impl core::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_type_parses_wire_names() {
        assert_eq!("us".parse::<EventType>().unwrap(), EventType::Us);
        assert_eq!("caselaw".parse::<EventType>().unwrap(), EventType::Caselaw);
        assert_eq!(
            "sports".parse::<EventType>(),
            Err(UnknownEventType(String::from("sports")))
        );
    }

    #[test]
    fn event_type_serde_matches_as_str() {
        for kind in EventType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn event_labels() {
        assert_eq!(EventType::Us.label(), "U.S. Event");
        assert_eq!(EventType::Caselaw.label(), "Case Law");
    }

    #[test]
    fn endpoint_paths_match_serde_names() {
        for endpoint in Endpoint::ALL {
            let json = serde_json::to_string(&endpoint).unwrap();
            assert_eq!(json, format!("\"{}\"", endpoint.path()));
        }
        assert_eq!(Endpoint::GroupsByRegion.to_string(), "groups-by-region");
    }
}

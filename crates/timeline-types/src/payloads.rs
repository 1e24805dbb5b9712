//! Response bodies of the backend data API.
//!
//! Every payload is decoded into an explicit schema and checked with
//! [`Validate`] before the store commits it. A payload that decodes but
//! fails validation is rejected as a whole.
//!
//! | Endpoint | Body |
//! |----------|------|
//! | `meta` | `{"title": "...", "subtitle": "..."}` |
//! | `groups` | `[["jewish", "Jewish"], ...]` |
//! | `groups-by-region` | `[{"slug", "name", "groups": [{"slug", "name", "region__name", "region__slug"}]}]` |
//! | `year-settings` | `{"min": 1850, "max": 1930}` |
//! | `themes` | `{"labor": "Labor", ...}` or `[{"slug", "name"}]` |

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::GroupId;

/// A payload that decoded but violates a structural rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// An identifier that must be non-empty was empty.
    #[error("empty identifier in {0}")]
    EmptyIdentifier(&'static str),

    /// The minimum year exceeds the maximum year.
    #[error("inverted year range: min {min} > max {max}")]
    InvertedYears {
        /// Lower bound sent by the server.
        min: i32,
        /// Upper bound sent by the server.
        max: i32,
    },

    /// A group nested under a region names a different region.
    #[error("group {group} listed under region {listed} claims region {claimed}")]
    RegionMismatch {
        /// The nested group's slug.
        group: String,
        /// The region the group is listed under.
        listed: String,
        /// The region the group itself names.
        claimed: String,
    },
}

/// Structural checks applied at the decoding boundary.
pub trait Validate {
    /// Check the payload, returning the first violation found.
    fn validate(&self) -> Result<(), PayloadError>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), PayloadError> {
        self.iter().try_for_each(Validate::validate)
    }
}

// ---------------------------------------------------------------------------
// meta
// ---------------------------------------------------------------------------

/// Title block of a timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Metadata {
    /// Main heading.
    pub title: String,
    /// Secondary heading.
    #[serde(default)]
    pub subtitle: String,
}

impl Validate for Metadata {
    fn validate(&self) -> Result<(), PayloadError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// groups
// ---------------------------------------------------------------------------

/// One `[id, display name]` pair from the `groups` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GroupEntry(pub GroupId, pub String);

impl GroupEntry {
    /// Build an entry from an id and a display name.
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>) -> Self {
        Self(id.into(), name.into())
    }
}

impl Validate for GroupEntry {
    fn validate(&self) -> Result<(), PayloadError> {
        if self.0.is_empty() {
            return Err(PayloadError::EmptyIdentifier("groups"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// groups-by-region
// ---------------------------------------------------------------------------

/// A geographic region together with the groups associated with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RegionGroup {
    /// Region slug.
    pub slug: String,
    /// Region display name.
    pub name: String,
    /// Groups belonging to the region.
    #[serde(default)]
    pub groups: Vec<RegionMember>,
}

/// A group as listed inside a [`RegionGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RegionMember {
    /// Group id.
    pub slug: GroupId,
    /// Group display name.
    pub name: String,
    /// Display name of the owning region.
    #[serde(rename = "region__name")]
    pub region_name: String,
    /// Slug of the owning region.
    #[serde(rename = "region__slug")]
    pub region_slug: String,
}

impl Validate for RegionGroup {
    fn validate(&self) -> Result<(), PayloadError> {
        if self.slug.is_empty() {
            return Err(PayloadError::EmptyIdentifier("groups-by-region"));
        }
        for member in &self.groups {
            if member.slug.is_empty() {
                return Err(PayloadError::EmptyIdentifier("groups-by-region member"));
            }
            if member.region_slug != self.slug {
                return Err(PayloadError::RegionMismatch {
                    group: member.slug.to_string(),
                    listed: self.slug.clone(),
                    claimed: member.region_slug.clone(),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// year-settings
// ---------------------------------------------------------------------------

/// Absolute year bounds of a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct YearSettings {
    /// Earliest year covered.
    pub min: i32,
    /// Latest year covered.
    pub max: i32,
}

impl Validate for YearSettings {
    fn validate(&self) -> Result<(), PayloadError> {
        if self.min > self.max {
            return Err(PayloadError::InvertedYears {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// themes
// ---------------------------------------------------------------------------

/// A theme events can be tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Theme {
    /// Theme slug.
    pub slug: String,
    /// Theme display name.
    pub name: String,
}

impl Validate for Theme {
    fn validate(&self) -> Result<(), PayloadError> {
        if self.slug.is_empty() {
            return Err(PayloadError::EmptyIdentifier("themes"));
        }
        Ok(())
    }
}

/// The decoded `themes` body, normalized to a list.
///
/// The backend sends a `{slug: name}` object; a list of [`Theme`] records
/// is accepted as well. Object entries keep the server's order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "ThemesWire")]
pub struct ThemeList(pub Vec<Theme>);

#[derive(Deserialize)]
#[serde(untagged)]
enum ThemesWire {
    Map(IndexMap<String, String>),
    List(Vec<Theme>),
}

impl From<ThemesWire> for ThemeList {
    fn from(wire: ThemesWire) -> Self {
        match wire {
            ThemesWire::Map(map) => Self(
                map.into_iter()
                    .map(|(slug, name)| Theme { slug, name })
                    .collect(),
            ),
            ThemesWire::List(list) => Self(list),
        }
    }
}

impl Validate for ThemeList {
    fn validate(&self) -> Result<(), PayloadError> {
        self.0.validate()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn groups_decode_from_pairs() {
        let json = r#"[["jewish", "Jewish"], ["chinese", "Chinese"]]"#;
        let groups: Vec<GroupEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(
            groups,
            vec![
                GroupEntry::new("jewish", "Jewish"),
                GroupEntry::new("chinese", "Chinese"),
            ]
        );
        assert!(groups.validate().is_ok());
    }

    #[test]
    fn group_with_three_elements_is_rejected() {
        let json = r#"[["jewish", "Jewish", "extra"]]"#;
        let groups: Result<Vec<GroupEntry>, _> = serde_json::from_str(json);
        assert!(groups.is_err());
    }

    #[test]
    fn empty_group_id_fails_validation() {
        let groups = vec![GroupEntry::new("", "Nameless")];
        assert_eq!(
            groups.validate(),
            Err(PayloadError::EmptyIdentifier("groups"))
        );
    }

    #[test]
    fn region_groups_decode_double_underscore_fields() {
        let json = r#"[{
            "slug": "asia",
            "name": "Asia",
            "groups": [
                {"slug": "chinese", "name": "Chinese", "region__name": "Asia", "region__slug": "asia"}
            ]
        }]"#;
        let regions: Vec<RegionGroup> = serde_json::from_str(json).unwrap();
        assert_eq!(regions.len(), 1);
        let member = regions.first().and_then(|r| r.groups.first());
        assert_eq!(member.map(|m| m.region_name.as_str()), Some("Asia"));
        assert!(regions.validate().is_ok());
    }

    #[test]
    fn region_member_under_wrong_region_fails_validation() {
        let region = RegionGroup {
            slug: String::from("europe"),
            name: String::from("Europe"),
            groups: vec![RegionMember {
                slug: GroupId::from("japanese"),
                name: String::from("Japanese"),
                region_name: String::from("Asia"),
                region_slug: String::from("asia"),
            }],
        };
        assert!(matches!(
            region.validate(),
            Err(PayloadError::RegionMismatch { .. })
        ));
    }

    #[test]
    fn inverted_years_fail_validation() {
        assert!(YearSettings { min: 1850, max: 1930 }.validate().is_ok());
        assert!(YearSettings { min: 1900, max: 1900 }.validate().is_ok());
        assert_eq!(
            YearSettings { min: 1931, max: 1930 }.validate(),
            Err(PayloadError::InvertedYears {
                min: 1931,
                max: 1930
            })
        );
    }

    #[test]
    fn themes_accept_object_form() {
        let json =
            r#"{"labor": "Labor", "immigration": "Immigration", "citizenship": "Citizenship"}"#;
        let themes: ThemeList = serde_json::from_str(json).unwrap();
        let slugs: Vec<&str> = themes.0.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["labor", "immigration", "citizenship"]);
        assert_eq!(themes.0.last().map(|t| t.name.as_str()), Some("Citizenship"));
    }

    #[test]
    fn themes_accept_list_form() {
        let json = r#"[{"slug": "labor", "name": "Labor"}]"#;
        let themes: ThemeList = serde_json::from_str(json).unwrap();
        assert_eq!(
            themes.0,
            vec![Theme {
                slug: String::from("labor"),
                name: String::from("Labor"),
            }]
        );
    }

    #[test]
    fn themes_reject_other_shapes() {
        let themes: Result<ThemeList, _> = serde_json::from_str("42");
        assert!(themes.is_err());
    }

    #[test]
    fn metadata_subtitle_defaults_to_empty() {
        let meta: Metadata =
            serde_json::from_str(r#"{"title": "Exclusion"}"#).unwrap();
        assert_eq!(meta.title, "Exclusion");
        assert!(meta.subtitle.is_empty());
    }
}

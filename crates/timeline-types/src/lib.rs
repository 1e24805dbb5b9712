//! Shared type definitions for the timeline state store.
//!
//! Everything the backend sends and everything the UI reads out of the
//! store is defined here. Types flow to `TypeScript` via `ts-rs` so the
//! timeline components consume the same schemas.
//!
//! # Modules
//!
//! - [`ids`] -- String newtypes for timeline slugs and group ids
//! - [`enums`] -- The fixed event-type set and the backend endpoints
//! - [`payloads`] -- Backend response schemas and boundary validation
//! - [`structs`] -- Selected-event record and per-endpoint load status

pub mod enums;
pub mod ids;
pub mod payloads;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Endpoint, EventType, UnknownEventType};
pub use ids::{GroupId, Slug};
pub use payloads::{
    GroupEntry, Metadata, PayloadError, RegionGroup, RegionMember, Theme, ThemeList, Validate,
    YearSettings,
};
pub use structs::{EventRecord, LoadStatus};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the UI layer.

    #[test]
    fn export_bindings() {
        // Exported files land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::Slug::export_all();
        let _ = crate::ids::GroupId::export_all();

        let _ = crate::enums::EventType::export_all();
        let _ = crate::enums::Endpoint::export_all();

        let _ = crate::payloads::Metadata::export_all();
        let _ = crate::payloads::GroupEntry::export_all();
        let _ = crate::payloads::RegionGroup::export_all();
        let _ = crate::payloads::RegionMember::export_all();
        let _ = crate::payloads::YearSettings::export_all();
        let _ = crate::payloads::Theme::export_all();

        let _ = crate::structs::EventRecord::export_all();
        let _ = crate::structs::LoadStatus::export_all();
    }
}

//! Roster Store - relational persistence for the roster pipeline
//!
//! Holds every durable entity:
//! - Organizations and members (with membership links)
//! - Rosters, their shifts and the members' answers
//! - Assignments (finalized shifts) and their member sets
//! - Templates, template shifts and standing preferences
//!
//! The [`EntityStore`] trait is the only seam services talk to;
//! [`MemoryStore`] is the in-process implementation.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{constraints, StoreError, StoreResult};
pub use ids::{
    AnswerId, AssignmentId, MemberId, OrganizationId, PreferenceId, RosterId, ShiftId,
    TemplateId, TemplateShiftId,
};
pub use memory::MemoryStore;
pub use model::{
    Answer, Assignment, Member, Organization, Roster, RosterPatch, RosterQuery, Shift, Template,
    TemplatePreference, TemplateShift, Timestamps,
};
pub use store::EntityStore;

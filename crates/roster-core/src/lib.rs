//! Roster Core - the roster-to-assignment pipeline
//!
//! Services over an [`EntityStore`](roster_store::EntityStore):
//! - Roster and shift lifecycle with the calendar-day date rule
//! - Template carryover of standing preferences into answers
//! - Answer validation against each roster's value set
//! - Finalization into assignments and per-shift fairness ordering
//! - Template and preference management
//! - Identity-claim membership sync
//!
//! # Example
//!
//! ```rust,ignore
//! use roster_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(organization_id: OrganizationId, date: chrono::DateTime<chrono::FixedOffset>) -> RosterResult<()> {
//! let service = RosterService::new(Arc::new(MemoryStore::new()), RosterConfig::default());
//!
//! let created = service
//!     .create_roster(CreateRoster::new("Borrel", date, organization_id).with_shifts(["Tap", "Kitchen"]))
//!     .await?;
//! service.finalize(created.roster.id).await?;
//!
//! let saved = service.get_assignments(created.roster.id).await?;
//! for ranking in &saved.rankings {
//!     println!("{}: {} candidates", ranking.shift_name, ranking.candidates.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod answers;
mod carryover;
pub mod clock;
pub mod config;
pub mod error;
pub mod fairness;
pub mod finalize;
pub mod identity;
pub mod lifecycle;
pub mod requests;
pub mod seed;
pub mod service;
pub mod templates;

// Re-exports for convenience
pub use clock::{is_today_or_later, Clock, FixedClock, SystemClock};
pub use config::{RosterConfig, UnknownMemberPolicy};
pub use error::{RosterError, RosterResult};
pub use fairness::{rank_candidates, AssignmentHistory, RankedCandidate, ShiftRanking};
pub use finalize::{AssignmentDetails, FinalizeReport, MemberSelection, SavedRoster};
pub use identity::{ClaimError, ClaimMapping, ClientRoles, IdentityClaims, IdentitySync, SyncedMember};
pub use lifecycle::RosterDetails;
pub use requests::{
    CreateAnswer, CreatePreference, CreateRoster, CreateTemplate, RosterUpdate, ShiftUpdate,
    TemplateUpdate,
};
pub use seed::{SeedDocument, SeedSummary};
pub use service::RosterService;
pub use templates::TemplateDetails;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Roster Core
    pub use crate::{
        CreateAnswer, CreateRoster, CreateTemplate, RosterConfig, RosterError, RosterResult,
        RosterService, RosterUpdate, SavedRoster, ShiftUpdate,
    };
    pub use roster_store::{EntityStore, MemoryStore, MemberId, OrganizationId, RosterId};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

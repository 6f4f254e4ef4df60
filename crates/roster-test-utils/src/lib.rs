//! Testing utilities for the roster workspace
//!
//! Shared fixtures: a service on an in-memory store with a pinned clock,
//! plus helpers that write organizations, members and past history
//! directly to the store.

#![allow(missing_docs)]

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use roster_core::{CreateRoster, FixedClock, RosterConfig, RosterDetails, RosterService};
use roster_store::{
    Assignment, EntityStore, Member, MemberId, MemoryStore, Organization, OrganizationId,
    Roster, Shift,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Instant the fixture clock is pinned to: 2030-06-15 12:00 UTC
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 15, 12, 0, 0).unwrap()
}

/// Offset used for roster dates in tests
pub fn offset() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).unwrap()
}

/// 18:00 local (+02:00) on the fixture's today shifted by `days`
pub fn days_from_today(days: i64) -> DateTime<FixedOffset> {
    offset().with_ymd_and_hms(2030, 6, 15, 18, 0, 0).unwrap() + Duration::days(days)
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub service: RosterService,
    next_external_id: AtomicU64,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(RosterConfig::default())
    }

    pub fn with_config(config: RosterConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let service = RosterService::new(store.clone(), config).with_clock(FixedClock(now()));
        Self {
            store,
            service,
            next_external_id: AtomicU64::new(1000),
        }
    }

    pub async fn organization(&self, name: &str) -> Organization {
        self.store
            .insert_organization(Organization::new(name))
            .await
            .unwrap()
    }

    pub async fn member(&self, name: &str, organization: OrganizationId) -> Member {
        let external_id = self.next_external_id.fetch_add(1, Ordering::Relaxed);
        self.store
            .insert_member(Member::new(name, external_id).with_organization(organization))
            .await
            .unwrap()
    }

    /// Roster dated tomorrow with the given shifts
    pub async fn roster(&self, organization: OrganizationId, shifts: &[&str]) -> RosterDetails {
        self.service
            .create_roster(
                CreateRoster::new("Borrel", days_from_today(1), organization)
                    .with_shifts(shifts.iter().copied()),
            )
            .await
            .unwrap()
    }

    /// Finalized roster `days_ago` days in the past with one `shift_name`
    /// assignment holding `members`
    pub async fn past_assignment(
        &self,
        organization: OrganizationId,
        shift_name: &str,
        days_ago: i64,
        members: &[MemberId],
    ) -> Assignment {
        let mut roster = Roster::new(
            organization,
            format!("Past {shift_name}"),
            days_from_today(-days_ago),
            self.service.config().default_values.clone(),
        );
        roster.finalized = true;
        let roster = self.store.insert_roster(roster).await.unwrap();
        let shift = self
            .store
            .insert_shift(Shift::new(roster.id, shift_name, 0))
            .await
            .unwrap();

        let mut assignment = Assignment::placeholder(roster.id, shift.id);
        assignment.members = members.iter().copied().collect::<BTreeSet<_>>();
        self.store.insert_assignment(assignment).await.unwrap()
    }
}

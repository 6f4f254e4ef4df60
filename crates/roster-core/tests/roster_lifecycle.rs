use chrono::{NaiveDate, TimeZone};
use pretty_assertions::assert_eq;
use roster_core::{CreateAnswer, CreateRoster, RosterError, RosterUpdate, ShiftUpdate};
use roster_store::{EntityStore, OrganizationId, RosterQuery};
use roster_test_utils::{days_from_today, offset, Fixture};

#[tokio::test]
async fn test_create_roster_loads_organization_and_shifts() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;

    let created = fx.roster(org.id, &["A", "B", "C"]).await;

    assert_eq!(created.organization, org);
    assert_eq!(created.roster.values, vec!["J", "X", "L", "N"]);
    assert!(!created.roster.finalized);
    let orders: Vec<_> = created.shifts.iter().map(|s| (s.name.as_str(), s.order)).collect();
    assert_eq!(orders, vec![("A", 0), ("B", 1), ("C", 2)]);
    assert!(created.answers.is_empty());
}

#[tokio::test]
async fn test_create_roster_validates_input() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;

    let blank = fx
        .service
        .create_roster(CreateRoster::new("  ", days_from_today(1), org.id))
        .await
        .unwrap_err();
    assert!(matches!(blank, RosterError::InvalidInput(_)));

    let missing = fx
        .service
        .create_roster(CreateRoster::new("Borrel", days_from_today(1), OrganizationId::new()))
        .await
        .unwrap_err();
    assert!(missing.is_not_found());

    let blank_shift = fx
        .service
        .create_roster(CreateRoster::new("Borrel", days_from_today(1), org.id).with_shifts(["A", ""]))
        .await
        .unwrap_err();
    assert!(matches!(blank_shift, RosterError::InvalidInput(_)));

    assert!(fx.service.get_rosters(&RosterQuery::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_calendar_day_rule() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;

    let yesterday = fx
        .service
        .create_roster(CreateRoster::new("Borrel", days_from_today(-1), org.id))
        .await
        .unwrap_err();
    assert!(matches!(yesterday, RosterError::InvalidInput(_)));

    // Earlier today than the clock still counts as today
    let early_today = offset().with_ymd_and_hms(2030, 6, 15, 0, 30, 0).unwrap();
    assert!(fx
        .service
        .create_roster(CreateRoster::new("Borrel", early_today, org.id))
        .await
        .is_ok());
    assert!(fx
        .service
        .create_roster(CreateRoster::new("Borrel", days_from_today(0), org.id))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_get_rosters_uses_and_semantics() {
    let fx = Fixture::new();
    let bar = fx.organization("Bar").await;
    let board = fx.organization("Board").await;

    let first = fx.roster(bar.id, &["Tap"]).await;
    let later = fx
        .service
        .create_roster(CreateRoster::new("Borrel", days_from_today(7), bar.id))
        .await
        .unwrap();
    fx.roster(board.id, &[]).await;

    assert_eq!(fx.service.get_rosters(&RosterQuery::all()).await.unwrap().len(), 3);
    assert_eq!(
        fx.service
            .get_rosters(&RosterQuery::in_organization(bar.id))
            .await
            .unwrap()
            .len(),
        2
    );

    let mut query = RosterQuery::in_organization(bar.id);
    query.date = NaiveDate::from_ymd_opt(2030, 6, 22);
    let found = fx.service.get_rosters(&query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].roster.id, later.roster.id);

    let by_id = fx
        .service
        .get_rosters(&RosterQuery::by_id(first.roster.id))
        .await
        .unwrap();
    assert_eq!(by_id[0].shifts.len(), 1);
    assert_eq!(by_id[0].organization.name, "Bar");
}

#[tokio::test]
async fn test_update_roster_is_partial() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;
    let created = fx.roster(org.id, &["Tap"]).await;

    let renamed = fx
        .service
        .update_roster(created.roster.id, RosterUpdate::name("Summer borrel"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Summer borrel");
    assert_eq!(renamed.date, created.roster.date);

    let past = fx
        .service
        .update_roster(created.roster.id, RosterUpdate::date(days_from_today(-2)))
        .await
        .unwrap_err();
    assert!(matches!(past, RosterError::InvalidInput(_)));

    let moved = fx
        .service
        .update_roster(created.roster.id, RosterUpdate::date(days_from_today(3)))
        .await
        .unwrap();
    assert_eq!(moved.name, "Summer borrel");
    assert_eq!(moved.date, days_from_today(3));

    let missing = fx
        .service
        .update_roster(roster_store::RosterId::new(), RosterUpdate::name("x"))
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn test_finalized_roster_cannot_be_reopened() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;
    let created = fx.roster(org.id, &["Tap"]).await;
    fx.service.finalize(created.roster.id).await.unwrap();

    let err = fx
        .service
        .update_roster(
            created.roster.id,
            RosterUpdate {
                finalized: Some(false),
                ..RosterUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::InvalidInput(_)));
    assert!(fx.service.get_roster(created.roster.id).await.unwrap().roster.finalized);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rename_and_finalize_keep_each_others_changes() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;

    for round in 0..50 {
        let created = fx.roster(org.id, &["Tap", "Kitchen"]).await;
        let id = created.roster.id;
        let name = format!("Borrel {round}");

        let finalizer = tokio::spawn({
            let service = fx.service.clone();
            async move { service.finalize(id).await }
        });
        let renamer = tokio::spawn({
            let service = fx.service.clone();
            let name = name.clone();
            async move { service.update_roster(id, RosterUpdate::name(name)).await }
        });
        let (finalized, renamed) = tokio::join!(finalizer, renamer);
        finalized.unwrap().unwrap();
        renamed.unwrap().unwrap();

        let stored = fx.store.get_roster(id).await.unwrap().unwrap();
        assert!(stored.finalized);
        assert_eq!(stored.name, name);
        assert_eq!(fx.store.assignments_of_roster(id).await.unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_finalize_does_not_restore_stale_fields() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;
    let created = fx.roster(org.id, &["Tap"]).await;

    fx.service
        .update_roster(created.roster.id, RosterUpdate::date(days_from_today(5)))
        .await
        .unwrap();
    let report = fx.service.finalize(created.roster.id).await.unwrap();
    assert_eq!(report.roster.date, days_from_today(5));

    let renamed = fx
        .service
        .update_roster(created.roster.id, RosterUpdate::name("Late borrel"))
        .await
        .unwrap();
    assert!(renamed.finalized);
    assert_eq!(renamed.date, days_from_today(5));
}

#[tokio::test]
async fn test_shifts_append_after_current_max() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;
    let created = fx.roster(org.id, &["A", "B", "C"]).await;

    assert!(fx.service.delete_shift(created.shifts[2].id).await.unwrap());
    let d = fx.service.create_shift(created.roster.id, "D").await.unwrap();
    assert_eq!(d.order, 2);

    fx.service.delete_shift(created.shifts[0].id).await.unwrap();
    let e = fx.service.create_shift(created.roster.id, "E").await.unwrap();
    assert_eq!(e.order, 3);

    let empty = fx.roster(org.id, &[]).await;
    let first = fx.service.create_shift(empty.roster.id, "First").await.unwrap();
    assert_eq!(first.order, 0);

    let missing = fx
        .service
        .create_shift(roster_store::RosterId::new(), "Tap")
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn test_update_shift_swaps_orders() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;
    let created = fx.roster(org.id, &["A", "B", "C"]).await;

    let moved = fx
        .service
        .update_shift(created.shifts[0].id, ShiftUpdate { order: Some(2) })
        .await
        .unwrap();
    assert_eq!(moved.order, 2);

    let details = fx.service.get_roster(created.roster.id).await.unwrap();
    let names: Vec<_> = details.shifts.iter().map(|s| (s.name.as_str(), s.order)).collect();
    assert_eq!(names, vec![("C", 0), ("B", 1), ("A", 2)]);

    let unchanged = fx
        .service
        .update_shift(created.shifts[1].id, ShiftUpdate::default())
        .await
        .unwrap();
    assert_eq!(unchanged.order, 1);
}

#[tokio::test]
async fn test_create_shift_after_highest_order_is_rejected() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;
    let created = fx.roster(org.id, &["A", "B"]).await;

    fx.service
        .update_shift(created.shifts[1].id, ShiftUpdate { order: Some(u32::MAX) })
        .await
        .unwrap();
    let err = fx
        .service
        .create_shift(created.roster.id, "C")
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::InvalidInput(_)));

    let details = fx.service.get_roster(created.roster.id).await.unwrap();
    let orders: Vec<_> = details.shifts.iter().map(|s| (s.name.as_str(), s.order)).collect();
    assert_eq!(orders, vec![("A", 0), ("B", u32::MAX)]);

    // Freeing the top order makes room again
    fx.service
        .update_shift(created.shifts[1].id, ShiftUpdate { order: Some(1) })
        .await
        .unwrap();
    let c = fx.service.create_shift(created.roster.id, "C").await.unwrap();
    assert_eq!(c.order, 2);
}

#[tokio::test]
async fn test_delete_roster_cascades() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;
    let alice = fx.member("Alice", org.id).await;
    let created = fx.roster(org.id, &["Tap", "Kitchen"]).await;
    let roster_id = created.roster.id;

    fx.service
        .create_answer(CreateAnswer {
            member_id: alice.id,
            roster_id,
            shift_id: created.shifts[0].id,
            value: "J".into(),
        })
        .await
        .unwrap();
    fx.service.finalize(roster_id).await.unwrap();

    assert!(fx.service.delete_roster(roster_id).await.unwrap());

    assert!(fx
        .service
        .get_rosters(&RosterQuery::by_id(roster_id))
        .await
        .unwrap()
        .is_empty());
    assert!(fx.store.shifts_of_roster(roster_id).await.unwrap().is_empty());
    assert!(fx.store.answers_of_roster(roster_id).await.unwrap().is_empty());
    assert!(fx.store.assignments_of_roster(roster_id).await.unwrap().is_empty());
    assert!(fx.store.get_shift(created.shifts[1].id).await.unwrap().is_none());

    // Deleting again is a no-op
    assert!(!fx.service.delete_roster(roster_id).await.unwrap());
    assert!(fx.service.get_roster(roster_id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_delete_shift_cascades_answers_and_assignment() {
    let fx = Fixture::new();
    let org = fx.organization("Bar").await;
    let alice = fx.member("Alice", org.id).await;
    let created = fx.roster(org.id, &["Tap", "Kitchen"]).await;
    let tap = created.shifts[0].id;

    let answer = fx
        .service
        .create_answer(CreateAnswer {
            member_id: alice.id,
            roster_id: created.roster.id,
            shift_id: tap,
            value: "X".into(),
        })
        .await
        .unwrap();
    fx.service.finalize(created.roster.id).await.unwrap();

    assert!(fx.service.delete_shift(tap).await.unwrap());
    assert!(fx.store.get_answer(answer.id).await.unwrap().is_none());
    let remaining = fx.store.assignments_of_roster(created.roster.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].shift_id, created.shifts[1].id);

    assert!(!fx.service.delete_shift(tap).await.unwrap());
}

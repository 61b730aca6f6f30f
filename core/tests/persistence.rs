//! Store tests: realm state round trip and lock-step closure logging.

use auctrack_core::{
    process_snapshot, ClosureRecord, ClosureSink, Listing, Outcome, RealmState, TimeLeft,
    TrackStore,
};
use chrono::{DateTime, TimeZone, Utc};

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + minutes * 60, 0).unwrap()
}

fn listing(auc: i64, bid: i64, time_left: TimeLeft) -> Listing {
    Listing {
        auc,
        item: 82800,
        owner: "Seller".to_string(),
        owner_realm: "Fordragon".to_string(),
        bid,
        buyout: bid * 2,
        quantity: 1,
        time_left,
        rand: 0,
        seed: 0,
        context: 0,
        modifiers: None,
        bonus_lists: None,
        pet: None,
    }
}

fn store() -> TrackStore {
    let store = TrackStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

#[test]
fn missing_realm_loads_as_empty_state() {
    let store = store();
    let state = store.load_realm_state("eu:fordragon").unwrap();
    assert_eq!(state.realm, "eu:fordragon");
    assert_eq!(state.last_time, None);
    assert_eq!(state.open_count(), 0);
}

#[test]
fn realm_state_round_trips() {
    let mut store = store();
    let mut state = RealmState::new("eu:fordragon");

    process_snapshot(
        &mut state,
        at(0),
        &[
            listing(1, 100, TimeLeft::Long),
            listing(2, 50, TimeLeft::VeryLong),
        ],
        &mut store,
    )
    .unwrap();
    process_snapshot(
        &mut state,
        at(10),
        &[
            listing(1, 120, TimeLeft::Long),
            listing(2, 50, TimeLeft::VeryLong),
        ],
        &mut store,
    )
    .unwrap();

    store.save_realm_state(&state).unwrap();
    let loaded = store.load_realm_state("eu:fordragon").unwrap();

    assert_eq!(loaded.last_time, state.last_time);
    assert_eq!(loaded.open_count(), state.open_count());
    assert_eq!(loaded.work_set, state.work_set);
}

#[test]
fn save_overwrites_previous_state() {
    let mut store = store();
    let mut state = RealmState::new("eu:fordragon");

    process_snapshot(&mut state, at(0), &[listing(1, 100, TimeLeft::Long)], &mut store).unwrap();
    store.save_realm_state(&state).unwrap();

    process_snapshot(&mut state, at(10), &[], &mut store).unwrap();
    store.save_realm_state(&state).unwrap();

    let loaded = store.load_realm_state("eu:fordragon").unwrap();
    assert_eq!(loaded.last_time, Some(at(10)));
    assert_eq!(loaded.open_count(), 0);
}

#[test]
fn closure_and_listing_logs_append_in_lock_step() {
    let mut store = store();
    let mut state = RealmState::new("eu:fordragon");

    process_snapshot(
        &mut state,
        at(0),
        &[
            listing(1, 100, TimeLeft::Short),
            listing(2, 50, TimeLeft::VeryLong),
        ],
        &mut store,
    )
    .unwrap();
    process_snapshot(&mut state, at(60), &[], &mut store).unwrap();

    assert_eq!(store.closure_count("eu:fordragon").unwrap(), 2);
    assert_eq!(store.logged_listing_count("eu:fordragon").unwrap(), 2);

    let closures = store.closures_for_realm("eu:fordragon").unwrap();
    let listings = store.logged_listings("eu:fordragon").unwrap();
    assert_eq!(closures.len(), listings.len());
    for (closure, logged) in closures.iter().zip(&listings) {
        assert_eq!(closure.listing_id, logged.auc);
    }
}

#[test]
fn appended_closures_read_back_in_order() {
    let mut store = store();
    let base = ClosureRecord {
        listing_id: 0,
        opened_at: at(0),
        closed_at: at(30),
        outcome: Outcome::Expired,
        profit: 0,
    };

    for id in 1..=5 {
        let record = ClosureRecord {
            listing_id: id,
            ..base.clone()
        };
        let pos = store
            .append("eu:fordragon", &record, &listing(id, 10, TimeLeft::Long))
            .unwrap();
        assert_eq!(pos, id);
    }

    let ids: Vec<i64> = store
        .closures_for_realm("eu:fordragon")
        .unwrap()
        .iter()
        .map(|c| c.listing_id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn closure_records_survive_the_round_trip_intact() {
    let mut store = store();
    let record = ClosureRecord {
        listing_id: 42,
        opened_at: at(0),
        closed_at: at(90),
        outcome: Outcome::Auctioned,
        profit: 7500,
    };
    let mut sold = listing(42, 7500, TimeLeft::Medium);
    sold.owner = "Hunter".to_string();
    store.append("eu:fordragon", &record, &sold).unwrap();

    let read_back = store.closures_for_realm("eu:fordragon").unwrap();
    assert_eq!(read_back, vec![record]);

    let listings = store.logged_listings("eu:fordragon").unwrap();
    assert_eq!(listings[0].owner, "Hunter");
}

#[test]
fn realms_are_isolated_in_the_logs() {
    let mut store = store();
    let record = ClosureRecord {
        listing_id: 1,
        opened_at: at(0),
        closed_at: at(30),
        outcome: Outcome::Expired,
        profit: 0,
    };
    store.append("eu:fordragon", &record, &listing(1, 10, TimeLeft::Long)).unwrap();
    store.append("us:area-52", &record, &listing(1, 10, TimeLeft::Long)).unwrap();

    assert_eq!(store.closure_count("eu:fordragon").unwrap(), 1);
    assert_eq!(store.closure_count("us:area-52").unwrap(), 1);
    assert_eq!(store.closure_count("eu:silvermoon").unwrap(), 0);
}

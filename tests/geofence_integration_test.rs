//! Integration tests for geofence registration and enter/exit dispatch.

mod helpers;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use geowatch_core::geofence::{GeofenceDefinition, GeofenceError, IdentifierStrategy};
use geowatch_core::location::Coordinates;
use geowatch_core::native::NativeError;
use geowatch_core::testing::NativeCall;
use helpers::{capture_logs, harness, harness_with};

fn home() -> Coordinates {
    Coordinates::new(37.7749, -122.4194)
}

#[test]
fn registered_home_geofence_monitors_its_center() {
    let h = harness();

    let id = h
        .services
        .geofence(GeofenceDefinition::new(home(), 100.0).with_identifier("home"))
        .unwrap();

    assert_eq!(id, "home");
    assert!(h.services.is_position_monitored(&home()));
    assert!(!h
        .services
        .is_position_monitored(&Coordinates::new(37.7849, -122.4194)));
    assert_eq!(h.services.geofence_count(), 1);
    assert!(h.services.is_listening_for_geofence_events());
}

#[test]
fn first_registration_clears_stale_native_regions() {
    let h = harness();

    h.services
        .geofence(GeofenceDefinition::new(home(), 50.0).with_identifier("a"))
        .unwrap();
    h.services
        .geofence(GeofenceDefinition::new(home(), 50.0).with_identifier("b"))
        .unwrap();

    let operations: Vec<&str> = h.native.calls().iter().map(NativeCall::operation).collect();
    assert_eq!(
        operations,
        vec!["clear_all_geofences", "set_geofence", "set_geofence"]
    );
}

#[test]
fn exit_with_expiry_runs_callback_then_removes() {
    let h = harness();
    let exits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&exits);

    h.services
        .geofence(
            GeofenceDefinition::new(home(), 100.0)
                .with_identifier("home")
                .on_did_exit(move |region| {
                    assert_eq!(region.identifier, "home");
                    counter.set(counter.get() + 1);
                })
                .expire_on_exit(true),
        )
        .unwrap();

    h.native.exit("home");

    assert_eq!(exits.get(), 1);
    assert!(!h.services.is_position_monitored(&home()));
    assert!(h.services.registered_geofences().is_empty());
    assert!(h.native.native_regions().is_empty());
    assert_eq!(h.services.geofence_count(), 0);

    // A second exit finds nothing and is ignored.
    h.native.exit("home");
    assert_eq!(exits.get(), 1);
}

#[test]
fn exit_without_expiry_keeps_geofence() {
    let h = harness();
    h.services
        .geofence(GeofenceDefinition::new(home(), 100.0).with_identifier("home"))
        .unwrap();

    h.native.exit("home");

    assert!(h.services.is_position_monitored(&home()));
    assert_eq!(h.native.native_regions().len(), 1);
}

#[test]
fn enter_for_unknown_identifier_is_logged_and_ignored() {
    let h = harness();
    let entered = Rc::new(Cell::new(false));
    let flag = Rc::clone(&entered);
    h.services
        .geofence(
            GeofenceDefinition::new(home(), 100.0)
                .with_identifier("home")
                .on_did_enter(move |_| flag.set(true)),
        )
        .unwrap();

    let (_, logs) = capture_logs(|| h.native.enter("office"));

    assert!(!entered.get());
    assert!(logs.contains("no geofence registered for enter event"));
    assert!(logs.contains("office"));
}

#[test]
fn enter_runs_only_the_matching_callback() {
    let h = harness();
    let seen = Rc::new(RefCell::new(Vec::new()));

    for name in ["home", "office"] {
        let sink = Rc::clone(&seen);
        h.services
            .geofence(
                GeofenceDefinition::new(home(), 100.0)
                    .with_identifier(name)
                    .on_did_enter(move |region| sink.borrow_mut().push(region.identifier.clone())),
            )
            .unwrap();
    }

    h.native.enter("office");

    assert_eq!(*seen.borrow(), vec!["office".to_string()]);
}

#[test]
fn clear_all_empties_local_and_native_state() {
    let h = harness();
    for name in ["a", "b", "c"] {
        h.services
            .geofence(GeofenceDefinition::new(home(), 25.0).with_identifier(name))
            .unwrap();
    }

    h.services.clear_all_geofences().unwrap();

    assert!(h.services.registered_geofences().is_empty());
    assert!(h.native.native_regions().is_empty());
    assert_eq!(h.services.geofence_count(), 0);
    assert!(!h.services.is_position_monitored(&home()));
}

#[test]
fn monitored_regions_reports_what_native_tracks() {
    let h = harness();
    h.services
        .geofence(GeofenceDefinition::new(home(), 100.0).with_identifier("home"))
        .unwrap();
    h.services
        .geofence(GeofenceDefinition::new(Coordinates::new(0.0, 0.0), 10.0))
        .unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    h.services
        .monitored_regions(move |regions| {
            *sink.borrow_mut() = regions.into_iter().map(|r| r.identifier).collect();
        })
        .unwrap();

    assert_eq!(*seen.borrow(), vec!["_0".to_string(), "home".to_string()]);
}

#[test]
fn remove_unknown_identifier_is_not_found() {
    let h = harness();

    let err = h.services.remove_geofence("nowhere").unwrap_err();

    assert_eq!(err, GeofenceError::NotFound("nowhere".to_string()));
    assert!(h.native.calls().is_empty());
}

#[test]
fn remove_stops_native_monitoring() {
    let h = harness();
    h.services
        .geofence(GeofenceDefinition::new(home(), 100.0).with_identifier("home"))
        .unwrap();

    h.services.remove_geofence("home").unwrap();

    assert!(!h.services.is_position_monitored(&home()));
    assert!(h.native.native_regions().is_empty());
    assert_eq!(h.native.count("remove_geofence"), 1);
}

#[test]
fn native_refusal_leaves_registry_untouched() {
    let h = harness();
    h.native.fail_next(
        "set_geofence",
        NativeError::OperationFailed {
            operation: "set_geofence".to_string(),
            message: "region limit reached".to_string(),
        },
    );

    let result = h
        .services
        .geofence(GeofenceDefinition::new(home(), 100.0).with_identifier("home"));

    assert!(matches!(result, Err(GeofenceError::Native(_))));
    assert!(h.services.registered_geofences().is_empty());
    assert_eq!(h.services.geofence_count(), 0);
}

#[test]
fn generated_identifiers_are_sequential_and_unique() {
    let h = harness();

    let first = h
        .services
        .geofence(GeofenceDefinition::new(home(), 10.0))
        .unwrap();
    h.services
        .geofence(GeofenceDefinition::new(home(), 10.0).with_identifier("_1"))
        .unwrap();
    let third = h
        .services
        .geofence(GeofenceDefinition::new(home(), 10.0))
        .unwrap();

    assert_eq!(first, "_0");
    assert_eq!(third, "_2");
}

#[test]
fn random_identifiers_are_underscore_prefixed_numbers() {
    let h = harness_with(IdentifierStrategy::Random);

    let id = h
        .services
        .geofence(GeofenceDefinition::new(home(), 10.0))
        .unwrap();

    let digits = id.strip_prefix('_').expect("generated ids start with '_'");
    assert!(digits.parse::<u64>().unwrap() < 999_999_999);
}

#[test]
fn enter_callback_may_register_another_geofence() {
    let h = harness();
    let handle = Rc::downgrade(&h.services);

    h.services
        .geofence(
            GeofenceDefinition::new(home(), 100.0)
                .with_identifier("home")
                .on_did_enter(move |region| {
                    if let Some(services) = handle.upgrade() {
                        services
                            .geofence(
                                GeofenceDefinition::new(region.coords, 500.0)
                                    .with_identifier("neighborhood"),
                            )
                            .unwrap();
                    }
                }),
        )
        .unwrap();

    h.native.enter("home");

    let ids: Vec<String> = h
        .services
        .registered_geofences()
        .into_iter()
        .map(|r| r.identifier)
        .collect();
    assert_eq!(ids, vec!["home".to_string(), "neighborhood".to_string()]);
    assert_eq!(h.native.native_regions().len(), 2);
}

#[test]
fn exit_callback_that_removes_its_geofence_does_not_double_remove() {
    let h = harness();
    let handle = Rc::downgrade(&h.services);

    h.services
        .geofence(
            GeofenceDefinition::new(home(), 100.0)
                .with_identifier("home")
                .on_did_exit(move |region| {
                    if let Some(services) = handle.upgrade() {
                        services.remove_geofence(&region.identifier).unwrap();
                    }
                })
                .expire_on_exit(true),
        )
        .unwrap();

    h.native.exit("home");

    assert_eq!(h.native.count("remove_geofence"), 1);
    assert_eq!(h.services.geofence_count(), 0);
}

#[test]
fn exit_callback_can_rearm_geofence_without_expiry() {
    let h = harness();
    let handle = Rc::downgrade(&h.services);

    h.services
        .geofence(
            GeofenceDefinition::new(home(), 100.0)
                .with_identifier("home")
                .on_did_exit(move |region| {
                    if let Some(services) = handle.upgrade() {
                        services
                            .geofence(
                                GeofenceDefinition::new(region.coords, 200.0)
                                    .with_identifier("home"),
                            )
                            .unwrap();
                    }
                })
                .expire_on_exit(true),
        )
        .unwrap();

    h.native.exit("home");

    let regions = h.services.registered_geofences();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].radius, 200.0);
    assert!(!regions[0].expire_on_exit);
    assert!(h.services.is_position_monitored(&home()));
    assert_eq!(h.native.native_regions().len(), 1);
    assert_eq!(h.native.count("remove_geofence"), 0);
}

#[test]
fn json_exit_event_from_host_expires_geofence() {
    let h = harness();
    h.services
        .geofence(
            GeofenceDefinition::new(home(), 100.0)
                .with_identifier("home")
                .expire_on_exit(true),
        )
        .unwrap();

    let delivered = h
        .services
        .emitter()
        .emit_json(r#"{"event":"geofenceExited","body":{"identifier":"home"}}"#)
        .unwrap();

    assert_eq!(delivered, 1);
    assert!(h.services.registered_geofences().is_empty());
}

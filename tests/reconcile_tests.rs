// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reconciliation Adapter Tests
//!
//! Plan, apply, import and bulk refresh over tracked state.

mod fixtures;

use cim_cf_domain::domain::{DomainScope, Guid};
use cim_cf_domain::reconcile::{ATTR_DOMAIN, ATTR_ORG, ATTR_ROUTER_GROUP, ATTR_SUB_DOMAIN};
use cim_cf_domain::{DomainError, DomainKind, DomainSpec, Plan, ResourceHooks, TrackedState};
use fixtures::*;
use pretty_assertions::assert_eq;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_plan_without_state_is_create() {
    let fx = seeded_plane();
    let plan = assert_ok!(
        resource(&fx.plane, 3)
            .plan(&DomainSpec::shared("dev", "example.com"), None)
            .await
    );
    assert_eq!(plan, Plan::Create);
}

#[tokio::test]
async fn test_plan_rejects_invalid_spec() {
    let fx = seeded_plane();
    let err = assert_err!(
        resource(&fx.plane, 3)
            .plan(&DomainSpec::default(), None)
            .await
    );
    assert!(matches!(err, DomainError::InvalidSpec(_)));
}

#[tokio::test]
async fn test_plan_resolves_router_group_name_before_comparing() {
    let fx = seeded_plane();
    let resource = resource(&fx.plane, 3);
    let spec = DomainSpec::shared("tcp-test", "example.com").with_router_group(TCP_ROUTER_GROUP);

    let state = assert_ok!(resource.create(&spec).await);
    assert_eq!(state.get(ATTR_ROUTER_GROUP), Some(fx.tcp_group.guid.as_str()));

    let plan = assert_ok!(resource.plan(&spec, Some(&state)).await);
    assert_eq!(plan, Plan::NoChange);
}

#[tokio::test]
async fn test_plan_detects_identity_changes() {
    let fx = seeded_plane();
    let resource = resource(&fx.plane, 3);
    let state = assert_ok!(resource.create(&DomainSpec::shared("team", "example.com")).await);

    let to_private = DomainSpec {
        org: Some(ORG_GUID.to_string()),
        ..DomainSpec::shared("team", "example.com")
    };
    assert_eq!(
        assert_ok!(resource.plan(&to_private, Some(&state)).await),
        Plan::Replace {
            fields: vec![ATTR_ORG.to_string()]
        }
    );

    let renamed = DomainSpec::shared("crew", "example.com").with_router_group(HTTP_ROUTER_GROUP);
    assert_eq!(
        assert_ok!(resource.plan(&renamed, Some(&state)).await),
        Plan::Replace {
            fields: vec!["name".to_string(), ATTR_ROUTER_GROUP.to_string()]
        }
    );
}

#[tokio::test]
async fn test_apply_replaces_by_delete_then_create() {
    let fx = seeded_plane();
    let resource = resource(&fx.plane, 3);
    let shared = assert_ok!(resource.create(&DomainSpec::shared("team", "example.com")).await);

    let private_spec = DomainSpec {
        org: Some(ORG_GUID.to_string()),
        ..DomainSpec::shared("team", "example.com")
    };
    let private = assert_ok!(resource.apply(&private_spec, Some(&shared)).await);

    assert_ne!(private.id, shared.id);
    assert_eq!(private.kind(), DomainKind::Private);
    assert_eq!(private.get(ATTR_ORG), Some(ORG_GUID));
    assert!(!fx.plane.contains(&shared.id));
    assert_eq!(fx.plane.delete_calls(), 1);
    assert_eq!(fx.plane.live_domains().len(), 1);
}

#[tokio::test]
async fn test_apply_without_changes_refreshes() {
    let fx = seeded_plane();
    let resource = resource(&fx.plane, 3);
    let spec = DomainSpec::private("pcfdev-org.io", ORG_GUID);
    let state = assert_ok!(resource.apply(&spec, None).await);

    let again = assert_ok!(resource.apply(&spec, Some(&state)).await);

    assert_eq!(again, state);
    assert_eq!(fx.plane.create_calls(), 1);
}

#[tokio::test]
async fn test_apply_recreates_vanished_domain() {
    let fx = seeded_plane();
    let resource = resource(&fx.plane, 3);
    let spec = DomainSpec::shared("dev", "example.com");
    let state = assert_ok!(resource.create(&spec).await);

    // Removed outside of reconciliation
    assert_ok!(resource.delete(&state).await);

    let recreated = assert_ok!(resource.apply(&spec, Some(&state)).await);
    assert_ne!(recreated.id, state.id);
    assert_eq!(fx.plane.create_calls(), 2);
}

#[tokio::test]
async fn test_create_is_idempotent_for_same_spec() {
    let fx = seeded_plane();
    let resource = resource(&fx.plane, 3);
    let spec = DomainSpec::shared("dev", "example.com");

    let first = assert_ok!(resource.create(&spec).await);
    let second = assert_ok!(resource.create(&spec).await);

    assert_eq!(first, second);
    assert_eq!(fx.plane.create_calls(), 1);
}

#[tokio::test]
async fn test_read_keeps_declared_split() {
    let fx = seeded_plane();
    let resource = resource(&fx.plane, 3);
    let state = assert_ok!(resource.create(&DomainSpec::shared("a.b", "example.com")).await);

    let refreshed = assert_ok!(resource.read(&state).await).expect("domain should exist");
    assert_eq!(refreshed.get(ATTR_SUB_DOMAIN), Some("a.b"));
    assert_eq!(refreshed.get(ATTR_DOMAIN), Some("example.com"));
}

#[tokio::test]
async fn test_apply_records_resplit_of_same_name() {
    let fx = seeded_plane();
    let resource = resource(&fx.plane, 3);
    let state = assert_ok!(resource.create(&DomainSpec::shared("a.b", "example.com")).await);

    let resplit = DomainSpec::shared("a", "b.example.com");
    assert_eq!(
        assert_ok!(resource.plan(&resplit, Some(&state)).await),
        Plan::NoChange
    );

    let applied = assert_ok!(resource.apply(&resplit, Some(&state)).await);

    assert_eq!(applied.id, state.id);
    assert_eq!(applied.get(ATTR_SUB_DOMAIN), Some("a"));
    assert_eq!(applied.get(ATTR_DOMAIN), Some("b.example.com"));
    assert_eq!(fx.plane.create_calls(), 1);
    assert_eq!(fx.plane.delete_calls(), 0);

    // The recorded split survives the next refresh
    let refreshed = assert_ok!(resource.read(&applied).await);
    assert_eq!(refreshed, Some(applied));
}

#[tokio::test]
async fn test_read_missing_is_absent() {
    let fx = seeded_plane();
    let resource = resource(&fx.plane, 3);
    let mut state = TrackedState::new(Guid::generate());
    state.set("name", "dev.example.com");

    // A missing entity is absence, not an error
    assert_eq!(assert_ok!(resource.read(&state).await), None);

    let err = assert_err!(resource.delete(&TrackedState::new(Guid::generate())).await);
    assert!(matches!(err, DomainError::InvalidSpec(_)));
}

#[tokio::test]
async fn test_import_by_guid() {
    let fx = seeded_plane();
    let seeded = fx.plane.seed_domain(
        "pcfdev-org.io",
        DomainScope::Private {
            owning_organization_guid: Guid::new(ORG_GUID),
        },
    );

    let state = assert_ok!(resource(&fx.plane, 3).import(&seeded.guid).await);

    assert_eq!(state.id, seeded.guid);
    assert_eq!(state.kind(), DomainKind::Private);
    assert_eq!(state.get(ATTR_SUB_DOMAIN), Some("pcfdev-org"));
    assert_eq!(state.get(ATTR_DOMAIN), Some("io"));

    let err = assert_err!(resource(&fx.plane, 3).import(&Guid::generate()).await);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_refresh_all_preserves_order() {
    let fx = seeded_plane();
    let resource = resource(&fx.plane, 3);

    let mut states = Vec::new();
    for sub in ["one", "two", "three"] {
        states.push(assert_ok!(resource.create(&DomainSpec::shared(sub, "example.com")).await));
    }
    assert_ok!(resource.delete(&states[1]).await);

    let results = resource.refresh_all(states.clone()).await;

    assert_eq!(results.len(), 3);
    let refreshed: Vec<Option<TrackedState>> = results
        .into_iter()
        .map(|r| r.expect("refresh should not fail"))
        .collect();
    assert_eq!(refreshed[0].as_ref(), Some(&states[0]));
    assert_eq!(refreshed[1], None);
    assert_eq!(refreshed[2].as_ref(), Some(&states[2]));
}

//! Integration tests for the resource object model.
//!
//! These tests cover naming, URL derivation, wire serialization, equality,
//! the parent/child graph and ownership checks. Nothing here talks to a
//! transport.

mod common;

use common::{Bus, Domain, Enterprise, Gateway, Group, Metadata, Policy, User, Zone, BASE};
use rest_resource::rest::{
    object_with_id, AsObjectRef, ChildKind, Entity, Handle, ObjectRef, RestObject,
};
use rest_resource::{CurrentUser, ResourceError};
use serde_json::json;

fn group(id: Option<&str>, name: &str) -> Group {
    let mut group = Group::default();
    group.base.id = id.map(ToString::to_string);
    group.name = Some(name.to_string());
    group
}

// ============================================================================
// Naming and URLs
// ============================================================================

#[test]
fn test_resource_name_pluralization() {
    assert_eq!(Enterprise::default().resource_name(), "enterprises");
    assert_eq!(Policy::default().resource_name(), "policies");
    assert_eq!(Gateway::default().resource_name(), "gateways");
    assert_eq!(Bus::default().resource_name(), "bus");
}

#[test]
fn test_fixed_resource_name() {
    assert_eq!(Metadata::default().resource_name(), "metadata");
    assert_eq!(
        Metadata::default().resource_url(BASE),
        format!("{BASE}/metadata")
    );
}

#[test]
fn test_resource_url_switches_on_id() {
    let mut group = Group::default();
    assert_eq!(group.resource_url(BASE), format!("{BASE}/groups"));

    group.base.id = Some("42".to_string());
    assert_eq!(group.resource_url(BASE), format!("{BASE}/groups/42"));
}

#[test]
fn test_resource_url_encodes_id() {
    let mut group = Group::default();
    group.base.id = Some("a b/c".to_string());
    assert_eq!(group.resource_url(BASE), format!("{BASE}/groups/a%20b%2Fc"));
}

#[test]
fn test_resource_url_for_child_type() {
    let mut enterprise = Enterprise::default();
    enterprise.base.id = Some("e1".to_string());

    assert_eq!(
        enterprise.resource_url_for_child(BASE, &ChildKind::of::<Group>()),
        format!("{BASE}/enterprises/e1/groups")
    );
}

// ============================================================================
// Wire Serialization
// ============================================================================

#[test]
fn test_to_wire_uses_remote_names_and_coerces_booleans() {
    let mut group = group(Some("g1"), "engineering");
    group.private = Some(true);
    group.member_count = Some(3);

    let wire = group.to_wire();

    assert_eq!(wire["ID"], json!("g1"));
    assert_eq!(wire["name"], json!("engineering"));
    assert_eq!(wire["private"], json!(1));
    assert_eq!(wire["memberCount"], json!(3));
    assert!(!wire.contains_key("member_count"));
}

#[test]
fn test_local_and_external_ids_are_not_exposed_by_default() {
    let mut group = group(Some("g1"), "engineering");
    group.base.local_id = Some("local".to_string());
    group.base.external_id = Some("ext".to_string());

    let wire = group.to_wire();
    assert!(!wire.contains_key("localID"));
    assert!(!wire.contains_key("externalID"));

    let mut metadata = Metadata::default();
    metadata.base.external_id = Some("ext".to_string());
    assert_eq!(metadata.to_wire()["externalID"], json!("ext"));
}

#[test]
fn test_round_trip_restores_exposed_fields() {
    let mut original = group(Some("g1"), "engineering");
    original.private = Some(false);
    original.member_count = Some(12);
    original.base.parent_id = Some("e1".to_string());
    original.base.parent_type = Some("enterprise".to_string());
    original.base.template_id = Some("t1".to_string());

    let mut copy = Group::default();
    let report = copy.from_wire(&original.to_wire());

    assert!(report.is_clean());
    assert_eq!(copy.base.id, original.base.id);
    assert_eq!(copy.name, original.name);
    assert_eq!(copy.private, original.private);
    assert_eq!(copy.member_count, original.member_count);
    assert_eq!(copy.base.parent_id, original.base.parent_id);
    assert_eq!(copy.base.parent_type, original.base.parent_type);
    assert_eq!(copy.base.template_id, original.base.template_id);
}

#[test]
fn test_from_wire_ignores_unknown_keys_and_rejects_mistyped_values() {
    let mut group = group(Some("g1"), "before");
    let wire = json!({
        "name": "after",
        "memberCount": "many",
        "somethingNew": true,
    });

    let report = group.from_wire(wire.as_object().unwrap());

    assert_eq!(group.name.as_deref(), Some("after"));
    assert_eq!(group.member_count, None);
    assert_eq!(report.ignored, vec!["somethingNew".to_string()]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].attribute, "member_count");
}

#[test]
fn test_from_wire_reads_timestamps_as_epoch_millis() {
    let mut group = Group::default();
    let wire = json!({"creationDate": 1_700_000_000_000_i64});

    group.from_wire(wire.as_object().unwrap());

    assert_eq!(
        group.base.creation_date.unwrap().timestamp_millis(),
        1_700_000_000_000
    );
}

#[test]
fn test_base_attributes_flags() {
    let registry = Group::registry();

    assert!(registry.descriptor("id").unwrap().is_identifier);
    assert!(!registry.descriptor("creation_date").unwrap().is_editable);
    assert!(registry.descriptor("owner").unwrap().is_readonly);
    assert!(registry.descriptor("last_updated_by").unwrap().is_readonly);
    assert!(registry.descriptor("local_id").is_none());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_checks_descriptor_constraints() {
    let user = User {
        user_name: None,
        email: Some("not-an-email".to_string()),
        ..User::default()
    };

    let Err(ResourceError::ValidationFailed { errors, .. }) = user.validate() else {
        panic!("expected validation to fail");
    };
    assert!(errors.contains_key("user_name"));
    assert!(errors.contains_key("email"));

    let valid = User {
        user_name: Some("jdoe".to_string()),
        email: Some("jdoe@example.com".to_string()),
        ..User::default()
    };
    assert!(valid.validate().is_ok());
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn test_equality_by_id_ignores_other_fields() {
    let a: &dyn RestObject = &group(Some("g1"), "one");
    let b: &dyn RestObject = &group(Some("g1"), "two");
    let c: &dyn RestObject = &group(Some("g2"), "one");

    assert!(a == b);
    assert!(a != c);
}

#[test]
fn test_equality_never_crosses_types() {
    let mut policy = Policy::default();
    policy.base.id = Some("1".to_string());
    let mut gateway = Gateway::default();
    gateway.base.id = Some("1".to_string());

    let policy: &dyn RestObject = &policy;
    let gateway: &dyn RestObject = &gateway;
    assert!(policy != gateway);
}

#[test]
fn test_equality_falls_back_to_local_id() {
    let mut a = group(None, "one");
    a.base.local_id = Some("tmp-1".to_string());
    let mut b = group(None, "two");
    b.base.local_id = Some("tmp-1".to_string());

    assert!(a.is_same_as(&b));
    assert!(!group(None, "x").is_same_as(&group(None, "x")));
}

#[test]
fn test_equality_skips_empty_ids() {
    assert!(!group(Some(""), "one").is_same_as(&group(Some(""), "one")));

    let mut a = group(Some(""), "one");
    a.base.local_id = Some("tmp-1".to_string());
    let mut b = group(Some(""), "two");
    b.base.local_id = Some("tmp-1".to_string());
    assert!(a.is_same_as(&b));
}

// ============================================================================
// Parent/Child Graph
// ============================================================================

#[test]
fn test_add_same_child_twice_keeps_one_entry() {
    let enterprise = Handle::new(Enterprise::default());

    assert!(enterprise.add_child(&Handle::new(group(Some("g1"), "a"))));
    assert!(!enterprise.add_child(&Handle::new(group(Some("g1"), "b"))));

    assert_eq!(enterprise.get_children("group").len(), 1);
    assert!(enterprise.get_children("user").is_empty());
}

#[test]
fn test_children_keep_insertion_order() {
    let enterprise = Handle::new(Enterprise::default());
    for id in ["g3", "g1", "g2"] {
        enterprise.add_child(&Handle::new(group(Some(id), id)));
    }

    let ids: Vec<_> = enterprise
        .get_children("group")
        .iter()
        .filter_map(|child| child.read().base().id.clone())
        .collect();
    assert_eq!(ids, ["g3", "g1", "g2"]);
}

#[test]
fn test_nearest_parent_matching_three_levels() {
    let enterprise: ObjectRef = Handle::new(Enterprise::default()).as_object();
    let domain = Handle::new(Domain::default());
    let zone = Handle::new(Zone::default());

    domain.set_parent(Some(&enterprise)).unwrap();
    zone.set_parent(Some(&domain.as_object())).unwrap();

    let found = zone.nearest_parent_matching(&["enterprise"]).unwrap();
    assert!(found.ptr_eq(&enterprise));

    let nearest = zone.nearest_parent_matching(&["enterprise", "domain"]).unwrap();
    assert!(nearest.ptr_eq(&domain));

    assert!(zone.nearest_parent_matching(&["l2domain"]).is_none());
}

#[test]
fn test_set_parent_refuses_cycle() {
    let domain = Handle::new(Domain::default());
    let zone = Handle::new(Zone::default());
    zone.set_parent(Some(&domain.as_object())).unwrap();

    let result = domain.set_parent(Some(&zone.as_object()));
    assert!(matches!(result, Err(ResourceError::ParentCycle { .. })));
    assert!(domain.parent().is_none());
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn test_ownership_uses_client_current_user() {
    let transport = common::RecordingTransport::ok();
    let client = common::client(&transport).with_current_user(CurrentUser::new("u-1", "csproot"));

    let enterprise = Handle::new(Enterprise::default());
    enterprise.write().base.owner = Some("u-1".to_string());
    let domain = Handle::new(Domain::default());
    domain.write().base.owner = Some("u-2".to_string());
    domain.set_parent(Some(&enterprise.as_object())).unwrap();

    assert!(enterprise.is_owned_by_current_user(&client).unwrap());
    assert!(!domain.is_owned_by_current_user(&client).unwrap());
    assert!(domain
        .is_parent_owned_by_current_user(&client, &["enterprise"])
        .unwrap());
    assert!(!domain
        .is_parent_owned_by_current_user(&client, &["l2domain"])
        .unwrap());
}

#[test]
fn test_parent_ownership_checks_every_matching_ancestor() {
    let transport = common::RecordingTransport::ok();
    let client = common::client(&transport).with_current_user(CurrentUser::new("u-1", "csproot"));

    let enterprise = Handle::new(Enterprise::default());
    enterprise.write().base.owner = Some("u-1".to_string());
    let domain = Handle::new(Domain::default());
    domain.write().base.owner = Some("u-2".to_string());
    let zone = Handle::new(Zone::default());
    zone.write().base.owner = Some("u-3".to_string());
    domain.set_parent(Some(&enterprise.as_object())).unwrap();
    zone.set_parent(Some(&domain.as_object())).unwrap();

    assert!(zone
        .is_parent_owned_by_current_user(&client, &["domain", "enterprise"])
        .unwrap());
    assert!(domain
        .is_parent_owned_by_current_user(&client, &["domain", "enterprise"])
        .unwrap());
    assert!(!zone
        .is_parent_owned_by_current_user(&client, &["zone", "domain"])
        .unwrap());
}

#[test]
fn test_ownership_requires_current_user() {
    let transport = common::RecordingTransport::ok();
    let client = common::client(&transport);
    let enterprise = Handle::new(Enterprise::default());

    assert!(matches!(
        enterprise.is_owned_by_current_user(&client),
        Err(ResourceError::CurrentUserNotSet)
    ));
}

// ============================================================================
// Generic Objects
// ============================================================================

#[test]
fn test_object_with_id_carries_only_the_id() {
    let object = object_with_id("u-9");
    assert_eq!(object.read().base().id.as_deref(), Some("u-9"));
    assert_eq!(object.read().to_wire()["ID"], json!("u-9"));
}

#[test]
#[should_panic(expected = "has no defined remote name")]
fn test_naming_a_generic_object_panics() {
    let object = object_with_id("u-9");
    let _ = object.read().resource_url(BASE);
}

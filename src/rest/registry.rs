//! Per-type attribute registries.
//!
//! Every resource type builds one [`AttributeRegistry`] the first time it is
//! needed and keeps it in a `static`. The registry maps local names to
//! [`AttributeDescriptor`]s and pairs each descriptor with a getter/setter
//! for the field that backs it, so serialization never looks fields up by
//! name at runtime.
//!
//! # Example
//!
//! ```rust
//! use std::sync::OnceLock;
//! use rest_resource::rest::{Attribute, AttributeRegistry, Entity, HasObjectBase, ObjectBase};
//!
//! #[derive(Debug, Default)]
//! struct Group {
//!     base: ObjectBase,
//!     name: Option<String>,
//! }
//!
//! impl HasObjectBase for Group {
//!     fn base(&self) -> &ObjectBase { &self.base }
//!     fn base_mut(&mut self) -> &mut ObjectBase { &mut self.base }
//! }
//!
//! impl Entity for Group {
//!     const REMOTE_NAME: &'static str = "group";
//!
//!     fn registry() -> &'static AttributeRegistry<Self> {
//!         static REGISTRY: OnceLock<AttributeRegistry<Group>> = OnceLock::new();
//!         REGISTRY.get_or_init(|| {
//!             AttributeRegistry::builder()
//!                 .expose(Attribute::new("name", |g: &Group| &g.name, |g| &mut g.name).required())
//!                 .build()
//!         })
//!     }
//! }
//!
//! assert!(Group::registry().descriptor("name").unwrap().is_required);
//! assert_eq!(Group::registry().descriptor("id").unwrap().remote_name, "ID");
//! ```

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::{trace, warn};

use crate::clients::WireMap;
use crate::rest::attribute::{AttributeDescriptor, AttributeType, WireTypeError, WireValue};
use crate::rest::object::HasObjectBase;

type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), WireTypeError> + Send + Sync>;

struct Accessor<T> {
    get: Getter<T>,
    set: Setter<T>,
}

/// A descriptor together with the field that backs it.
pub struct Attribute<T> {
    descriptor: AttributeDescriptor,
    accessor: Option<Accessor<T>>,
}

impl<T: 'static> Attribute<T> {
    /// Exposes the field reached through `get` and `get_mut` under `local_name`.
    ///
    /// The attribute type is taken from the field's [`WireValue`] impl.
    #[must_use]
    pub fn new<F: WireValue>(
        local_name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        Self {
            descriptor: AttributeDescriptor::new(local_name, F::KIND),
            accessor: Some(Accessor {
                get: Box::new(move |object: &T| get(object).to_wire()),
                set: Box::new(move |object: &mut T, value: Value| {
                    *get_mut(object) = F::from_wire(value)?;
                    Ok(())
                }),
            }),
        }
    }

    /// Exposes an attribute that no field backs.
    ///
    /// Unbound attributes are described but never serialized, and incoming
    /// values for them are ignored.
    #[must_use]
    pub const fn unbound(local_name: &'static str, value_type: AttributeType) -> Self {
        Self {
            descriptor: AttributeDescriptor::new(local_name, value_type),
            accessor: None,
        }
    }
}

impl<T> Attribute<T> {
    /// Returns the descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &AttributeDescriptor {
        &self.descriptor
    }

    /// Returns `true` if a field backs this attribute.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.accessor.is_some()
    }

    /// Sets the wire name.
    #[must_use]
    pub const fn remote_name(mut self, name: &'static str) -> Self {
        self.descriptor.remote_name = name;
        self
    }

    /// Sets the human readable name.
    #[must_use]
    pub const fn display_name(mut self, name: &'static str) -> Self {
        self.descriptor.display_name = name;
        self
    }

    /// Marks the attribute as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.descriptor.is_required = true;
        self
    }

    /// Marks the attribute as computed by the server.
    #[must_use]
    pub const fn readonly(mut self) -> Self {
        self.descriptor.is_readonly = true;
        self
    }

    /// Marks the attribute as fixed after creation.
    #[must_use]
    pub const fn not_editable(mut self) -> Self {
        self.descriptor.is_editable = false;
        self
    }

    /// Marks the attribute as the identifier.
    #[must_use]
    pub const fn identifier(mut self) -> Self {
        self.descriptor.is_identifier = true;
        self
    }

    /// Marks the attribute as unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.descriptor.is_unique = true;
        self
    }

    /// Marks the attribute as an email address.
    #[must_use]
    pub const fn email(mut self) -> Self {
        self.descriptor.is_email = true;
        self
    }

    /// Marks the attribute as a login name.
    #[must_use]
    pub const fn login(mut self) -> Self {
        self.descriptor.is_login = true;
        self
    }

    /// Marks the attribute as a secret.
    #[must_use]
    pub const fn password(mut self) -> Self {
        self.descriptor.is_password = true;
        self
    }

    /// Sets the minimum length of string values.
    #[must_use]
    pub const fn min_length(mut self, length: usize) -> Self {
        self.descriptor.min_length = Some(length);
        self
    }

    /// Sets the maximum length of string values.
    #[must_use]
    pub const fn max_length(mut self, length: usize) -> Self {
        self.descriptor.max_length = Some(length);
        self
    }

    /// Restricts string values to `choices`.
    #[must_use]
    pub const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.descriptor.choices = Some(choices);
        self
    }

    /// Allows ordering collections by this attribute.
    #[must_use]
    pub const fn orderable(mut self) -> Self {
        self.descriptor.can_order = true;
        self
    }

    /// Allows searching collections by this attribute.
    #[must_use]
    pub const fn searchable(mut self) -> Self {
        self.descriptor.can_search = true;
        self
    }
}

impl<T> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("descriptor", &self.descriptor)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// A wire value that was refused while merging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedValue {
    /// Local name of the attribute.
    pub attribute: &'static str,
    /// Why the value was refused.
    pub error: WireTypeError,
}

/// What happened to each key of a merged wire mapping.
///
/// Merging never fails as a whole: unknown keys are ignored and values of
/// the wrong shape are rejected one by one, leaving the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Local names of the attributes that were set.
    pub applied: Vec<&'static str>,
    /// Wire keys no bound attribute is exposed under.
    pub ignored: Vec<String>,
    /// Values that did not match their attribute's type.
    pub rejected: Vec<RejectedValue>,
}

impl MergeReport {
    /// Returns `true` if no value was rejected.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// The exposed attributes of one resource type.
pub struct AttributeRegistry<T> {
    attributes: Vec<Attribute<T>>,
    by_remote_name: HashMap<&'static str, usize>,
}

impl<T: HasObjectBase + 'static> AttributeRegistry<T> {
    /// Creates a builder seeded with the attributes every resource exposes.
    ///
    /// | local name          | remote name       | flags        |
    /// |---------------------|-------------------|--------------|
    /// | `id`                | `ID`              | identifier   |
    /// | `parent_id`         | `parentID`        |              |
    /// | `parent_type`       | `parentType`      |              |
    /// | `creation_date`     | `creationDate`    | not editable |
    /// | `owner`             | `owner`           | read-only    |
    /// | `last_updated_date` | `lastUpdatedDate` | read-only    |
    /// | `last_updated_by`   | `lastUpdatedBy`   | read-only    |
    ///
    /// `external_id`, `local_id` and `template_id` are not exposed unless
    /// the type asks for them.
    #[must_use]
    pub fn builder() -> AttributeRegistryBuilder<T> {
        AttributeRegistryBuilder {
            attributes: Vec::new(),
        }
        .expose(
            Attribute::new("id", |o: &T| &o.base().id, |o| &mut o.base_mut().id)
                .remote_name("ID")
                .identifier(),
        )
        .expose(
            Attribute::new(
                "parent_id",
                |o: &T| &o.base().parent_id,
                |o| &mut o.base_mut().parent_id,
            )
            .remote_name("parentID"),
        )
        .expose(
            Attribute::new(
                "parent_type",
                |o: &T| &o.base().parent_type,
                |o| &mut o.base_mut().parent_type,
            )
            .remote_name("parentType"),
        )
        .expose(
            Attribute::new(
                "creation_date",
                |o: &T| &o.base().creation_date,
                |o| &mut o.base_mut().creation_date,
            )
            .remote_name("creationDate")
            .not_editable(),
        )
        .expose(
            Attribute::new("owner", |o: &T| &o.base().owner, |o| &mut o.base_mut().owner)
                .readonly(),
        )
        .expose(
            Attribute::new(
                "last_updated_date",
                |o: &T| &o.base().last_updated_date,
                |o| &mut o.base_mut().last_updated_date,
            )
            .remote_name("lastUpdatedDate")
            .readonly(),
        )
        .expose(
            Attribute::new(
                "last_updated_by",
                |o: &T| &o.base().last_updated_by,
                |o| &mut o.base_mut().last_updated_by,
            )
            .remote_name("lastUpdatedBy")
            .readonly(),
        )
    }
}

impl<T> AttributeRegistry<T> {
    /// Returns all descriptors, in exposure order.
    pub fn descriptors(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.iter().map(Attribute::descriptor)
    }

    /// Returns the descriptor exposed under `local_name`.
    #[must_use]
    pub fn descriptor(&self, local_name: &str) -> Option<&AttributeDescriptor> {
        self.attributes
            .iter()
            .map(Attribute::descriptor)
            .find(|d| d.local_name == local_name)
    }

    /// Returns the descriptor whose wire name is `remote_name`.
    #[must_use]
    pub fn descriptor_by_remote_name(&self, remote_name: &str) -> Option<&AttributeDescriptor> {
        self.by_remote_name
            .get(remote_name)
            .map(|&index| self.attributes[index].descriptor())
    }

    /// Returns the number of exposed attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` if nothing is exposed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Serializes every bound attribute of `object`.
    #[must_use]
    pub fn to_wire(&self, object: &T) -> WireMap {
        let mut map = WireMap::new();
        for attribute in &self.attributes {
            let Some(accessor) = &attribute.accessor else {
                trace!(attribute = attribute.descriptor.local_name, "Skipping unbound attribute");
                continue;
            };
            map.insert(
                attribute.descriptor.remote_name.to_string(),
                (accessor.get)(object),
            );
        }
        map
    }

    /// Applies a wire mapping to `object`.
    ///
    /// Keys no bound attribute is exposed under are ignored. Values of the
    /// wrong shape leave their field untouched.
    pub fn from_wire(&self, object: &mut T, map: &WireMap) -> MergeReport {
        let mut report = MergeReport::default();

        for (key, value) in map {
            let accessor = self
                .by_remote_name
                .get(key.as_str())
                .map(|&index| &self.attributes[index])
                .and_then(|attribute| {
                    attribute
                        .accessor
                        .as_ref()
                        .map(|accessor| (attribute.descriptor.local_name, accessor))
                });

            let Some((local_name, accessor)) = accessor else {
                trace!(key = %key, "Ignoring wire key with no exposed attribute");
                report.ignored.push(key.clone());
                continue;
            };

            match (accessor.set)(object, value.clone()) {
                Ok(()) => report.applied.push(local_name),
                Err(error) => {
                    warn!(attribute = local_name, %error, "Rejected wire value");
                    report.rejected.push(RejectedValue {
                        attribute: local_name,
                        error,
                    });
                }
            }
        }

        report
    }

    /// Checks the values of `object` against the descriptor metadata.
    ///
    /// Returns the messages per local name; an empty map means the object
    /// is valid. Read-only attributes are not checked.
    #[must_use]
    pub fn validate(&self, object: &T) -> HashMap<String, Vec<String>> {
        let mut errors: HashMap<String, Vec<String>> = HashMap::new();

        for attribute in &self.attributes {
            let descriptor = &attribute.descriptor;
            let Some(accessor) = &attribute.accessor else {
                continue;
            };
            if descriptor.is_readonly {
                continue;
            }

            let messages = check_value(descriptor, &(accessor.get)(object));
            if !messages.is_empty() {
                errors
                    .entry(descriptor.local_name.to_string())
                    .or_default()
                    .extend(messages);
            }
        }

        errors
    }
}

fn check_value(descriptor: &AttributeDescriptor, value: &Value) -> Vec<String> {
    let mut messages = Vec::new();

    let absent = match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if absent {
        if descriptor.is_required {
            messages.push(format!("{} is required", descriptor.display_name));
        }
        return messages;
    }

    let Value::String(text) = value else {
        return messages;
    };
    let length = text.chars().count();

    if let Some(min) = descriptor.min_length.filter(|&min| length < min) {
        messages.push(format!(
            "{} must be at least {min} characters",
            descriptor.display_name
        ));
    }
    if let Some(max) = descriptor.max_length.filter(|&max| length > max) {
        messages.push(format!(
            "{} must be at most {max} characters",
            descriptor.display_name
        ));
    }
    if let Some(choices) = descriptor.choices {
        if !choices.contains(&text.as_str()) {
            messages.push(format!(
                "{} must be one of: {}",
                descriptor.display_name,
                choices.join(", ")
            ));
        }
    }
    if descriptor.is_email && !looks_like_email(text) {
        messages.push(format!("{} is not a valid email", descriptor.display_name));
    }

    messages
}

fn looks_like_email(text: &str) -> bool {
    text.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    })
}

impl<T> fmt::Debug for AttributeRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.descriptors()).finish()
    }
}

/// Builder for [`AttributeRegistry`].
pub struct AttributeRegistryBuilder<T> {
    attributes: Vec<Attribute<T>>,
}

impl<T> AttributeRegistryBuilder<T> {
    /// Exposes an attribute.
    ///
    /// Exposing the same local name again replaces the earlier attribute in
    /// place, which lets a type re-expose a base field with other flags.
    #[must_use]
    pub fn expose(mut self, attribute: Attribute<T>) -> Self {
        let local_name = attribute.descriptor.local_name;
        if let Some(existing) = self
            .attributes
            .iter_mut()
            .find(|a| a.descriptor.local_name == local_name)
        {
            *existing = attribute;
        } else {
            self.attributes.push(attribute);
        }
        self
    }

    /// Builds the registry.
    ///
    /// When two attributes share a wire name, the later one receives
    /// incoming values.
    #[must_use]
    pub fn build(self) -> AttributeRegistry<T> {
        let by_remote_name = self
            .attributes
            .iter()
            .enumerate()
            .map(|(index, attribute)| (attribute.descriptor.remote_name, index))
            .collect();
        AttributeRegistry {
            attributes: self.attributes,
            by_remote_name,
        }
    }
}

impl<T: HasObjectBase + 'static> AttributeRegistryBuilder<T> {
    /// Exposes `external_id` as `externalID`.
    #[must_use]
    pub fn expose_external_id(self) -> Self {
        self.expose(
            Attribute::new(
                "external_id",
                |o: &T| &o.base().external_id,
                |o| &mut o.base_mut().external_id,
            )
            .remote_name("externalID"),
        )
    }

    /// Exposes `local_id` as `localID`.
    #[must_use]
    pub fn expose_local_id(self) -> Self {
        self.expose(
            Attribute::new(
                "local_id",
                |o: &T| &o.base().local_id,
                |o| &mut o.base_mut().local_id,
            )
            .remote_name("localID"),
        )
    }

    /// Exposes `template_id` as `templateID`.
    #[must_use]
    pub fn expose_template_id(self) -> Self {
        self.expose(
            Attribute::new(
                "template_id",
                |o: &T| &o.base().template_id,
                |o| &mut o.base_mut().template_id,
            )
            .remote_name("templateID"),
        )
    }
}

impl<T> fmt::Debug for AttributeRegistryBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeRegistryBuilder")
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::object::ObjectBase;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct User {
        base: ObjectBase,
        user_name: Option<String>,
        email: Option<String>,
        role: Option<String>,
        disabled: Option<bool>,
        avatar: Option<String>,
    }

    impl HasObjectBase for User {
        fn base(&self) -> &ObjectBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ObjectBase {
            &mut self.base
        }
    }

    fn registry() -> AttributeRegistry<User> {
        AttributeRegistry::builder()
            .expose(
                Attribute::new("user_name", |u: &User| &u.user_name, |u| &mut u.user_name)
                    .remote_name("userName")
                    .required()
                    .min_length(3)
                    .max_length(8)
                    .login(),
            )
            .expose(Attribute::new("email", |u: &User| &u.email, |u| &mut u.email).email())
            .expose(
                Attribute::new("role", |u: &User| &u.role, |u| &mut u.role)
                    .choices(&["ADMIN", "USER"]),
            )
            .expose(Attribute::new("disabled", |u: &User| &u.disabled, |u| &mut u.disabled))
            .expose(Attribute::unbound("avatar_data", AttributeType::String).remote_name("avatarData"))
            .build()
    }

    #[test]
    fn test_builder_seeds_base_attributes() {
        let registry = registry();

        let id = registry.descriptor("id").unwrap();
        assert_eq!(id.remote_name, "ID");
        assert!(id.is_identifier);
        assert!(!registry.descriptor("creation_date").unwrap().is_editable);
        assert!(registry.descriptor("owner").unwrap().is_readonly);
        assert!(registry.descriptor("last_updated_by").unwrap().is_readonly);
        assert!(registry.descriptor("external_id").is_none());
        assert!(registry.descriptor("local_id").is_none());
        assert_eq!(registry.len(), 12);
    }

    #[test]
    fn test_expose_last_write_wins() {
        let registry = AttributeRegistry::<User>::builder()
            .expose(Attribute::new("owner", |u: &User| &u.base.owner, |u| &mut u.base.owner))
            .build();

        let owner = registry.descriptor("owner").unwrap();
        assert!(!owner.is_readonly);
        assert_eq!(registry.descriptors().filter(|d| d.local_name == "owner").count(), 1);
    }

    #[test]
    fn test_optional_base_exposures() {
        let registry = AttributeRegistry::<User>::builder()
            .expose_external_id()
            .expose_local_id()
            .expose_template_id()
            .build();

        assert_eq!(registry.descriptor("external_id").unwrap().remote_name, "externalID");
        assert_eq!(registry.descriptor_by_remote_name("localID").unwrap().local_name, "local_id");
        assert!(registry.descriptor_by_remote_name("templateID").is_some());
    }

    #[test]
    fn test_to_wire_uses_remote_names_and_skips_unbound() {
        let registry = registry();
        let mut user = User::default();
        user.base.id = Some("u-1".to_string());
        user.user_name = Some("jdoe".to_string());
        user.disabled = Some(true);
        user.avatar = Some("ignored".to_string());

        let wire = registry.to_wire(&user);

        assert_eq!(wire["ID"], json!("u-1"));
        assert_eq!(wire["userName"], json!("jdoe"));
        assert_eq!(wire["disabled"], json!(1));
        assert_eq!(wire["email"], Value::Null);
        assert!(!wire.contains_key("avatarData"));
        assert!(!wire.contains_key("externalID"));
    }

    #[test]
    fn test_from_wire_reports_applied_ignored_and_rejected() {
        let registry = registry();
        let mut user = User::default();
        user.disabled = Some(false);

        let wire = json!({
            "ID": "u-2",
            "userName": "alice",
            "disabled": "nope",
            "unknownKey": 3,
            "avatarData": "..."
        });
        let report = registry.from_wire(&mut user, wire.as_object().unwrap());

        assert_eq!(user.base.id.as_deref(), Some("u-2"));
        assert_eq!(user.user_name.as_deref(), Some("alice"));
        assert_eq!(user.disabled, Some(false));
        assert_eq!(report.applied.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].attribute, "disabled");
        assert!(report.ignored.contains(&"unknownKey".to_string()));
        assert!(report.ignored.contains(&"avatarData".to_string()));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_validate_checks_descriptor_metadata() {
        let registry = registry();
        let mut user = User::default();

        let errors = registry.validate(&user);
        assert_eq!(errors.len(), 1);
        assert!(errors["user_name"][0].contains("required"));

        user.user_name = Some("jo".to_string());
        user.email = Some("not-an-email".to_string());
        user.role = Some("ROOT".to_string());
        let errors = registry.validate(&user);
        assert!(errors["user_name"][0].contains("at least 3"));
        assert!(errors["email"][0].contains("valid email"));
        assert!(errors["role"][0].contains("ADMIN, USER"));

        user.user_name = Some("jdoe".to_string());
        user.email = Some("jdoe@example.com".to_string());
        user.role = Some("USER".to_string());
        assert!(registry.validate(&user).is_empty());
    }

    #[test]
    fn test_validate_skips_readonly_attributes() {
        let registry = AttributeRegistry::<User>::builder()
            .expose(
                Attribute::new("owner", |u: &User| &u.base.owner, |u| &mut u.base.owner)
                    .readonly()
                    .required(),
            )
            .build();

        assert!(registry.validate(&User::default()).is_empty());
    }
}

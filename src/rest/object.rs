//! The resource object model.
//!
//! # Overview
//!
//! - [`ObjectBase`]: The fields every resource carries (identity, ownership,
//!   timestamps, parent link, child collections)
//! - [`Entity`]: Implemented by concrete resource types to declare their
//!   remote name, child collections and attribute registry
//! - [`RestObject`]: The object-safe view the operation pipeline is written
//!   against; every [`Entity`] is a `RestObject`
//! - [`Handle`] and [`ObjectRef`]: Shared, lockable references to resources
//!
//! # Example
//!
//! ```rust
//! use std::sync::OnceLock;
//! use rest_resource::rest::{
//!     Attribute, AttributeRegistry, Entity, Handle, HasObjectBase, ObjectBase, RestObject,
//! };
//!
//! #[derive(Debug, Default)]
//! struct Policy {
//!     base: ObjectBase,
//!     name: Option<String>,
//! }
//!
//! impl HasObjectBase for Policy {
//!     fn base(&self) -> &ObjectBase { &self.base }
//!     fn base_mut(&mut self) -> &mut ObjectBase { &mut self.base }
//! }
//!
//! impl Entity for Policy {
//!     const REMOTE_NAME: &'static str = "policy";
//!
//!     fn registry() -> &'static AttributeRegistry<Self> {
//!         static REGISTRY: OnceLock<AttributeRegistry<Policy>> = OnceLock::new();
//!         REGISTRY.get_or_init(|| {
//!             AttributeRegistry::builder()
//!                 .expose(Attribute::new("name", |p: &Policy| &p.name, |p| &mut p.name))
//!                 .build()
//!         })
//!     }
//! }
//!
//! let policy = Handle::new(Policy::default());
//! assert_eq!(policy.read().resource_name(), "policies");
//! assert_eq!(policy.read().resource_url("https://api.example.com"), "https://api.example.com/policies");
//!
//! policy.write().base_mut().id = Some("7".to_string());
//! assert_eq!(policy.read().resource_url("https://api.example.com"), "https://api.example.com/policies/7");
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use chrono::{DateTime, Utc};

use crate::auth::CurrentUser;
use crate::clients::WireMap;
use crate::rest::attribute::AttributeDescriptor;
use crate::rest::graph::{ChildCollections, ChildKind};
use crate::rest::naming;
use crate::rest::registry::{AttributeRegistry, MergeReport};
use crate::rest::ResourceError;

/// The fields shared by every resource.
#[derive(Clone, Debug, Default)]
pub struct ObjectBase {
    /// Server-assigned identifier; `None` until the resource is created.
    pub id: Option<String>,
    /// Client-side identifier, independent of `id`.
    pub local_id: Option<String>,
    /// Identifier in an external system.
    pub external_id: Option<String>,
    /// Identifier of the user owning the resource.
    pub owner: Option<String>,
    /// Identifier of the parent resource.
    pub parent_id: Option<String>,
    /// Remote name of the parent resource type.
    pub parent_type: Option<String>,
    /// When the resource was created.
    pub creation_date: Option<DateTime<Utc>>,
    /// Identifier of the user who last changed the resource.
    pub last_updated_by: Option<String>,
    /// When the resource was last changed.
    pub last_updated_date: Option<DateTime<Utc>>,
    /// Identifier of the template the resource was instantiated from.
    pub template_id: Option<String>,
    pub(crate) parent: Option<WeakObjectRef>,
    pub(crate) children: ChildCollections,
}

impl ObjectBase {
    /// Creates a base with the given id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Returns the parent, if it is set and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<ObjectRef> {
        self.parent.as_ref().and_then(WeakObjectRef::upgrade)
    }

    /// Returns the child collections.
    #[must_use]
    pub const fn children(&self) -> &ChildCollections {
        &self.children
    }
}

/// Access to the [`ObjectBase`] embedded in a resource.
pub trait HasObjectBase {
    /// Returns the shared fields.
    fn base(&self) -> &ObjectBase;

    /// Returns the shared fields mutably.
    fn base_mut(&mut self) -> &mut ObjectBase;
}

/// A concrete resource type.
///
/// Implementors get [`RestObject`] for free.
pub trait Entity: HasObjectBase + Send + Sync + 'static {
    /// Singular wire name of the type (e.g. `enterprise`).
    const REMOTE_NAME: &'static str;

    /// Use [`Entity::REMOTE_NAME`] as the collection name instead of its plural.
    const RESOURCE_NAME_FIXED: bool = false;

    /// Delete children before deleting the resource itself.
    const CASCADE_DELETE: bool = true;

    /// Child collections that can be fetched from the server.
    const CHILDREN: &'static [ChildKind] = &[];

    /// Returns the attribute registry of the type.
    fn registry() -> &'static AttributeRegistry<Self>
    where
        Self: Sized;
}

/// The object-safe interface of a resource.
///
/// Everything the operation pipeline and the parent/child graph do goes
/// through this trait.
pub trait RestObject: HasObjectBase + Send + Sync + 'static {
    /// Returns the singular wire name of the type.
    fn remote_name(&self) -> &'static str;

    /// Returns `true` if the collection name is not pluralized.
    fn is_resource_name_fixed(&self) -> bool;

    /// Returns `true` if children are deleted before the resource.
    fn cascades_delete(&self) -> bool;

    /// Returns the child collections that can be fetched.
    fn child_kinds(&self) -> &'static [ChildKind];

    /// Returns the exposed attribute descriptors.
    fn attributes(&self) -> Vec<&'static AttributeDescriptor>;

    /// Serializes the exposed attributes.
    fn to_wire(&self) -> WireMap;

    /// Applies a wire mapping.
    fn from_wire(&mut self, map: &WireMap) -> MergeReport;

    /// Checks attribute values against their descriptors.
    fn validation_errors(&self) -> HashMap<String, Vec<String>>;

    /// Returns `self` as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as mutable [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the collection name.
    fn resource_name(&self) -> String {
        naming::resource_name(self.remote_name(), self.is_resource_name_fixed())
    }

    /// Returns the item URL when the resource has an id, otherwise the collection URL.
    fn resource_url(&self, base_url: &str) -> String {
        let name = self.resource_name();
        match &self.base().id {
            Some(id) => naming::item_url(base_url, &name, id),
            None => naming::collection_url(base_url, &name),
        }
    }

    /// Returns the URL of the collection of `kind` nested under this resource.
    fn resource_url_for_child(&self, base_url: &str, kind: &ChildKind) -> String {
        naming::collection_url(&self.resource_url(base_url), &kind.resource_name())
    }

    /// Checks attribute values against their descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ValidationFailed`] listing every failed check.
    fn validate(&self) -> Result<(), ResourceError> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ResourceError::ValidationFailed {
                errors,
                request_id: None,
            })
        }
    }

    /// Returns `true` if both values denote the same remote resource.
    ///
    /// Resources of different types never match. Otherwise ids are compared
    /// when both are non-empty, then local ids; anything else does not match.
    fn is_same_as(&self, other: &dyn RestObject) -> bool {
        fn present(value: Option<&str>) -> Option<&str> {
            value.filter(|s| !s.is_empty())
        }

        if self.remote_name() != other.remote_name() {
            return false;
        }

        let (mine, theirs) = (self.base(), other.base());
        if let (Some(a), Some(b)) = (present(mine.id.as_deref()), present(theirs.id.as_deref())) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (
            present(mine.local_id.as_deref()),
            present(theirs.local_id.as_deref()),
        ) {
            return a == b;
        }
        false
    }

    /// Returns `true` if `user` owns the resource.
    fn is_owned_by(&self, user: &CurrentUser) -> bool {
        self.base().owner.as_deref() == Some(user.id.as_str())
    }
}

impl<T: Entity> RestObject for T {
    fn remote_name(&self) -> &'static str {
        T::REMOTE_NAME
    }

    fn is_resource_name_fixed(&self) -> bool {
        T::RESOURCE_NAME_FIXED
    }

    fn cascades_delete(&self) -> bool {
        T::CASCADE_DELETE
    }

    fn child_kinds(&self) -> &'static [ChildKind] {
        T::CHILDREN
    }

    fn attributes(&self) -> Vec<&'static AttributeDescriptor> {
        T::registry().descriptors().collect()
    }

    fn to_wire(&self) -> WireMap {
        T::registry().to_wire(self)
    }

    fn from_wire(&mut self, map: &WireMap) -> MergeReport {
        T::registry().from_wire(self, map)
    }

    fn validation_errors(&self) -> HashMap<String, Vec<String>> {
        T::registry().validate(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl PartialEq for dyn RestObject {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_as(other)
    }
}

/// A resource of no particular type, carrying only the base fields.
///
/// Useful to refer to a remote resource by id, e.g. in
/// [`Handle::set_entities`]. Its type is unknown, so naming it (and
/// therefore building its URL or comparing it) panics.
#[derive(Debug, Default)]
pub struct GenericObject {
    base: ObjectBase,
}

impl GenericObject {
    /// Creates an object with the given id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            base: ObjectBase::with_id(id),
        }
    }

    fn registry() -> &'static AttributeRegistry<Self> {
        static REGISTRY: OnceLock<AttributeRegistry<GenericObject>> = OnceLock::new();
        REGISTRY.get_or_init(|| AttributeRegistry::builder().build())
    }
}

impl HasObjectBase for GenericObject {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }
}

impl RestObject for GenericObject {
    fn remote_name(&self) -> &'static str {
        unimplemented!("GenericObject has no defined remote name; use a concrete resource type")
    }

    fn is_resource_name_fixed(&self) -> bool {
        false
    }

    fn cascades_delete(&self) -> bool {
        false
    }

    fn child_kinds(&self) -> &'static [ChildKind] {
        &[]
    }

    fn attributes(&self) -> Vec<&'static AttributeDescriptor> {
        Self::registry().descriptors().collect()
    }

    fn to_wire(&self) -> WireMap {
        Self::registry().to_wire(self)
    }

    fn from_wire(&mut self, map: &WireMap) -> MergeReport {
        Self::registry().from_wire(self, map)
    }

    fn validation_errors(&self) -> HashMap<String, Vec<String>> {
        Self::registry().validate(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Returns a [`GenericObject`] reference with the given id.
#[must_use]
pub fn object_with_id(id: impl Into<String>) -> ObjectRef {
    Handle::new(GenericObject::with_id(id)).as_object()
}

/// A shared, lockable reference to a resource.
///
/// Cloning a handle clones the reference, not the resource. Lock poisoning
/// is ignored: a panic while holding the lock leaves the resource readable.
pub struct Handle<T: ?Sized>(Arc<RwLock<T>>);

/// A handle to a resource of any type.
pub type ObjectRef = Handle<dyn RestObject>;

/// A non-owning reference to a resource of any type.
#[derive(Clone)]
pub struct WeakObjectRef(Weak<RwLock<dyn RestObject>>);

impl<T> Handle<T> {
    /// Wraps a resource.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }
}

impl<T: ?Sized> Handle<T> {
    /// Locks the resource for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the resource for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if both handles point to the same resource.
    #[must_use]
    pub fn ptr_eq<U: ?Sized>(&self, other: &Handle<U>) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0).cast::<()>(),
            Arc::as_ptr(&other.0).cast::<()>(),
        )
    }
}

impl<T: ?Sized> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

impl ObjectRef {
    /// Returns a non-owning reference.
    #[must_use]
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Arc::downgrade(&self.0))
    }

    /// Runs `f` on the resource if it is a `T`.
    pub fn read_as<T: RestObject, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.read();
        guard.as_any().downcast_ref::<T>().map(f)
    }

    /// Runs `f` on the resource mutably if it is a `T`.
    pub fn write_as<T: RestObject, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.write();
        guard.as_any_mut().downcast_mut::<T>().map(f)
    }
}

impl WeakObjectRef {
    /// Returns the resource if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(Handle)
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakObjectRef(..)")
    }
}

/// Conversion to an untyped [`ObjectRef`].
pub trait AsObjectRef: Clone + Send + Sync + 'static {
    /// Returns a reference to the same resource.
    fn as_object(&self) -> ObjectRef;
}

impl<T: RestObject> AsObjectRef for Handle<T> {
    fn as_object(&self) -> ObjectRef {
        let object: Arc<RwLock<dyn RestObject>> = self.0.clone();
        Handle(object)
    }
}

impl AsObjectRef for ObjectRef {
    fn as_object(&self) -> ObjectRef {
        self.clone()
    }
}

// Verify handles are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ObjectRef>();
    assert_send_sync::<WeakObjectRef>();
    assert_send_sync::<ObjectBase>();
};

//! The parent/child resource graph.
//!
//! A resource owns named collections of children, keyed by the children's
//! remote name. A child refers back to its parent through a weak reference,
//! so dropping the last handle to a parent frees it even while children
//! remain alive.

use std::collections::BTreeMap;

use crate::clients::RestClient;
use crate::rest::naming;
use crate::rest::object::{AsObjectRef, Entity, Handle, ObjectRef, RestObject};
use crate::rest::ResourceError;

/// Describes a child collection a resource type can fetch.
///
/// # Example
///
/// ```rust,ignore
/// impl Entity for Enterprise {
///     const REMOTE_NAME: &'static str = "enterprise";
///     const CHILDREN: &'static [ChildKind] = &[ChildKind::of::<Group>(), ChildKind::of::<User>()];
///     // ...
/// }
/// ```
#[derive(Clone, Copy)]
pub struct ChildKind {
    remote_name: &'static str,
    resource_name_fixed: bool,
    factory: fn() -> ObjectRef,
}

impl ChildKind {
    /// Describes the children of type `T`.
    #[must_use]
    pub const fn of<T: Entity + Default>() -> Self {
        Self {
            remote_name: T::REMOTE_NAME,
            resource_name_fixed: T::RESOURCE_NAME_FIXED,
            factory: new_object::<T>,
        }
    }

    /// Returns the remote name of the child type, which is also its collection key.
    #[must_use]
    pub const fn remote_name(&self) -> &'static str {
        self.remote_name
    }

    /// Returns the collection name of the child type.
    #[must_use]
    pub fn resource_name(&self) -> String {
        naming::resource_name(self.remote_name, self.resource_name_fixed)
    }

    /// Creates an empty child.
    #[must_use]
    pub fn instantiate(&self) -> ObjectRef {
        (self.factory)()
    }
}

impl std::fmt::Debug for ChildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildKind")
            .field("remote_name", &self.remote_name)
            .field("resource_name_fixed", &self.resource_name_fixed)
            .finish_non_exhaustive()
    }
}

fn new_object<T: Entity + Default>() -> ObjectRef {
    Handle::new(T::default()).as_object()
}

/// The named child collections of one resource.
#[derive(Clone, Debug, Default)]
pub struct ChildCollections {
    collections: BTreeMap<String, Vec<ObjectRef>>,
}

impl ChildCollections {
    /// Returns the members of a collection; empty if the key is unknown.
    #[must_use]
    pub fn get(&self, key: &str) -> &[ObjectRef] {
        self.collections.get(key).map_or(&[], Vec::as_slice)
    }

    /// Returns the keys of all registered collections.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Returns `true` if no collection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub(crate) fn insert(&mut self, key: String, members: Vec<ObjectRef>) {
        self.collections.insert(key, members);
    }

    pub(crate) fn entry(&mut self, key: &str) -> &mut Vec<ObjectRef> {
        self.collections.entry(key.to_string()).or_default()
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Vec<ObjectRef>> {
        self.collections.get_mut(key)
    }

    pub(crate) fn clear(&mut self, key: &str) {
        if let Some(members) = self.collections.get_mut(key) {
            members.clear();
        }
    }
}

/// Returns `true` if both references denote the same remote resource.
pub(crate) fn same_resource(a: &ObjectRef, b: &ObjectRef) -> bool {
    a.ptr_eq(b) || *a.read() == *b.read()
}

impl<T> Handle<T>
where
    T: RestObject + ?Sized,
    Self: AsObjectRef,
{
    /// Replaces the collection stored under `key`.
    pub fn register_children(&self, key: impl Into<String>, children: Vec<ObjectRef>) {
        self.write().base_mut().children.insert(key.into(), children);
    }

    /// Returns the members of the collection stored under `key`.
    ///
    /// An unknown key yields an empty list.
    #[must_use]
    pub fn get_children(&self, key: &str) -> Vec<ObjectRef> {
        self.read().base().children.get(key).to_vec()
    }

    /// Adds a child to the collection keyed by its remote name.
    ///
    /// Returns `false` and leaves the collection untouched if an equal
    /// child is already a member.
    pub fn add_child(&self, child: &impl AsObjectRef) -> bool {
        let child = child.as_object();
        let key = child.read().remote_name();

        // Compare outside the lock: the child may be `self`.
        let members = self.get_children(key);
        if members.iter().any(|member| same_resource(member, &child)) {
            return false;
        }

        self.write().base_mut().children.entry(key).push(child);
        true
    }

    /// Removes a child from the collection keyed by its remote name.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ChildNotFound`] if no equal child is a member.
    pub fn remove_child(&self, child: &impl AsObjectRef) -> Result<ObjectRef, ResourceError> {
        let child = child.as_object();
        let key = child.read().remote_name();
        let index = self.position_of(key, &child)?;

        let mut guard = self.write();
        let members = guard.base_mut().children.get_mut(key);
        match members {
            Some(members) if index < members.len() => Ok(members.remove(index)),
            _ => Err(ResourceError::ChildNotFound {
                resource: key,
                key: key.to_string(),
            }),
        }
    }

    /// Replaces the member equal to `child` with `child`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ChildNotFound`] if no equal child is a member.
    pub fn update_child(&self, child: &impl AsObjectRef) -> Result<(), ResourceError> {
        let child = child.as_object();
        let key = child.read().remote_name();
        let index = self.position_of(key, &child)?;

        let mut guard = self.write();
        match guard.base_mut().children.get_mut(key) {
            Some(members) if index < members.len() => {
                members[index] = child;
                Ok(())
            }
            _ => Err(ResourceError::ChildNotFound {
                resource: key,
                key: key.to_string(),
            }),
        }
    }

    fn position_of(&self, key: &'static str, child: &ObjectRef) -> Result<usize, ResourceError> {
        self.get_children(key)
            .iter()
            .position(|member| same_resource(member, child))
            .ok_or_else(|| ResourceError::ChildNotFound {
                resource: key,
                key: key.to_string(),
            })
    }

    /// Sets (or clears) the parent.
    ///
    /// Only a weak reference is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ParentCycle`] if `self` is `parent` or one of
    /// its ancestors.
    pub fn set_parent(&self, parent: Option<&ObjectRef>) -> Result<(), ResourceError> {
        let this = self.as_object();

        let mut ancestor = parent.cloned();
        while let Some(node) = ancestor {
            if node.ptr_eq(&this) {
                return Err(ResourceError::ParentCycle {
                    resource: this.read().remote_name(),
                });
            }
            ancestor = node.read().base().parent();
        }

        self.write().base_mut().parent = parent.map(ObjectRef::downgrade);
        Ok(())
    }

    /// Returns the parent, if it is set and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<ObjectRef> {
        self.read().base().parent()
    }

    /// Walks `self`, its parent, its grandparent and so on, and returns the
    /// first one whose remote name is in `remote_names`.
    #[must_use]
    pub fn nearest_parent_matching(&self, remote_names: &[&str]) -> Option<ObjectRef> {
        let mut node = Some(self.as_object());
        while let Some(current) = node {
            if remote_names.contains(&current.read().remote_name()) {
                return Some(current);
            }
            node = current.read().base().parent();
        }
        None
    }

    /// Returns `true` if the client's current user owns this resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::CurrentUserNotSet`] if the client has no current user.
    pub fn is_owned_by_current_user(&self, client: &RestClient) -> Result<bool, ResourceError> {
        let user = client.current_user()?;
        Ok(self.read().is_owned_by(user))
    }

    /// Returns `true` if any resource in the parent chain, starting with this
    /// one, has a remote name in `remote_names` and is owned by the client's
    /// current user.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::CurrentUserNotSet`] if the client has no current user.
    pub fn is_parent_owned_by_current_user(
        &self,
        client: &RestClient,
        remote_names: &[&str],
    ) -> Result<bool, ResourceError> {
        let user = client.current_user()?;
        let mut node = Some(self.as_object());
        while let Some(current) = node {
            {
                let object = current.read();
                if remote_names.contains(&object.remote_name()) && object.is_owned_by(user) {
                    return Ok(true);
                }
            }
            node = current.read().base().parent();
        }
        Ok(false)
    }
}

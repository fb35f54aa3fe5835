//! REST resource infrastructure.
//!
//! This module provides the object model every resource type is built on:
//!
//! - **Attribute exposure**: [`AttributeDescriptor`]s collected in a per-type
//!   [`AttributeRegistry`], each paired with a typed accessor
//! - **Wire serialization**: [`RestObject::to_wire`] and
//!   [`RestObject::from_wire`], lenient on unknown keys, strict on value types
//! - **Naming**: collection names and URLs derived from a singular remote name
//! - **Parent/child graph**: named child collections and a weak parent link
//!   on every [`Handle`]
//! - **Operation pipeline**: fetch, save, delete and child management, each
//!   usable in [`Mode::Sync`] or [`Mode::Async`]
//! - **[`ResourceError`]**: Semantic error types for resource operations
//!
//! # Example: Declaring a Resource
//!
//! ```rust
//! use std::sync::OnceLock;
//! use rest_resource::rest::{
//!     Attribute, AttributeRegistry, ChildKind, Entity, HasObjectBase, ObjectBase,
//! };
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     base: ObjectBase,
//!     user_name: Option<String>,
//!     email: Option<String>,
//! }
//!
//! impl HasObjectBase for User {
//!     fn base(&self) -> &ObjectBase { &self.base }
//!     fn base_mut(&mut self) -> &mut ObjectBase { &mut self.base }
//! }
//!
//! impl Entity for User {
//!     const REMOTE_NAME: &'static str = "user";
//!
//!     fn registry() -> &'static AttributeRegistry<Self> {
//!         static REGISTRY: OnceLock<AttributeRegistry<User>> = OnceLock::new();
//!         REGISTRY.get_or_init(|| {
//!             AttributeRegistry::builder()
//!                 .expose(
//!                     Attribute::new("user_name", |u: &User| &u.user_name, |u| &mut u.user_name)
//!                         .remote_name("userName")
//!                         .required()
//!                         .login(),
//!                 )
//!                 .expose(Attribute::new("email", |u: &User| &u.email, |u| &mut u.email).email())
//!                 .build()
//!         })
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct Enterprise {
//!     base: ObjectBase,
//! }
//!
//! impl HasObjectBase for Enterprise {
//!     fn base(&self) -> &ObjectBase { &self.base }
//!     fn base_mut(&mut self) -> &mut ObjectBase { &mut self.base }
//! }
//!
//! impl Entity for Enterprise {
//!     const REMOTE_NAME: &'static str = "enterprise";
//!     const CHILDREN: &'static [ChildKind] = &[ChildKind::of::<User>()];
//!
//!     fn registry() -> &'static AttributeRegistry<Self> {
//!         static REGISTRY: OnceLock<AttributeRegistry<Enterprise>> = OnceLock::new();
//!         REGISTRY.get_or_init(|| AttributeRegistry::builder().build())
//!     }
//! }
//!
//! assert_eq!(User::registry().descriptor_by_remote_name("userName").unwrap().local_name, "user_name");
//! assert_eq!(Enterprise::CHILDREN[0].resource_name(), "users");
//! ```
//!
//! # Example: Operating on a Resource
//!
//! ```rust,ignore
//! use rest_resource::rest::{Handle, Mode};
//!
//! let enterprise = Handle::new(Enterprise::default());
//! enterprise.write().base_mut().id = Some("e-1".to_string());
//!
//! let user = Handle::new(User { user_name: Some("jdoe".into()), ..User::default() });
//! enterprise.add_child_entity(&user, &client, Mode::Sync).await?;
//! assert!(user.read().base().id.is_some());
//!
//! let users = enterprise.fetch_children(&client, "user").await?;
//! ```

mod attribute;
mod errors;
mod graph;
mod naming;
mod object;
mod operation;
mod registry;

// Public exports
pub use attribute::{AttributeDescriptor, AttributeType, WireTypeError, WireValue};
pub use errors::{ResourceError, ResponseChoice};
pub use graph::{ChildCollections, ChildKind};
pub use naming::{collection_url, item_url, pluralize, resource_name};
pub use object::{
    object_with_id, AsObjectRef, Entity, GenericObject, Handle, HasObjectBase, ObjectBase,
    ObjectRef, RestObject, WeakObjectRef,
};
pub use operation::{send_detached, Callback, CascadeReport, Completion, Mode, Outcome};
pub use registry::{
    Attribute, AttributeRegistry, AttributeRegistryBuilder, MergeReport, RejectedValue,
};

//! Sensorimotor resource access for control-basis controllers.
//!
//! A *resource* is a named, dimensioned sensorimotor quantity: a sensor signal,
//! a reference target, or an effector. Controllers never touch resources
//! directly; they read them through a [`ResourceAccessor`], which comes in two
//! flavours chosen once at construction:
//!
//! - [`LocalAccessor`] wraps an in-process [`Resource`] and reads it synchronously.
//! - [`ProxiedAccessor`] reads through a [`ResourceLink`] transport handle and may
//!   block up to a bounded timeout.
//!
//! Name resolution for the proxied case goes through the [`ResourceResolver`]
//! trait. [`ResourceBus`] is an in-process implementation of both the name
//! service and the transport, useful for wiring controllers inside one process
//! and for tests.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use basis_resource::{LocalAccessor, ResourceAccessor, SharedResource};
//! use nalgebra::DVector;
//!
//! let sensor = Arc::new(SharedResource::new("/cb/cartesianposition/arm", "cartesianposition", 3));
//! let accessor = LocalAccessor::new(sensor.clone());
//!
//! // Nothing has been produced yet.
//! assert!(accessor.read().is_err());
//!
//! sensor.set_values(DVector::from_vec(vec![0.1, 0.2, 0.3])).unwrap();
//! assert_eq!(accessor.read().unwrap().len(), 3);
//! ```

pub mod accessor;
pub mod bus;
pub mod error;
mod name;
mod resource;

pub use accessor::{
    LinkRead, LocalAccessor, ProxiedAccessor, ProxyConfig, ResourceAccessor, ResourceLink,
    ResourceResolver,
};
pub use bus::{Publisher, ResourceBus};
pub use error::ResourceError;
pub use name::ResourceName;
pub use resource::{Resource, SharedResource};

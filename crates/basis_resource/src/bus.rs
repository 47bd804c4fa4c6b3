//! In-process resource bus.
//!
//! [`ResourceBus`] is a name service plus transport for resources that are
//! produced and consumed inside one process but should still be reached *by
//! name*, the way a distributed controller reaches them. Producers
//! [`advertise`](ResourceBus::advertise) a resource and push samples through
//! the returned [`Publisher`]; consumers [`resolve`](ResourceResolver::resolve)
//! the name into a [`ProxiedAccessor`].
//!
//! # Example
//!
//! ```
//! use basis_resource::{ResourceAccessor, ResourceBus, ResourceError, ResourceResolver};
//! use nalgebra::DVector;
//!
//! let bus = ResourceBus::new();
//! let publisher = bus.advertise("/cb/configuration/arm", "configuration", 2).unwrap();
//!
//! let accessor = bus.resolve("/cb/configuration/arm").unwrap();
//! assert!(matches!(accessor.read(), Err(ResourceError::Unavailable(_))));
//!
//! publisher.publish(DVector::from_vec(vec![0.1, 0.2])).unwrap();
//! assert_eq!(accessor.read().unwrap()[1], 0.2);
//! ```

use crate::accessor::{
    LinkRead, ProxiedAccessor, ProxyConfig, ResourceAccessor, ResourceLink, ResourceResolver,
};
use crate::error::ResourceError;
use core::time::Duration;
use hashbrown::HashMap;
use nalgebra::DVector;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A single named slot holding the latest sample of a resource.
struct Channel {
    name: String,
    space: String,
    dimension: usize,
    latest: Mutex<Option<DVector<f64>>>,
}

/// Link handed to proxies; shares the channel with its publishers.
struct BusLink {
    channel: Arc<Channel>,
}

impl ResourceLink for BusLink {
    fn fetch(&self, timeout: Duration) -> LinkRead {
        match self.channel.latest.try_lock_for(timeout) {
            Some(latest) => match latest.as_ref() {
                Some(values) => LinkRead::Sample(values.clone()),
                None => LinkRead::Empty,
            },
            None => LinkRead::TimedOut,
        }
    }
}

/// Producer handle for a resource advertised on a [`ResourceBus`].
#[derive(Clone)]
pub struct Publisher {
    channel: Arc<Channel>,
}

impl Publisher {
    /// Returns the advertised resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.channel.name
    }

    /// Publishes a new sample, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::DimensionMismatch`] if `values` does not match
    /// the advertised dimension.
    pub fn publish(&self, values: DVector<f64>) -> Result<(), ResourceError> {
        if values.len() != self.channel.dimension {
            return Err(ResourceError::DimensionMismatch {
                name: self.channel.name.clone(),
                expected: self.channel.dimension,
                actual: values.len(),
            });
        }
        *self.channel.latest.lock() = Some(values);
        Ok(())
    }
}

#[derive(Default)]
struct BusInner {
    channels: RwLock<HashMap<String, Arc<Channel>>>,
    config: ProxyConfig,
}

/// In-process name service and transport for resources.
///
/// Cloning the bus yields another handle to the same set of channels.
#[derive(Clone, Default)]
pub struct ResourceBus {
    inner: Arc<BusInner>,
}

impl core::fmt::Debug for ResourceBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResourceBus")
            .field("resources", &self.names())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl ResourceBus {
    /// Creates an empty bus with default proxy settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty bus whose proxies use `config`.
    #[must_use]
    pub fn with_config(config: ProxyConfig) -> Self {
        Self {
            inner: Arc::new(BusInner {
                channels: RwLock::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Advertises a resource and returns a publisher for it.
    ///
    /// Advertising a name that already exists with the same space and dimension
    /// returns another publisher for the existing channel.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::DimensionMismatch`] or
    /// [`ResourceError::ConnectFailed`] if the name is already advertised with a
    /// different dimension or space.
    pub fn advertise(
        &self,
        name: impl Into<String>,
        space: impl Into<String>,
        dimension: usize,
    ) -> Result<Publisher, ResourceError> {
        let name = name.into();
        let space = space.into();
        let mut channels = self.inner.channels.write();

        if let Some(existing) = channels.get(&name) {
            if existing.dimension != dimension {
                return Err(ResourceError::DimensionMismatch {
                    name,
                    expected: existing.dimension,
                    actual: dimension,
                });
            }
            if existing.space != space {
                return Err(ResourceError::ConnectFailed {
                    reason: format!("already advertised in space '{}'", existing.space),
                    name,
                });
            }
            return Ok(Publisher {
                channel: Arc::clone(existing),
            });
        }

        tracing::debug!(resource = %name, %space, dimension, "advertising resource");
        let channel = Arc::new(Channel {
            name: name.clone(),
            space,
            dimension,
            latest: Mutex::new(None),
        });
        channels.insert(name, Arc::clone(&channel));
        Ok(Publisher { channel })
    }

    /// Checks if a resource is advertised.
    #[must_use]
    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.inner.channels.read().contains_key(name.as_ref())
    }

    /// Lists advertised resource names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.inner.channels.read().keys().cloned().collect()
    }
}

impl ResourceResolver for ResourceBus {
    fn resolve(&self, name: &str) -> Result<Box<dyn ResourceAccessor>, ResourceError> {
        let channel = self
            .inner
            .channels
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::ConnectFailed {
                name: name.to_string(),
                reason: "no such resource on the bus".to_string(),
            })?;

        tracing::debug!(resource = %name, "opening proxy");
        Ok(Box::new(ProxiedAccessor::new(
            channel.name.clone(),
            channel.space.clone(),
            channel.dimension,
            Box::new(BusLink {
                channel: Arc::clone(&channel),
            }),
            self.inner.config,
        )))
    }
}

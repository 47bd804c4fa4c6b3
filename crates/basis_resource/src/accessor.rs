//! Uniform read access to resources.
//!
//! Defines the [`ResourceAccessor`] trait controllers are written against, and
//! its two implementations:
//!
//! - [`LocalAccessor`] - wraps an in-process [`Resource`]; reads never block.
//! - [`ProxiedAccessor`] - reads through a [`ResourceLink`] transport handle and
//!   blocks at most [`ProxyConfig::read_timeout`].
//!
//! The transport itself is external: anything that can hand back the latest
//! sample of a named quantity can implement [`ResourceLink`]. Turning a name
//! into a live accessor is the job of a [`ResourceResolver`].

use crate::error::ResourceError;
use crate::resource::Resource;
use core::fmt;
use core::time::Duration;
use nalgebra::DVector;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// ResourceAccessor Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Read access to a named sensorimotor quantity.
///
/// Accessors never mutate the resource they read, and [`size`](Self::size) is
/// fixed for the accessor's lifetime.
pub trait ResourceAccessor: Send + Sync {
    /// Returns the resource name.
    fn name(&self) -> &str;

    /// Returns the coordinate-frame identifier.
    fn space(&self) -> &str;

    /// Returns the vector length of the resource.
    fn size(&self) -> usize;

    /// Reads the current value.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::Unavailable`] if the source has not produced data yet.
    /// - [`ResourceError::Timeout`] if a proxied read did not complete in time.
    /// - [`ResourceError::DimensionMismatch`] if the source delivered a value of
    ///   the wrong length.
    fn read(&self) -> Result<DVector<f64>, ResourceError>;
}

impl fmt::Debug for dyn ResourceAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceAccessor")
            .field("name", &self.name())
            .field("space", &self.space())
            .field("size", &self.size())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LocalAccessor
// ─────────────────────────────────────────────────────────────────────────────

/// Accessor for a resource in the same process.
///
/// Holds shared ownership of the resource so the resource outlives every
/// controller reading it.
#[derive(Clone)]
pub struct LocalAccessor {
    resource: Arc<dyn Resource>,
}

impl LocalAccessor {
    /// Wraps an in-process resource.
    #[must_use]
    pub fn new(resource: Arc<dyn Resource>) -> Self {
        Self { resource }
    }
}

impl ResourceAccessor for LocalAccessor {
    fn name(&self) -> &str {
        self.resource.name()
    }

    fn space(&self) -> &str {
        self.resource.space()
    }

    fn size(&self) -> usize {
        self.resource.dimension()
    }

    fn read(&self) -> Result<DVector<f64>, ResourceError> {
        let values = self
            .resource
            .values()
            .ok_or_else(|| ResourceError::Unavailable(self.resource.name().to_string()))?;

        if values.len() != self.resource.dimension() {
            return Err(ResourceError::DimensionMismatch {
                name: self.resource.name().to_string(),
                expected: self.resource.dimension(),
                actual: values.len(),
            });
        }
        Ok(values)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ResourceLink Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a single [`ResourceLink::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub enum LinkRead {
    /// The latest sample held by the transport.
    Sample(DVector<f64>),
    /// The remote source has not produced a first message yet.
    Empty,
    /// The transport could not deliver within the timeout.
    TimedOut,
}

/// Transport handle behind a [`ProxiedAccessor`].
///
/// Implementations own whatever connection state the transport needs and do
/// their own internal synchronization.
pub trait ResourceLink: Send + Sync + 'static {
    /// Fetches the latest sample, blocking the calling thread at most `timeout`.
    fn fetch(&self, timeout: Duration) -> LinkRead;
}

// ─────────────────────────────────────────────────────────────────────────────
// ProxiedAccessor
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for proxied reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Upper bound on how long a single read may block.
    pub read_timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(100),
        }
    }
}

impl ProxyConfig {
    /// Sets the read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Accessor that reads a remote resource through a [`ResourceLink`].
///
/// Metadata (name, space, dimension) is fixed when the proxy is opened; every
/// sample received afterwards is checked against the dimension.
pub struct ProxiedAccessor {
    name: String,
    space: String,
    dimension: usize,
    link: Box<dyn ResourceLink>,
    config: ProxyConfig,
}

impl ProxiedAccessor {
    /// Opens a proxy over an already-connected link.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        space: impl Into<String>,
        dimension: usize,
        link: Box<dyn ResourceLink>,
        config: ProxyConfig,
    ) -> Self {
        Self {
            name: name.into(),
            space: space.into(),
            dimension,
            link,
            config,
        }
    }

    /// Returns the proxy configuration.
    #[must_use]
    pub fn config(&self) -> ProxyConfig {
        self.config
    }
}

impl ResourceAccessor for ProxiedAccessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn space(&self) -> &str {
        &self.space
    }

    fn size(&self) -> usize {
        self.dimension
    }

    fn read(&self) -> Result<DVector<f64>, ResourceError> {
        match self.link.fetch(self.config.read_timeout) {
            LinkRead::Sample(values) if values.len() == self.dimension => Ok(values),
            LinkRead::Sample(values) => Err(ResourceError::DimensionMismatch {
                name: self.name.clone(),
                expected: self.dimension,
                actual: values.len(),
            }),
            LinkRead::Empty => Err(ResourceError::Unavailable(self.name.clone())),
            LinkRead::TimedOut => {
                tracing::debug!(
                    resource = %self.name,
                    timeout = ?self.config.read_timeout,
                    "proxied read timed out"
                );
                Err(ResourceError::Timeout {
                    name: self.name.clone(),
                    timeout: self.config.read_timeout,
                })
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ResourceResolver Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Naming service turning a resource name into a live accessor.
///
/// Used by controllers running in distributed mode.
pub trait ResourceResolver: Send + Sync {
    /// Resolves `name` and opens an accessor for it.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ConnectFailed`] if the name is unknown or the
    /// connection could not be set up.
    fn resolve(&self, name: &str) -> Result<Box<dyn ResourceAccessor>, ResourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::SharedResource;
    use parking_lot::Mutex;

    struct ScriptedLink {
        reads: Mutex<Vec<LinkRead>>,
    }

    impl ResourceLink for ScriptedLink {
        fn fetch(&self, _timeout: Duration) -> LinkRead {
            self.reads.lock().pop().unwrap_or(LinkRead::Empty)
        }
    }

    fn proxy(reads: Vec<LinkRead>) -> ProxiedAccessor {
        ProxiedAccessor::new(
            "/cb/configuration/arm",
            "configuration",
            2,
            Box::new(ScriptedLink {
                reads: Mutex::new(reads),
            }),
            ProxyConfig::default().with_read_timeout(Duration::from_millis(5)),
        )
    }

    #[test]
    fn local_read_before_first_value_is_unavailable() {
        let resource = Arc::new(SharedResource::new("/cb/configuration/arm", "configuration", 2));
        let accessor = LocalAccessor::new(resource);
        assert_eq!(
            accessor.read(),
            Err(ResourceError::Unavailable("/cb/configuration/arm".into()))
        );
    }

    #[test]
    fn local_accessor_reports_metadata() {
        let resource = Arc::new(SharedResource::with_values(
            "/cb/configuration/arm",
            "configuration",
            DVector::from_vec(vec![1.0, 2.0, 3.0]),
        ));
        let accessor = LocalAccessor::new(resource);
        assert_eq!(accessor.name(), "/cb/configuration/arm");
        assert_eq!(accessor.space(), "configuration");
        assert_eq!(accessor.size(), 3);
        assert_eq!(accessor.read().unwrap(), DVector::from_vec(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn proxied_read_maps_link_outcomes() {
        // Popped from the back.
        let accessor = proxy(vec![
            LinkRead::TimedOut,
            LinkRead::Sample(DVector::from_vec(vec![1.0, 2.0])),
            LinkRead::Empty,
        ]);

        assert!(matches!(accessor.read(), Err(ResourceError::Unavailable(_))));
        assert_eq!(accessor.read().unwrap(), DVector::from_vec(vec![1.0, 2.0]));
        assert!(matches!(
            accessor.read(),
            Err(ResourceError::Timeout { timeout, .. }) if timeout == Duration::from_millis(5)
        ));
    }

    #[test]
    fn proxy_keeps_its_config() {
        let accessor = proxy(Vec::new());
        assert_eq!(accessor.config().read_timeout, Duration::from_millis(5));
        assert_eq!(ProxyConfig::default().read_timeout, Duration::from_millis(100));
        assert_eq!(accessor.size(), 2);
        assert_eq!(accessor.space(), "configuration");
    }

    #[test]
    fn proxied_read_rejects_wrong_dimension() {
        let accessor = proxy(vec![LinkRead::Sample(DVector::zeros(3))]);
        assert_eq!(
            accessor.read(),
            Err(ResourceError::DimensionMismatch {
                name: "/cb/configuration/arm".into(),
                expected: 2,
                actual: 3,
            })
        );
    }
}

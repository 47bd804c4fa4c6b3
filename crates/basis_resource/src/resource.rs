//! In-process resources.

use crate::error::ResourceError;
use nalgebra::DVector;
use parking_lot::RwLock;

/// A named, dimensioned sensorimotor quantity living in the current process.
///
/// The dimension is fixed for the lifetime of the resource. Implementations are
/// typically updated by a device driver or estimator and read by any number of
/// controllers through a [`LocalAccessor`](crate::LocalAccessor).
pub trait Resource: Send + Sync + 'static {
    /// Returns the resource name.
    fn name(&self) -> &str;

    /// Returns the coordinate-frame identifier (e.g. `"configuration"`).
    fn space(&self) -> &str;

    /// Returns the fixed vector length of the resource.
    fn dimension(&self) -> usize;

    /// Returns the current value, or `None` if nothing has been produced yet.
    fn values(&self) -> Option<DVector<f64>>;
}

/// A [`Resource`] whose value is set from the outside.
///
/// This is the in-process counterpart of a device or estimator output: the
/// producer calls [`set_values`](Self::set_values), consumers read through a
/// [`LocalAccessor`](crate::LocalAccessor).
///
/// # Example
///
/// ```
/// use basis_resource::{Resource, SharedResource};
/// use nalgebra::DVector;
///
/// let joints = SharedResource::new("/cb/configuration/arm", "configuration", 2);
/// assert!(joints.values().is_none());
///
/// joints.set_values(DVector::from_vec(vec![0.5, -0.5])).unwrap();
/// assert_eq!(joints.values().unwrap()[1], -0.5);
///
/// // The dimension never changes.
/// assert!(joints.set_values(DVector::zeros(3)).is_err());
/// ```
#[derive(Debug)]
pub struct SharedResource {
    name: String,
    space: String,
    dimension: usize,
    values: RwLock<Option<DVector<f64>>>,
}

impl SharedResource {
    /// Creates a resource that has not produced a value yet.
    #[must_use]
    pub fn new(name: impl Into<String>, space: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            space: space.into(),
            dimension,
            values: RwLock::new(None),
        }
    }

    /// Creates a resource with an initial value; its dimension is the value's length.
    #[must_use]
    pub fn with_values(
        name: impl Into<String>,
        space: impl Into<String>,
        values: DVector<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            space: space.into(),
            dimension: values.len(),
            values: RwLock::new(Some(values)),
        }
    }

    /// Replaces the current value.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::DimensionMismatch`] if `values` does not have the
    /// resource's dimension. The stored value is left untouched in that case.
    pub fn set_values(&self, values: DVector<f64>) -> Result<(), ResourceError> {
        if values.len() != self.dimension {
            return Err(ResourceError::DimensionMismatch {
                name: self.name.clone(),
                expected: self.dimension,
                actual: values.len(),
            });
        }
        *self.values.write() = Some(values);
        Ok(())
    }
}

impl Resource for SharedResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn space(&self) -> &str {
        &self.space
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn values(&self) -> Option<DVector<f64>> {
        self.values.read().clone()
    }
}

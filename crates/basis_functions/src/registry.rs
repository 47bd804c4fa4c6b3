//! String-keyed registries for potential functions and Jacobians.

use crate::error::CreateFunctionError;
use crate::jacobian::{IdentityJacobian, Jacobian, JacobianShape};
use crate::potential::{DifferencePotential, PotentialFunction};
use hashbrown::HashMap;
use std::sync::Arc;

/// Constructor producing a potential function for a given input dimension.
pub type PotentialConstructor = Arc<dyn Fn(usize) -> Box<dyn PotentialFunction> + Send + Sync>;

/// Constructor producing a Jacobian of a given shape.
pub type JacobianConstructor = Arc<dyn Fn(JacobianShape) -> Box<dyn Jacobian> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// PotentialFunctionRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry mapping type tags to potential function constructors.
///
/// New kinds of potential are added by registration:
///
/// ```
/// use basis_functions::{DifferencePotential, PotentialFunctionRegistry};
///
/// let mut registry = PotentialFunctionRegistry::new();
/// registry.register("to_target", |dimension| Box::new(DifferencePotential::new(dimension)));
///
/// let pf = registry.create("to_target", 3).unwrap();
/// assert_eq!(pf.input_dimension(), 3);
/// assert!(registry.create("unknown", 3).is_err());
/// ```
#[derive(Default, Clone)]
pub struct PotentialFunctionRegistry {
    constructors: HashMap<String, PotentialConstructor>,
}

impl core::fmt::Debug for PotentialFunctionRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PotentialFunctionRegistry")
            .field("types", &self.type_tags())
            .finish()
    }
}

impl PotentialFunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in `"difference"` potential registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(DifferencePotential::TYPE_TAG, |dimension| {
            Box::new(DifferencePotential::new(dimension))
        });
        registry
    }

    /// Registers a constructor under `type_tag`.
    ///
    /// # Panics
    ///
    /// Panics if a constructor with the same tag is already registered.
    pub fn register<F>(&mut self, type_tag: impl Into<String>, constructor: F)
    where
        F: Fn(usize) -> Box<dyn PotentialFunction> + Send + Sync + 'static,
    {
        let type_tag = type_tag.into();
        assert!(
            !self.constructors.contains_key(&type_tag),
            "potential function type '{type_tag}' is already registered"
        );
        self.constructors.insert(type_tag, Arc::new(constructor));
    }

    /// Creates a potential function of type `type_tag` for signals of length `input_dimension`.
    ///
    /// # Errors
    ///
    /// Returns [`CreateFunctionError::UnknownPotentialFunctionType`] if the tag
    /// is not registered.
    pub fn create(
        &self,
        type_tag: &str,
        input_dimension: usize,
    ) -> Result<Box<dyn PotentialFunction>, CreateFunctionError> {
        let constructor = self.constructors.get(type_tag).ok_or_else(|| {
            CreateFunctionError::UnknownPotentialFunctionType(type_tag.to_string())
        })?;

        tracing::debug!(type_tag, input_dimension, "creating potential function");
        Ok(constructor(input_dimension))
    }

    /// Checks if a type tag is registered.
    #[must_use]
    pub fn contains(&self, type_tag: impl AsRef<str>) -> bool {
        self.constructors.contains_key(type_tag.as_ref())
    }

    /// Lists registered type tags.
    #[must_use]
    pub fn type_tags(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JacobianRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry mapping `(input space, output space)` pairs to Jacobian constructors.
///
/// A pair whose two spaces are equal resolves to an [`IdentityJacobian`]
/// unless a constructor was registered for it explicitly.
///
/// ```
/// use basis_functions::{ConstantJacobian, JacobianRegistry, JacobianShape};
/// use nalgebra::DMatrix;
///
/// let mut registry = JacobianRegistry::new();
/// registry.register("cartesianposition", "configuration", |shape: JacobianShape| {
///     Box::new(ConstantJacobian::new(
///         "cartesianposition",
///         "configuration",
///         DMatrix::identity(shape.potential_dim, shape.effector_dim) * 2.0,
///     ))
/// });
///
/// assert!(registry.supports("cartesianposition", "configuration"));
/// assert!(registry.supports("configuration", "configuration"));
/// assert!(!registry.supports("configuration", "cartesianposition"));
/// ```
#[derive(Default, Clone)]
pub struct JacobianRegistry {
    constructors: HashMap<(String, String), JacobianConstructor>,
}

impl core::fmt::Debug for JacobianRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JacobianRegistry")
            .field("pairs", &self.space_pairs())
            .finish()
    }
}

impl JacobianRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registers a constructor for the `input -> output` space pair.
    ///
    /// # Panics
    ///
    /// Panics if a constructor for the same pair is already registered.
    pub fn register<F>(
        &mut self,
        input: impl Into<String>,
        output: impl Into<String>,
        constructor: F,
    ) where
        F: Fn(JacobianShape) -> Box<dyn Jacobian> + Send + Sync + 'static,
    {
        let key = (input.into(), output.into());
        assert!(
            !self.constructors.contains_key(&key),
            "jacobian from '{}' to '{}' is already registered",
            key.0,
            key.1
        );
        self.constructors.insert(key, Arc::new(constructor));
    }

    /// Creates the Jacobian for the `input -> output` space pair.
    ///
    /// # Errors
    ///
    /// Returns [`CreateFunctionError::UnsupportedSpacePair`] if nothing is
    /// registered for the pair and the spaces differ.
    pub fn create(
        &self,
        input: &str,
        output: &str,
        shape: JacobianShape,
    ) -> Result<Box<dyn Jacobian>, CreateFunctionError> {
        if let Some(constructor) = self
            .constructors
            .get(&(input.to_string(), output.to_string()))
        {
            tracing::debug!(input, output, ?shape, "creating registered jacobian");
            return Ok(constructor(shape));
        }

        if input == output {
            tracing::debug!(space = input, ?shape, "using identity jacobian");
            return Ok(Box::new(IdentityJacobian::new(input, shape)));
        }

        Err(CreateFunctionError::UnsupportedSpacePair {
            input: input.to_string(),
            output: output.to_string(),
        })
    }

    /// Checks if [`create`](Self::create) would succeed for the pair.
    #[must_use]
    pub fn supports(&self, input: &str, output: &str) -> bool {
        input == output
            || self
                .constructors
                .contains_key(&(input.to_string(), output.to_string()))
    }

    /// Lists explicitly registered `(input, output)` pairs.
    #[must_use]
    pub fn space_pairs(&self) -> Vec<(String, String)> {
        self.constructors.keys().cloned().collect()
    }
}

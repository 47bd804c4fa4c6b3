//! Resource naming convention.

use crate::error::ResourceError;
use core::fmt;

const PREFIX: &str = "/cb/";

/// A parsed resource name of the form `/cb/<space>/<device...>`.
///
/// The space segment identifies the coordinate frame of the quantity (e.g.
/// `configuration`, `cartesianposition`); the remainder names the device it
/// belongs to and always starts with `/`.
///
/// ```
/// use basis_resource::ResourceName;
///
/// let name = ResourceName::parse("/cb/configuration/robot/right_arm").unwrap();
/// assert_eq!(name.space(), "configuration");
/// assert_eq!(name.device(), "/robot/right_arm");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName {
    full: String,
    space: String,
    device: String,
}

impl ResourceName {
    /// Parses a resource name.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidName`] if the name does not start with
    /// `/cb/` or is missing the space or device segment.
    pub fn parse(name: &str) -> Result<Self, ResourceError> {
        let invalid = || ResourceError::InvalidName(name.to_string());

        let rest = name.strip_prefix(PREFIX).ok_or_else(invalid)?;
        let (space, device) = rest.split_once('/').ok_or_else(invalid)?;
        if space.is_empty() || device.trim_matches('/').is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            full: name.to_string(),
            space: space.to_string(),
            device: format!("/{}", device.trim_end_matches('/')),
        })
    }

    /// Returns the full name as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// Returns the space segment.
    #[must_use]
    pub fn space(&self) -> &str {
        &self.space
    }

    /// Returns the device segment, including its leading `/`.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

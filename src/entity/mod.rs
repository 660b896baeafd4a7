//! Entities - typed records stored under `"{PREFIX}:{id}"` keys.
//!
//! ## Example
//!
//! ```ignore
//! use entity_store::{Entity, Seed};
//!
//! #[derive(Clone, Serialize, Deserialize, Entity)]
//! #[entity(prefix = "user")]
//! struct User {
//!     pub id: String,
//!     #[entity(non_empty)]
//!     pub name: String,
//! }
//!
//! impl Seed for User {
//!     fn seed() -> Vec<Self> { vec![User { id: "u1".into(), name: "User A".into() }] }
//! }
//! ```

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Trait for types that can be stored by an `EntityStore`.
///
/// Usually derived with `#[derive(Entity)]`.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Key namespace for this entity type (e.g. `"user"`, `"chat"`).
    /// Must be non-empty, must not contain `':'` and must not start with `__`,
    /// which is reserved for store metadata such as seed markers.
    ///
    /// The derive rejects reserved prefixes at compile time:
    ///
    /// ```compile_fail
    /// use entity_store::Entity;
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Clone, Serialize, Deserialize, Entity)]
    /// #[entity(prefix = "__meta")]
    /// struct Marker {
    ///     id: String,
    /// }
    /// ```
    ///
    /// ```
    /// use entity_store::Entity;
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Clone, Serialize, Deserialize, Entity)]
    /// #[entity(prefix = "meta")]
    /// struct Marker {
    ///     id: String,
    /// }
    ///
    /// assert_eq!(<Marker as Entity>::PREFIX, "meta");
    /// ```
    const PREFIX: &'static str;

    /// Returns the unique identifier for this entity instance.
    fn id(&self) -> &str;

    /// Checks required fields before anything is written.
    fn validate(&self) -> Result<(), ValidationError> {
        if self.id().trim().is_empty() {
            return Err(ValidationError::EmptyId {
                prefix: Self::PREFIX,
            });
        }
        Ok(())
    }
}

/// A fixed default dataset written once per entity type by `ensure_seed`.
pub trait Seed: Entity {
    fn seed() -> Vec<Self>;
}

/// Missing or malformed input, detected before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{prefix} id must not be empty")]
    EmptyId { prefix: &'static str },

    #[error("{prefix} {field} required")]
    EmptyField {
        prefix: &'static str,
        field: &'static str,
    },

    #[error("{field} required")]
    MissingInput { field: &'static str },

    #[error("page limit must be at least 1")]
    ZeroLimit,
}

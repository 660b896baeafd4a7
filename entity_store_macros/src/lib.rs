mod entity;

use proc_macro::TokenStream;

/// Derive macro for implementing the `Entity` trait.
///
/// # Usage
///
/// ```ignore
/// use entity_store::Entity;
///
/// #[derive(Clone, Serialize, Deserialize, Entity)]
/// #[entity(prefix = "user")]
/// struct User {
///     pub id: String,
///     #[entity(non_empty)]
///     pub name: String,
///     pub email: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[entity(prefix = "...")]` on the struct: key prefix for this entity type.
///   Defaults to the snake_case struct name (e.g. `ChatRoom` -> `"chat_room"`).
///   Must not be empty, contain `':'`, or start with `__` (store metadata).
/// - `#[entity(id)]` on a field: marks it as the ID field.
///   Defaults to a field named `id`.
/// - `#[entity(non_empty)]` on a `String` field: `validate()` rejects values that
///   are empty after trimming. The ID field is always checked.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive_entity(input)
}

//! Concrete entity types and their stores.

mod chat;
mod user;

pub use chat::{Chat, ChatMessage, ChatStore};
pub use user::{User, UserStore};

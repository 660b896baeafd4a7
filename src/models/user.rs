use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::Seed;
use crate::store::EntityStore;
use crate::Entity;

/// An application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Entity)]
#[entity(prefix = "user")]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[entity(non_empty)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    /// A user with a fresh id and a trimmed name.
    pub fn new(name: &str) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.trim().to_string());
        self
    }
}

impl Seed for User {
    fn seed() -> Vec<Self> {
        vec![
            User {
                id: "u1".into(),
                name: "User A".into(),
                email: None,
            },
            User {
                id: "u2".into(),
                name: "User B".into(),
                email: None,
            },
        ]
    }
}

pub type UserStore = EntityStore<User>;

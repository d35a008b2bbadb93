use serde::{Deserialize, Serialize};

/// Account role; decides which marketplace actions a viewer gets
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Broker,
    Admin,
}

impl Role {
    /// Staff accounts browse listings but never place orders.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Broker)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
}

/// A user reference as the API sends it: a bare id, or the populated document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Populated(User),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::Populated(user) => &user.id,
        }
    }
}

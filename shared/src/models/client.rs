//! Client row model

use serde::{Deserialize, Serialize};

/// A known client
///
/// Identity is the id; duplicate names are allowed. Everything but the name
/// is free-form contact data and may be empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub street_number: String,
    #[serde(default)]
    pub cross_streets: String,
    #[serde(default)]
    pub phone: String,
}

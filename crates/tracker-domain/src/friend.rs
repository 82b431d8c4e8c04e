//! Counterparties the user tracks debts with.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// Field set written when a friend is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewFriend {
    pub name: String,
    #[serde(default)]
    pub owner_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Friend {
    pub id: String,
    pub name: String,
    pub owner_id: String,
}

impl Friend {
    pub fn from_new(id: impl Into<String>, new: NewFriend) -> Self {
        Self {
            id: id.into(),
            name: new.name,
            owner_id: new.owner_id,
        }
    }
}

impl Identifiable for Friend {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Friend {
    fn display_label(&self) -> String {
        self.name.clone()
    }
}

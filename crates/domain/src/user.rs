use crate::shared::entity::{Entity, ID};

/// A `User` row is created lazily the first time a valid token for
/// that id is presented.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub created: i64,
}

impl User {
    pub fn new(id: ID, now: i64) -> Self {
        Self { id, created: now }
    }
}

impl Entity<ID> for User {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

use std::collections::BTreeSet;
use streamchik_core::ConnectionId;

/// Member set of one room. Kept ordered by id so that `peers` lists come
/// out in assignment order.
#[derive(Debug, Default, Clone)]
pub struct Room {
    members: BTreeSet<ConnectionId>,
}

impl Room {
    pub fn insert(&mut self, id: ConnectionId) -> bool {
        self.members.insert(id)
    }

    pub fn remove(&mut self, id: ConnectionId) -> bool {
        self.members.remove(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.members.iter().copied().collect()
    }
}

/**
 * Group Registry
 *
 * Maps each group to the set of connections currently subscribed to it.
 *
 * # Invariants
 *
 * - A connection id appears in at most one group's set.
 * - A group entry exists only while its set is non-empty; removing the last
 *   member removes the key.
 *
 * The registry is plain data with no locking. It is owned and mutated
 * exclusively by the hub coordinator task.
 */
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::backend::hub::connection::{Connection, ConnectionId};
use crate::shared::GroupId;

#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: HashMap<GroupId, HashMap<ConnectionId, Connection>>,
    index: HashMap<ConnectionId, GroupId>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to its group, creating the group if absent
    ///
    /// # Returns
    /// `false` if the connection id was already registered; the registry is
    /// left unchanged and the duplicate is dropped.
    pub fn insert(&mut self, connection: Connection) -> bool {
        let id = connection.id();
        if self.index.contains_key(&id) {
            return false;
        }
        let group_id = connection.group_id().clone();
        self.index.insert(id, group_id.clone());
        self.groups.entry(group_id).or_default().insert(id, connection);
        true
    }

    /// Remove a connection, deleting its group if it becomes empty
    ///
    /// Returns the removed connection; dropping it closes its outbound queue.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        let group_id = self.index.remove(&id)?;
        let members = self.groups.get_mut(&group_id)?;
        let connection = members.remove(&id);
        if members.is_empty() {
            self.groups.remove(&group_id);
        }
        connection
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn group_of(&self, id: ConnectionId) -> Option<&GroupId> {
        self.index.get(&id)
    }

    pub fn has_group(&self, group_id: &GroupId) -> bool {
        self.groups.contains_key(group_id)
    }

    /// Current members of a group, if the group exists
    pub fn members(&self, group_id: &GroupId) -> Option<impl Iterator<Item = &Connection>> {
        self.groups.get(group_id).map(|members| members.values())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn connection_count(&self) -> usize {
        self.index.len()
    }

    /// Ordered copy of the membership, for introspection
    pub fn snapshot(&self) -> BTreeMap<GroupId, BTreeSet<ConnectionId>> {
        self.groups
            .iter()
            .map(|(group_id, members)| (group_id.clone(), members.keys().copied().collect()))
            .collect()
    }
}

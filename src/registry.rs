//! Registry of tracked MAP connections and listening servers.
//!
//! Records are keyed by role: there is one notification server per device,
//! one notification client per remote device, one access server per
//! instance, and one access client per instance and remote device. The
//! registry is plain data; the manager serialises access to it behind its
//! single state lock.

use std::{collections::HashMap, fmt};

use tokio::sync::oneshot;

use crate::{
    address::BdAddr,
    event::EventCallback,
    types::{ConnectionRole, ConnectionStatus},
};

/// Role-specific identity of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKey {
    NotificationServer,
    NotificationClient(BdAddr),
    AccessServer(u32),
    AccessClient(u32, BdAddr),
}

impl RecordKey {
    /// Compute the key for `role`, ignoring the parts the role does not use.
    ///
    /// Client roles have no key without a remote address.
    ///
    /// ```
    /// use mapm::{BdAddr, ConnectionRole, registry::RecordKey};
    ///
    /// let peer = BdAddr::new([1, 2, 3, 4, 5, 6]);
    /// assert_eq!(
    ///     RecordKey::for_role(ConnectionRole::AccessServer, peer, 5),
    ///     Some(RecordKey::AccessServer(5))
    /// );
    /// assert_eq!(RecordKey::for_role(ConnectionRole::AccessClient, BdAddr::NULL, 5), None);
    /// ```
    #[must_use]
    pub fn for_role(role: ConnectionRole, address: BdAddr, instance_id: u32) -> Option<Self> {
        match role {
            ConnectionRole::NotificationServer => Some(Self::NotificationServer),
            ConnectionRole::AccessServer => Some(Self::AccessServer(instance_id)),
            ConnectionRole::NotificationClient if !address.is_null() => {
                Some(Self::NotificationClient(address))
            }
            ConnectionRole::AccessClient if !address.is_null() => {
                Some(Self::AccessClient(instance_id, address))
            }
            ConnectionRole::NotificationClient | ConnectionRole::AccessClient => None,
        }
    }

    #[must_use]
    pub fn role(&self) -> ConnectionRole {
        match self {
            Self::NotificationServer => ConnectionRole::NotificationServer,
            Self::NotificationClient(_) => ConnectionRole::NotificationClient,
            Self::AccessServer(_) => ConnectionRole::AccessServer,
            Self::AccessClient(..) => ConnectionRole::AccessClient,
        }
    }
}

/// Errors raised by [`Registry`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A record with the same key already exists; it was left in place.
    #[error("a {} record already exists for {key:?}", key.role())]
    Duplicate { key: RecordKey },
    /// A client-role record needs a remote address.
    #[error("{role} records need a remote address")]
    MissingAddress { role: ConnectionRole },
}

/// Identity assigned to a record when it enters a [`Registry`].
///
/// Ids are never reused by the registry that issued them, so a stale id
/// never matches a record inserted later under the same key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RecordId(u64);

/// One tracked connection or listening server.
pub struct ConnectionRecord {
    id: RecordId,
    pub instance_id: u32,
    /// Remote device, or [`BdAddr::NULL`] for an idle server.
    pub remote_address: BdAddr,
    pub role: ConnectionRole,
    /// Last known connection status.
    pub status: ConnectionStatus,
    /// Set while a blocking connect waits on this record.
    pub opening: bool,
    completion: Option<oneshot::Sender<ConnectionStatus>>,
    callback: Option<EventCallback>,
}

impl ConnectionRecord {
    #[must_use]
    pub fn new(role: ConnectionRole, remote_address: BdAddr, instance_id: u32) -> Self {
        Self {
            id: RecordId::default(),
            instance_id,
            remote_address,
            role,
            status: ConnectionStatus::Success,
            opening: false,
            completion: None,
            callback: None,
        }
    }

    /// Attach the callback that receives this record's events.
    #[must_use]
    pub fn with_callback(mut self, callback: EventCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Mark the record as opening and return the receiver its final status
    /// will be delivered on.
    pub fn begin_opening(&mut self) -> oneshot::Receiver<ConnectionStatus> {
        let (tx, rx) = oneshot::channel();
        self.opening = true;
        self.completion = Some(tx);
        rx
    }

    /// Store `status` and wake the waiter, if any.
    ///
    /// Returns `true` if a waiter was woken.
    pub fn complete(&mut self, status: ConnectionStatus) -> bool {
        self.status = status;
        self.completion
            .take()
            .is_some_and(|tx| tx.send(status).is_ok())
    }

    /// Identity assigned on insertion.
    #[must_use]
    pub fn id(&self) -> RecordId { self.id }

    /// Key under which this record is stored.
    #[must_use]
    pub fn key(&self) -> Option<RecordKey> {
        RecordKey::for_role(self.role, self.remote_address, self.instance_id)
    }

    /// A handle to the event callback.
    #[must_use]
    pub fn callback(&self) -> Option<EventCallback> { self.callback.clone() }
}

impl fmt::Debug for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRecord")
            .field("id", &self.id)
            .field("instance_id", &self.instance_id)
            .field("remote_address", &self.remote_address)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("opening", &self.opening)
            .field("has_callback", &self.callback.is_some())
            .finish_non_exhaustive()
    }
}

/// Records keyed by [`RecordKey`], at most one per key.
#[derive(Debug, Default)]
pub struct Registry {
    records: HashMap<RecordKey, ConnectionRecord>,
    next_id: u64,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Add `record` under its role-specific key and assign it a fresh
    /// [`RecordId`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the key is taken, in which case
    /// `record` is dropped and the existing record is kept, or
    /// [`RegistryError::MissingAddress`] for an unaddressed client record.
    pub fn insert(&mut self, record: ConnectionRecord) -> Result<&mut ConnectionRecord, RegistryError> {
        let key = record
            .key()
            .ok_or(RegistryError::MissingAddress { role: record.role })?;
        match self.records.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => Err(RegistryError::Duplicate { key }),
            std::collections::hash_map::Entry::Vacant(slot) => {
                self.next_id += 1;
                let mut record = record;
                record.id = RecordId(self.next_id);
                Ok(slot.insert(record))
            }
        }
    }

    #[must_use]
    pub fn find(
        &self,
        role: ConnectionRole,
        address: BdAddr,
        instance_id: u32,
    ) -> Option<&ConnectionRecord> {
        self.get(&RecordKey::for_role(role, address, instance_id)?)
    }

    pub fn find_mut(
        &mut self,
        role: ConnectionRole,
        address: BdAddr,
        instance_id: u32,
    ) -> Option<&mut ConnectionRecord> {
        self.get_mut(&RecordKey::for_role(role, address, instance_id)?)
    }

    /// Unlink a record, handing it back to the caller.
    pub fn remove(
        &mut self,
        role: ConnectionRole,
        address: BdAddr,
        instance_id: u32,
    ) -> Option<ConnectionRecord> {
        self.remove_key(&RecordKey::for_role(role, address, instance_id)?)
    }

    /// Unlink the record under the key only if it is still the one
    /// identified by `id`.
    pub fn remove_if_current(
        &mut self,
        role: ConnectionRole,
        address: BdAddr,
        instance_id: u32,
        id: RecordId,
    ) -> Option<ConnectionRecord> {
        let key = RecordKey::for_role(role, address, instance_id)?;
        if self.records.get(&key)?.id != id {
            return None;
        }
        self.records.remove(&key)
    }

    #[must_use]
    pub fn get(&self, key: &RecordKey) -> Option<&ConnectionRecord> { self.records.get(key) }

    pub fn get_mut(&mut self, key: &RecordKey) -> Option<&mut ConnectionRecord> {
        self.records.get_mut(key)
    }

    pub fn remove_key(&mut self, key: &RecordKey) -> Option<ConnectionRecord> {
        self.records.remove(key)
    }

    /// Keep only the records for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut ConnectionRecord) -> bool) {
        self.records.retain(|_, record| keep(record));
    }

    /// Drop every record. Pending completions are dropped with them, which
    /// wakes their waiters with a closed channel.
    pub fn clear_all(&mut self) { self.records.clear(); }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionRecord> { self.records.values() }

    #[must_use]
    pub fn len(&self) -> usize { self.records.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    use super::*;

    const PEER: BdAddr = BdAddr::new([0, 1, 2, 3, 4, 5]);

    #[fixture]
    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .insert(ConnectionRecord::new(ConnectionRole::AccessServer, BdAddr::NULL, 5))
            .expect("empty registry accepts a server");
        registry
    }

    #[rstest]
    fn duplicate_keeps_original(mut registry: Registry) {
        registry
            .find_mut(ConnectionRole::AccessServer, BdAddr::NULL, 5)
            .expect("server should exist")
            .status = ConnectionStatus::FailureTimeout;
        let err = registry
            .insert(ConnectionRecord::new(ConnectionRole::AccessServer, PEER, 5))
            .expect_err("same instance must collide");
        assert_eq!(err, RegistryError::Duplicate {
            key: RecordKey::AccessServer(5)
        });
        let kept = registry
            .find(ConnectionRole::AccessServer, BdAddr::NULL, 5)
            .expect("original should remain");
        assert_eq!(kept.status, ConnectionStatus::FailureTimeout);
        assert_eq!(kept.remote_address, BdAddr::NULL);
    }

    #[rstest]
    fn removing_absent_key_changes_nothing(mut registry: Registry) {
        assert!(registry.remove(ConnectionRole::AccessServer, BdAddr::NULL, 6).is_none());
        assert!(registry.remove(ConnectionRole::AccessClient, PEER, 5).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[rstest]
    fn client_needs_address(mut registry: Registry) {
        assert_eq!(
            registry
                .insert(ConnectionRecord::new(ConnectionRole::AccessClient, BdAddr::NULL, 1))
                .map(|_| ()),
            Err(RegistryError::MissingAddress {
                role: ConnectionRole::AccessClient
            })
        );
    }

    #[test]
    fn notification_server_is_a_singleton() {
        let mut registry = Registry::new();
        registry
            .insert(ConnectionRecord::new(ConnectionRole::NotificationServer, BdAddr::NULL, 0))
            .expect("first notification server");
        assert!(
            registry
                .insert(ConnectionRecord::new(ConnectionRole::NotificationServer, PEER, 9))
                .is_err()
        );
    }

    #[rstest]
    fn stale_id_leaves_successor_in_place(mut registry: Registry) {
        let first = registry
            .insert(ConnectionRecord::new(ConnectionRole::AccessClient, PEER, 3))
            .expect("first client")
            .id();
        registry.remove(ConnectionRole::AccessClient, PEER, 3);
        let second = registry
            .insert(ConnectionRecord::new(ConnectionRole::AccessClient, PEER, 3))
            .expect("successor")
            .id();
        assert_ne!(first, second);
        assert!(
            registry
                .remove_if_current(ConnectionRole::AccessClient, PEER, 3, first)
                .is_none()
        );
        assert!(registry.find(ConnectionRole::AccessClient, PEER, 3).is_some());
        assert!(
            registry
                .remove_if_current(ConnectionRole::AccessClient, PEER, 3, second)
                .is_some()
        );
    }

    #[rstest]
    fn ids_survive_clear_all(mut registry: Registry) {
        let before = registry
            .find(ConnectionRole::AccessServer, BdAddr::NULL, 5)
            .map(ConnectionRecord::id);
        registry.clear_all();
        let after = registry
            .insert(ConnectionRecord::new(ConnectionRole::AccessServer, BdAddr::NULL, 5))
            .expect("cleared registry accepts a server")
            .id();
        assert_ne!(before, Some(after));
    }

    #[tokio::test]
    async fn completion_wakes_waiter() {
        let mut record = ConnectionRecord::new(ConnectionRole::AccessClient, PEER, 3);
        let rx = record.begin_opening();
        assert!(record.opening);
        assert!(record.complete(ConnectionStatus::FailureRefused));
        assert!(!record.complete(ConnectionStatus::Success), "completion fires once");
        assert_eq!(rx.await, Ok(ConnectionStatus::FailureRefused));
    }

    fn role() -> impl Strategy<Value = ConnectionRole> {
        prop_oneof![
            Just(ConnectionRole::NotificationServer),
            Just(ConnectionRole::NotificationClient),
            Just(ConnectionRole::AccessServer),
            Just(ConnectionRole::AccessClient),
        ]
    }

    proptest! {
        #[test]
        fn keys_stay_unique(ops in proptest::collection::vec((role(), 0u8..3, 0u32..3), 0..40)) {
            let mut registry = Registry::new();
            let mut accepted = std::collections::HashSet::new();
            for (role, peer, instance_id) in ops {
                let address = BdAddr::new([0, 0, 0, 0, 0, peer]);
                let record = ConnectionRecord::new(role, address, instance_id);
                let key = record.key();
                let fresh = key.is_some_and(|k| !accepted.contains(&k));
                prop_assert_eq!(registry.insert(record).is_ok(), fresh);
                if let Some(k) = key {
                    accepted.insert(k);
                }
            }
            prop_assert_eq!(registry.len(), accepted.len());
            let keys: std::collections::HashSet<_> = registry.iter().filter_map(ConnectionRecord::key).collect();
            prop_assert_eq!(keys.len(), registry.len());
        }
    }
}

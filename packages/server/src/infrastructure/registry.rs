//! Session registry: the shared set of live connections.
//!
//! All access goes through `join`, `leave`, `bind_name` and `snapshot`. The
//! map itself never escapes the lock, so a broadcast can only ever iterate an
//! immutable snapshot while other handlers keep mutating the registry.

use std::collections::BTreeMap;

use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{ConnectionId, DisplayName, Member, RegistryError};

/// Registry of every connection whose handler has not yet terminated.
pub struct SessionRegistry {
    /// Ordered by id, which is join order.
    members: Mutex<BTreeMap<ConnectionId, Member>>,
    /// Upper bound on live connections, if any.
    capacity: Option<usize>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            members: Mutex::new(BTreeMap::new()),
            capacity: None,
        }
    }

    pub fn with_capacity(max_connections: usize) -> Self {
        Self {
            members: Mutex::new(BTreeMap::new()),
            capacity: Some(max_connections),
        }
    }

    /// Add a freshly accepted connection.
    pub async fn join(&self, member: Member) -> Result<(), RegistryError> {
        let mut members = self.members.lock().await;

        if members.contains_key(&member.id) {
            tracing::error!(
                "Connection {} joined twice; rejecting the second join",
                member.id
            );
            return Err(RegistryError::DuplicateConnection(member.id));
        }
        if let Some(max) = self.capacity
            && members.len() >= max
        {
            return Err(RegistryError::CapacityExceeded { max });
        }

        tracing::debug!("Connection {} joined the registry", member.id);
        members.insert(member.id, member);
        Ok(())
    }

    /// Remove a connection. Returns `false` if it was already gone.
    pub async fn leave(&self, id: ConnectionId) -> bool {
        let removed = self.members.lock().await.remove(&id).is_some();
        if removed {
            tracing::debug!("Connection {} left the registry", id);
        }
        removed
    }

    /// Bind the display name of a live connection. Returns `false` if it already left.
    pub async fn bind_name(&self, id: ConnectionId, name: DisplayName) -> bool {
        match self.members.lock().await.get_mut(&id) {
            Some(member) => {
                member.name = Some(name);
                true
            }
            None => false,
        }
    }

    /// Capture the current membership. The lock is released before this returns.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        let members = self.members.lock().await;
        RegistrySnapshot {
            members: members.values().cloned().collect(),
        }
    }

    pub async fn len(&self) -> usize {
        self.members.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.lock().await.is_empty()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.members.lock().await.contains_key(&id)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable view of the registry at one instant, in join order.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    members: Vec<Member>,
}

impl RegistrySnapshot {
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Push `line` to every member except `exclude`, in snapshot order.
    ///
    /// A failed push never stops the loop; the member is reported in `failed`.
    /// A member whose queue is full has stopped reading and is told to hang up.
    pub fn deliver(&self, line: &str, exclude: Option<ConnectionId>) -> Delivery {
        let mut delivery = Delivery::default();

        for member in &self.members {
            if Some(member.id) == exclude {
                continue;
            }
            match member.push(line) {
                Ok(()) => delivery.delivered.push(member.id),
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        "Connection {} outbound queue full, dropping it from fan-out",
                        member.id
                    );
                    member.hang_up();
                    delivery.failed.push(member.id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!("Connection {} is gone, dropping it from fan-out", member.id);
                    delivery.failed.push(member.id);
                }
            }
        }

        delivery
    }
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: Vec<ConnectionId>,
    pub failed: Vec<ConnectionId>,
}

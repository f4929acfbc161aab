//! Recipient channel registry.
//!
//! Process-wide map from recipient id to that recipient's live endpoints.
//! Nothing here is persisted; recipients re-register when they reconnect.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};

use futures::Stream;
use outbreak_core::{FeedEvent, RecipientId, Role};
use tokio::sync::mpsc;
use tracing::debug;

use crate::sink::{ChannelSink, EndpointSink};

/// Identifies one registered endpoint of one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointHandle {
    recipient_id: RecipientId,
    endpoint_id: u64,
}

impl EndpointHandle {
    pub fn recipient_id(&self) -> &RecipientId {
        &self.recipient_id
    }

    pub fn endpoint_id(&self) -> u64 {
        self.endpoint_id
    }
}

impl fmt::Display for EndpointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.recipient_id, self.endpoint_id)
    }
}

/// A registered endpoint as returned by a lookup.
#[derive(Clone)]
pub struct Endpoint {
    handle: EndpointHandle,
    role: Role,
    sink: Arc<dyn EndpointSink>,
}

impl Endpoint {
    pub fn handle(&self) -> &EndpointHandle {
        &self.handle
    }

    pub fn recipient_id(&self) -> &RecipientId {
        &self.handle.recipient_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn sink(&self) -> &Arc<dyn EndpointSink> {
        &self.sink
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("handle", &self.handle)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

struct Slot {
    role: Role,
    sink: Arc<dyn EndpointSink>,
}

type Table = HashMap<RecipientId, HashMap<u64, Slot>>;

#[derive(Default)]
struct Inner {
    table: RwLock<Table>,
    next_id: AtomicU64,
}

/// Thread-safe registry of live endpoints.
///
/// Cloning is cheap and every clone shares the same table. `register`,
/// `unregister` and lookups may be called concurrently from any task. A
/// lookup returns a snapshot: endpoints registered afterwards are not in it,
/// and endpoints unregistered before it are never in it.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    inner: Arc<Inner>,
}

impl ChannelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // Critical sections never panic, so a poisoned lock still holds a
    // consistent table.
    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.inner.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.inner.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach an endpoint for a recipient.
    ///
    /// A recipient may hold any number of endpoints at once.
    pub fn register(
        &self,
        recipient_id: RecipientId,
        role: Role,
        sink: Arc<dyn EndpointSink>,
    ) -> EndpointHandle {
        let endpoint_id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = EndpointHandle {
            recipient_id,
            endpoint_id,
        };

        self.write()
            .entry(handle.recipient_id.clone())
            .or_default()
            .insert(endpoint_id, Slot { role, sink });

        debug!(endpoint = %handle, role = %role, "Endpoint registered");
        handle
    }

    /// Attach a channel-backed endpoint and return the receiving side.
    pub fn subscribe(&self, recipient_id: RecipientId, role: Role, capacity: usize) -> Subscription {
        let (sink, receiver) = ChannelSink::new(capacity);
        let handle = self.register(recipient_id, role, Arc::new(sink));
        Subscription {
            handle,
            receiver,
            registry: self.clone(),
        }
    }

    /// Detach exactly the given endpoint. Other endpoints of the same
    /// recipient are untouched. Returns false if it was not registered.
    pub fn unregister(&self, handle: &EndpointHandle) -> bool {
        let mut table = self.write();
        let Some(endpoints) = table.get_mut(&handle.recipient_id) else {
            return false;
        };
        let removed = endpoints.remove(&handle.endpoint_id).is_some();
        if endpoints.is_empty() {
            table.remove(&handle.recipient_id);
        }
        drop(table);

        if removed {
            debug!(endpoint = %handle, "Endpoint unregistered");
        }
        removed
    }

    /// Snapshot of a recipient's live endpoints.
    pub fn lookup(&self, recipient_id: &RecipientId) -> Vec<Endpoint> {
        self.read()
            .get(recipient_id)
            .map(|endpoints| {
                endpoints
                    .iter()
                    .filter(|(_, slot)| !slot.sink.is_closed())
                    .map(|(id, slot)| Endpoint {
                        handle: EndpointHandle {
                            recipient_id: recipient_id.clone(),
                            endpoint_id: *id,
                        },
                        role: slot.role,
                        sink: Arc::clone(&slot.sink),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot of every live endpoint registered with `role`.
    pub fn lookup_role(&self, role: Role) -> Vec<Endpoint> {
        self.read()
            .iter()
            .flat_map(|(recipient_id, endpoints)| {
                endpoints
                    .iter()
                    .filter(move |(_, slot)| slot.role == role && !slot.sink.is_closed())
                    .map(move |(id, slot)| Endpoint {
                        handle: EndpointHandle {
                            recipient_id: recipient_id.clone(),
                            endpoint_id: *id,
                        },
                        role: slot.role,
                        sink: Arc::clone(&slot.sink),
                    })
            })
            .collect()
    }

    /// Whether the recipient has at least one live endpoint.
    pub fn is_online(&self, recipient_id: &RecipientId) -> bool {
        self.read()
            .get(recipient_id)
            .is_some_and(|endpoints| endpoints.values().any(|slot| !slot.sink.is_closed()))
    }

    /// Detach every endpoint of a recipient, for example after their role
    /// changed. Channel-backed endpoints see their stream end, so clients
    /// reconnect and subscribe with the current role. Returns how many
    /// endpoints were removed.
    pub fn unregister_recipient(&self, recipient_id: &RecipientId) -> usize {
        let removed = self
            .write()
            .remove(recipient_id)
            .map_or(0, |endpoints| endpoints.len());

        if removed > 0 {
            debug!(recipient = %recipient_id, removed, "Recipient endpoints unregistered");
        }
        removed
    }

    /// Number of recipients with at least one registered endpoint.
    pub fn recipient_count(&self) -> usize {
        self.read().len()
    }

    /// Total number of registered endpoints.
    pub fn endpoint_count(&self) -> usize {
        self.read().values().map(HashMap::len).sum()
    }
}

impl fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("recipients", &self.recipient_count())
            .field("endpoints", &self.endpoint_count())
            .finish()
    }
}

/// The receiving side of a channel-backed endpoint.
///
/// Dropping a subscription unregisters its endpoint.
pub struct Subscription {
    handle: EndpointHandle,
    receiver: mpsc::Receiver<FeedEvent>,
    registry: ChannelRegistry,
}

impl Subscription {
    /// Handle of the registered endpoint.
    pub fn handle(&self) -> &EndpointHandle {
        &self.handle
    }

    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        self.receiver.recv().await
    }

    /// Take an event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<FeedEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for Subscription {
    type Item = FeedEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unregister(&self.handle);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

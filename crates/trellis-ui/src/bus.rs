//! Address-keyed message routing between components.
//!
//! The bus decouples widgets (and external controllers) from one another:
//! a component subscribes at an [`Address`], anyone can [`publish`] to that
//! address, and [`request`] adds a synchronous reply path with an explicit
//! time bound. Delivery is synchronous and single-threaded; handlers run
//! inline within the publishing call, in subscription order within an
//! address. There is no ordering guarantee across addresses.
//!
//! Handlers may publish or subscribe re-entrantly. Delivery iterates over a
//! snapshot of the registry, so mid-delivery mutation never invalidates the
//! walk, and a publish-depth cap stops runaway republish loops before they
//! overflow the stack.
//!
//! [`publish`]: AddressBus::publish
//! [`request`]: AddressBus::request

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Logical address of a component on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub u32);

impl Address {
    /// Multicast address: a publish here reaches every subscription.
    pub const BROADCAST: Address = Address(u32::MAX);
}

/// Message payload. Single-threaded, shared by reference counting.
pub type Payload = Rc<dyn Any>;

/// Handle returned from subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Errors from bus request/publish operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The target address has no subscribers.
    NoSubscriber(Address),
    /// No subscriber replied within the caller's time bound.
    Timeout(Address),
    /// A nested publish exceeded the re-publish depth cap.
    DepthExceeded,
}

impl std::fmt::Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusError::NoSubscriber(addr) => write!(f, "no subscriber at address {}", addr.0),
            BusError::Timeout(addr) => write!(f, "request to address {} timed out", addr.0),
            BusError::DepthExceeded => write!(f, "publish depth cap exceeded"),
        }
    }
}

impl std::error::Error for BusError {}

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

/// Nested publishes past this depth fail with [`BusError::DepthExceeded`].
pub const MAX_PUBLISH_DEPTH: u32 = 64;

type Responder = Rc<RefCell<dyn FnMut(&Payload) -> Option<Payload>>>;

struct Subscription {
    id: SubscriptionId,
    address: Address,
    handler: Responder,
}

#[derive(Default)]
struct Registry {
    subscriptions: Vec<Subscription>,
    next_address: u32,
    next_subscription: u64,
}

/// Publish/subscribe and request/response message router.
///
/// Deliberately `!Send`: handlers are `Rc`-shared closures and the whole
/// framework assumes single-threaded ownership.
#[derive(Default)]
pub struct AddressBus {
    registry: RefCell<Registry>,
    depth: Cell<u32>,
}

impl AddressBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh unique address.
    pub fn allocate(&self) -> Address {
        let mut registry = self.registry.borrow_mut();
        let addr = Address(registry.next_address);
        registry.next_address += 1;
        addr
    }

    /// Subscribe a fire-and-forget handler at `address`.
    pub fn subscribe<F>(&self, address: Address, mut handler: F) -> SubscriptionId
    where
        F: FnMut(&Payload) + 'static,
    {
        self.subscribe_responder(address, move |payload| {
            handler(payload);
            None
        })
    }

    /// Subscribe a handler that may reply to [`request`]s. Returning
    /// `Some(reply)` answers the request and stops further delivery of it.
    ///
    /// [`request`]: AddressBus::request
    pub fn subscribe_responder<F>(&self, address: Address, handler: F) -> SubscriptionId
    where
        F: FnMut(&Payload) -> Option<Payload> + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = SubscriptionId(registry.next_subscription);
        registry.next_subscription += 1;
        registry.subscriptions.push(Subscription {
            id,
            address,
            handler: Rc::new(RefCell::new(handler)),
        });
        id
    }

    /// Remove a subscription. Unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.registry
            .borrow_mut()
            .subscriptions
            .retain(|sub| sub.id != id);
    }

    /// Number of subscriptions at `address`.
    pub fn subscriber_count(&self, address: Address) -> usize {
        self.registry
            .borrow()
            .subscriptions
            .iter()
            .filter(|sub| sub.address == address)
            .count()
    }

    /// Deliver `payload` to all current subscribers of `address`, in
    /// subscription order. [`Address::BROADCAST`] reaches every
    /// subscription. Returns the number of handlers invoked.
    pub fn publish(&self, address: Address, payload: Payload) -> BusResult<usize> {
        let _guard = self.enter()?;

        let handlers = self.snapshot(address);
        let mut delivered = 0;
        for handler in handlers {
            // A handler publishing to its own address while it runs would
            // self-deliver; skip rather than re-enter the closure.
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    handler(&payload);
                    delivered += 1;
                }
                Err(_) => {
                    tracing::warn!(address = address.0, "skipped re-entrant self-delivery");
                }
            }
        }
        Ok(delivered)
    }

    /// Ask the subscribers of `address` for a reply.
    ///
    /// Handlers are invoked in subscription order until one returns a reply,
    /// which is passed back unchanged. Fails with [`BusError::NoSubscriber`]
    /// when the address has none (without blocking), and with
    /// [`BusError::Timeout`] when `timeout` elapses before a reply; the
    /// bound is checked between handler invocations, so a zero timeout
    /// always times out.
    pub fn request(
        &self,
        address: Address,
        payload: Payload,
        timeout: Duration,
    ) -> BusResult<Payload> {
        let _guard = self.enter()?;

        let handlers = self.snapshot(address);
        if handlers.is_empty() {
            return Err(BusError::NoSubscriber(address));
        }

        let start = Instant::now();
        for handler in handlers {
            if start.elapsed() >= timeout {
                return Err(BusError::Timeout(address));
            }
            let Ok(mut handler) = handler.try_borrow_mut() else {
                tracing::warn!(address = address.0, "skipped re-entrant self-delivery");
                continue;
            };
            if let Some(reply) = handler(&payload) {
                return Ok(reply);
            }
        }

        Err(BusError::Timeout(address))
    }

    /// Clone the matching handlers out of the registry so delivery holds no
    /// borrow while handlers run (they may subscribe or publish).
    fn snapshot(&self, address: Address) -> Vec<Responder> {
        self.registry
            .borrow()
            .subscriptions
            .iter()
            .filter(|sub| address == Address::BROADCAST || sub.address == address)
            .map(|sub| Rc::clone(&sub.handler))
            .collect()
    }

    fn enter(&self) -> BusResult<DepthGuard<'_>> {
        if self.depth.get() >= MAX_PUBLISH_DEPTH {
            tracing::warn!("publish depth cap {MAX_PUBLISH_DEPTH} exceeded, dropping delivery");
            return Err(BusError::DepthExceeded);
        }
        self.depth.set(self.depth.get() + 1);
        Ok(DepthGuard { bus: self })
    }
}

struct DepthGuard<'a> {
    bus: &'a AddressBus,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.bus.depth.set(self.bus.depth.get() - 1);
    }
}

use std::sync::Arc;

use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio_util::sync::CancellationToken;

use super::{Config, manager::ServiceManager};
use crate::{
    events::{Bus, Event, EventKind},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`ServiceManager`] with optional features.
pub struct ServiceManagerBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ServiceManagerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with
    /// bounded queues; a slow subscriber never holds up the manager.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the manager.
    ///
    /// With subscribers configured this spawns their listener, so it must then
    /// be called from within a tokio runtime.
    pub fn build(self) -> ServiceManager {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = CancellationToken::new();
        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(&bus, set, listener.clone());
        }
        ServiceManager::new_internal(bus, listener)
    }
}

/// Forwards bus events to the subscriber set until the manager is dead or dropped.
///
/// The set holds a bus sender itself, so the bus never reports `Closed` on its own.
fn subscriber_listener(bus: &Bus, set: SubscriberSet, stop: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let got = tokio::select! {
                got = rx.recv() => got,
                _ = stop.cancelled() => {
                    drain(&mut rx, &set);
                    break;
                }
            };
            match got {
                Ok(ev) => {
                    set.emit(&ev);
                    if ev.kind == EventKind::ManagerDead {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber listener lagged; events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });
}

/// Hands over whatever was already published before the manager went away.
fn drain(rx: &mut broadcast::Receiver<Event>, set: &SubscriberSet) {
    loop {
        match rx.try_recv() {
            Ok(ev) => set.emit(&ev),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::State;

    #[test]
    fn test_build_without_subscribers_needs_no_runtime() {
        let mgr = ServiceManagerBuilder::new(Config::default()).build();
        assert_eq!(mgr.state(), State::New);
        assert_eq!(mgr.signaler_count(), 0);
    }
}

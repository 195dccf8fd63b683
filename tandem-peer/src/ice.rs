//! Local candidate collection and remote candidate buffering.

use std::sync::Arc;
use std::time::Duration;
use tandem_core::CandidateRecord;
use tokio::sync::watch;
use tracing::{debug, warn};

/// How local candidates reach the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStrategy {
    /// Wait for gathering, then ship every candidate inside the descriptor.
    Bundle,
    /// Forward each candidate the moment it is found.
    Trickle,
}

/// Where a freshly gathered local candidate goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateRoute {
    /// Over the chat channel of a live link.
    Channel,
    /// Through the room relay.
    Relay,
    /// Nowhere yet: the collector hands it to the descriptor.
    Descriptor,
}

#[derive(Debug, Default, Clone)]
struct Gathering {
    candidates: Vec<CandidateRecord>,
    complete: bool,
}

/// Shared between the connection's candidate callback and the session.
#[derive(Debug, Clone)]
pub struct CandidateCollector {
    state: Arc<watch::Sender<Gathering>>,
}

impl Default for CandidateCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateCollector {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Gathering::default());
        Self {
            state: Arc::new(tx),
        }
    }

    /// Returns false once gathering is complete; the list is frozen from then on.
    pub fn push(&self, candidate: CandidateRecord) -> bool {
        let mut accepted = false;
        self.state.send_modify(|gathering| {
            if !gathering.complete {
                gathering.candidates.push(candidate);
                accepted = true;
            }
        });
        accepted
    }

    pub fn finish(&self) {
        self.state.send_modify(|gathering| gathering.complete = true);
    }

    pub fn is_complete(&self) -> bool {
        self.state.borrow().complete
    }

    pub fn snapshot(&self) -> Vec<CandidateRecord> {
        self.state.borrow().candidates.clone()
    }

    /// Waits for gathering to finish, or for `limit`, and returns what was collected.
    pub async fn wait(&self, limit: Duration) -> Vec<CandidateRecord> {
        let mut rx = self.state.subscribe();
        match tokio::time::timeout(limit, rx.wait_for(|g| g.complete)).await {
            Ok(_) => debug!("Candidate gathering complete"),
            Err(_) => warn!(
                "Candidate gathering timed out after {:?}; using {} candidates",
                limit,
                self.state.borrow().candidates.len()
            ),
        }
        self.finish();
        self.snapshot()
    }
}

pub struct IceCoordinator {
    collector: CandidateCollector,
    strategy: DeliveryStrategy,
    gathering_timeout: Duration,
    remote_ready: bool,
    pending_remote: Vec<CandidateRecord>,
}

impl IceCoordinator {
    pub fn new(strategy: DeliveryStrategy, gathering_timeout: Duration) -> Self {
        Self {
            collector: CandidateCollector::new(),
            strategy,
            gathering_timeout,
            remote_ready: false,
            pending_remote: Vec::new(),
        }
    }

    pub fn collector(&self) -> CandidateCollector {
        self.collector.clone()
    }

    pub fn strategy(&self) -> DeliveryStrategy {
        self.strategy
    }

    pub fn route_local(&self, connected: bool) -> CandidateRoute {
        if connected {
            return CandidateRoute::Channel;
        }
        match self.strategy {
            DeliveryStrategy::Trickle => CandidateRoute::Relay,
            DeliveryStrategy::Bundle => CandidateRoute::Descriptor,
        }
    }

    pub async fn gathered(&self) -> Vec<CandidateRecord> {
        self.collector.wait(self.gathering_timeout).await
    }

    /// Holds a remote candidate until the remote description is in place.
    /// Returns the candidate back when it can be applied right away.
    pub fn accept_remote(&mut self, candidate: CandidateRecord) -> Option<CandidateRecord> {
        if self.remote_ready {
            Some(candidate)
        } else {
            debug!("Buffering remote candidate until remote description is set");
            self.pending_remote.push(candidate);
            None
        }
    }

    /// The remote description is applied; everything buffered so far is released in order.
    pub fn mark_remote_ready(&mut self) -> Vec<CandidateRecord> {
        self.remote_ready = true;
        std::mem::take(&mut self.pending_remote)
    }

    pub fn pending_remote(&self) -> usize {
        self.pending_remote.len()
    }
}

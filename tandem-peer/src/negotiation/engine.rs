use crate::error::DescriptionError;
use crate::negotiation::{NegotiationTarget, OfferDecision, PerfectNegotiation, Role};
use std::sync::Arc;
use tandem_core::{CandidateRecord, DescriptorKind};
use tracing::{debug, info};

/// Result of handing a remote description to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// Colliding offer dropped by the impolite side. Not an error.
    Ignored,
    Applied,
    /// The offer was applied; this answer must go back to the peer.
    Answer(String),
}

/// Drives offers and answers over a [`NegotiationTarget`].
///
/// Renegotiation offers are drafted but only installed locally once their answer
/// arrives, so a polite peer that loses a collision drops its draft instead of
/// rolling back the connection's signaling state.
pub struct NegotiationEngine<T: NegotiationTarget + ?Sized> {
    target: Arc<T>,
    state: PerfectNegotiation,
    draft: Option<String>,
    retry: bool,
}

impl<T: NegotiationTarget + ?Sized> NegotiationEngine<T> {
    pub fn new(target: Arc<T>) -> Self {
        Self {
            target,
            state: PerfectNegotiation::new(),
            draft: None,
            retry: false,
        }
    }

    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    pub fn role(&self) -> Option<Role> {
        self.state.role()
    }

    pub fn state(&self) -> &PerfectNegotiation {
        &self.state
    }

    /// First offer of a session. Its creator becomes the impolite peer.
    pub async fn create_offer(&mut self) -> Result<String, DescriptionError> {
        self.claim(Role::Impolite)?;
        self.state.begin_offer();
        let result = self.target.make_offer().await;
        if result.is_err() {
            self.state.end_offer();
        }
        result
    }

    /// Answers the first offer of a session. The receiver becomes the polite peer.
    pub async fn accept_offer(&mut self, sdp: &str) -> Result<String, DescriptionError> {
        self.claim(Role::Polite)?;
        match self.on_remote_description(DescriptorKind::Offer, sdp).await? {
            RemoteOutcome::Answer(answer) => Ok(answer),
            other => Err(DescriptionError::InvalidState(format!(
                "offer was not answered: {other:?}"
            ))),
        }
    }

    pub async fn accept_answer(&mut self, sdp: &str) -> Result<(), DescriptionError> {
        self.on_remote_description(DescriptorKind::Answer, sdp)
            .await
            .map(|_| ())
    }

    /// Locally triggered renegotiation on an established session. Returns `None` while
    /// another offer of ours is still waiting for its answer; that round is retried later.
    pub async fn renegotiate(&mut self) -> Result<Option<String>, DescriptionError> {
        if self.state.making_offer() {
            debug!("Offer already in flight; renegotiating after its answer");
            self.retry = true;
            return Ok(None);
        }

        self.state.begin_offer();
        match self.target.draft_offer().await {
            Ok(sdp) => {
                self.draft = Some(sdp.clone());
                Ok(Some(sdp))
            }
            Err(e) => {
                self.state.end_offer();
                Err(e)
            }
        }
    }

    /// True once if a local renegotiation was dropped or deferred and must be started again.
    pub fn take_retry(&mut self) -> bool {
        std::mem::take(&mut self.retry)
    }

    pub async fn on_remote_description(
        &mut self,
        kind: DescriptorKind,
        sdp: &str,
    ) -> Result<RemoteOutcome, DescriptionError> {
        match kind {
            DescriptorKind::Offer => {
                match self.state.on_remote_offer(self.target.is_stable()) {
                    OfferDecision::Ignore => {
                        debug!("Ignoring colliding remote offer");
                        Ok(RemoteOutcome::Ignored)
                    }
                    OfferDecision::RollbackThenApply => {
                        if self.draft.take().is_some() {
                            info!("Offer collision: dropping our draft offer");
                            self.retry = true;
                        }
                        self.state.end_offer();
                        self.answer(sdp).await
                    }
                    OfferDecision::Apply => self.answer(sdp).await,
                }
            }
            DescriptorKind::Answer => {
                self.state.on_remote_answer();
                let result = self.apply_answer(sdp).await;
                self.state.end_offer();
                result.map(|()| RemoteOutcome::Applied)
            }
        }
    }

    /// Failures for candidates of an ignored offer are expected and reported as success.
    pub async fn apply_candidate(
        &mut self,
        candidate: CandidateRecord,
    ) -> Result<(), DescriptionError> {
        match self.target.add_remote_candidate(candidate).await {
            Ok(()) => Ok(()),
            Err(e) if !self.state.accepts_candidates() => {
                debug!("Dropped candidate of ignored offer: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.draft = None;
        self.retry = false;
    }

    fn claim(&mut self, role: Role) -> Result<(), DescriptionError> {
        self.state
            .assign_role(role)
            .map_err(|conflict| DescriptionError::InvalidState(conflict.to_string()))
    }

    async fn apply_answer(&mut self, sdp: &str) -> Result<(), DescriptionError> {
        if let Some(draft) = self.draft.take() {
            self.target.install_offer(&draft).await?;
        }
        self.target.apply_remote(DescriptorKind::Answer, sdp).await
    }

    async fn answer(&mut self, sdp: &str) -> Result<RemoteOutcome, DescriptionError> {
        self.target.apply_remote(DescriptorKind::Offer, sdp).await?;
        let answer = self.target.make_answer().await?;
        Ok(RemoteOutcome::Answer(answer))
    }
}

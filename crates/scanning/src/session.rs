//! Scan session: serialized, human-confirmed accumulation of serial numbers.
//!
//! ```text
//!   Idle --start--> AwaitingDecode --decode--> PendingConfirmation
//!                        ^   ^                    |        |
//!                        |   +------retry---------+        |
//!                        +----------accept (count < target)+
//!                                   accept (count == target) --> Complete
//!   any --cancel--> Idle          Complete --finalize--> Idle
//! ```
//!
//! The decoder is paused after every successful read and only resumed once
//! the pending read is accepted or retried.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use cylinder_core::{SerialNumber, SessionId, TargetQuantity, ValidationError};

use crate::decode::{DecodeError, DecodeEvent, DecodeSource, DecoderLease};

/// Read-only view of the already-committed selection.
pub trait Membership {
    fn contains_serial(&self, serial: &SerialNumber) -> bool;
}

impl Membership for HashSet<SerialNumber> {
    fn contains_serial(&self, serial: &SerialNumber) -> bool {
        self.contains(serial)
    }
}

impl Membership for BTreeSet<SerialNumber> {
    fn contains_serial(&self, serial: &SerialNumber) -> bool {
        self.contains(serial)
    }
}

impl Membership for [SerialNumber] {
    fn contains_serial(&self, serial: &SerialNumber) -> bool {
        self.contains(serial)
    }
}

impl Membership for Vec<SerialNumber> {
    fn contains_serial(&self, serial: &SerialNumber) -> bool {
        self.as_slice().contains_serial(serial)
    }
}

/// Whether a decoded serial must appear in a reference list to be accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScanPolicy {
    #[default]
    Unchecked,
    /// Only serials in this set are eligible (e.g. cylinders dispatched to the
    /// selected company).
    MustBeListed(HashSet<SerialNumber>),
}

impl ScanPolicy {
    pub fn listed(serials: impl IntoIterator<Item = SerialNumber>) -> Self {
        Self::MustBeListed(serials.into_iter().collect())
    }

    pub fn permits(&self, serial: &SerialNumber) -> bool {
        match self {
            ScanPolicy::Unchecked => true,
            ScanPolicy::MustBeListed(allowed) => allowed.contains(serial),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    AwaitingDecode,
    PendingConfirmation(SerialNumber),
    Complete,
}

impl ScanState {
    pub fn name(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::AwaitingDecode => "awaiting decode",
            ScanState::PendingConfirmation(_) => "pending confirmation",
            ScanState::Complete => "complete",
        }
    }
}

/// Successful transition outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStep {
    /// A read awaits explicit accept/retry.
    Pending(SerialNumber),
    /// A read was accepted; the decoder is running again.
    Accepted {
        serial: SerialNumber,
        accumulated: usize,
        target: u32,
    },
    /// The target was reached; only finalize or cancel remain.
    Completed { serial: SerialNumber, target: u32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cylinder {0} is already scanned")]
    Duplicate(SerialNumber),

    #[error("cylinder {0} is not in the eligible list")]
    NotEligible(SerialNumber),

    #[error("scanned code is blank")]
    Blank,

    #[error("scan incomplete: {accumulated} of {target} cylinders")]
    Incomplete { accumulated: usize, target: u32 },

    #[error("scan session is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("decoder read failed: {0}")]
    ReadFailed(String),

    #[error(transparent)]
    Decoder(#[from] DecodeError),
}

/// Scan dialog state for one screen.
#[derive(Debug)]
pub struct ScanSession<D: DecodeSource> {
    id: SessionId,
    policy: ScanPolicy,
    decoder: DecoderLease<D>,
    state: ScanState,
    target: Option<TargetQuantity>,
    accumulated: Vec<SerialNumber>,
}

impl<D: DecodeSource> ScanSession<D> {
    pub fn new(source: D, policy: ScanPolicy) -> Self {
        Self {
            id: SessionId::new(),
            policy,
            decoder: DecoderLease::new(source),
            state: ScanState::Idle,
            target: None,
            accumulated: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != ScanState::Idle
    }

    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }

    /// Replace the eligibility rule (e.g. after the reference list is re-fetched).
    pub fn set_policy(&mut self, policy: ScanPolicy) {
        self.policy = policy;
    }

    pub fn decoder(&self) -> &DecoderLease<D> {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut DecoderLease<D> {
        &mut self.decoder
    }

    pub fn target(&self) -> Option<TargetQuantity> {
        self.target
    }

    pub fn accumulated(&self) -> &[SerialNumber] {
        &self.accumulated
    }

    /// `true` only when the accumulated count equals the target.
    pub fn finalize_enabled(&self) -> bool {
        self.state == ScanState::Complete
    }

    /// Open the scan dialog.
    pub fn start(&mut self, target: Option<TargetQuantity>) -> Result<(), ScanError> {
        self.expect_state(matches!(self.state, ScanState::Idle), "idle")?;
        let target = target.ok_or(ValidationError::QuantityRequired)?;

        self.decoder.acquire()?;
        self.id = SessionId::new();
        self.accumulated.clear();
        self.target = Some(target);
        self.state = ScanState::AwaitingDecode;
        tracing::info!(session_id = %self.id, target = target.get(), "scan session started");
        Ok(())
    }

    /// Pull the next decoder event (if any) and feed it through the state machine.
    pub fn poll<M>(&mut self, committed: &M) -> Option<Result<ScanStep, ScanError>>
    where
        M: Membership + ?Sized,
    {
        if self.state != ScanState::AwaitingDecode {
            return None;
        }
        match self.decoder.next_event()? {
            DecodeEvent::Decoded(text) => Some(self.on_decode(&text, committed)),
            DecodeEvent::Failed(message) => Some(Err(self.on_decode_error(message))),
        }
    }

    /// Handle one decoded payload.
    ///
    /// Duplicates (of the scan buffer or of `committed`) and ineligible serials
    /// are rejected while the decoder keeps running.
    pub fn on_decode<M>(&mut self, raw: &str, committed: &M) -> Result<ScanStep, ScanError>
    where
        M: Membership + ?Sized,
    {
        self.expect_state(self.state == ScanState::AwaitingDecode, "awaiting decode")?;

        let serial = SerialNumber::parse(raw).map_err(|_| ScanError::Blank)?;
        if let Err(err) = self.check_candidate(&serial, committed) {
            tracing::warn!(session_id = %self.id, serial = %serial, error = %err, "scan rejected");
            self.keep_reading();
            return Err(err);
        }

        self.decoder.pause();
        tracing::debug!(session_id = %self.id, serial = %serial, "scan pending confirmation");
        self.state = ScanState::PendingConfirmation(serial.clone());
        Ok(ScanStep::Pending(serial))
    }

    /// Decoder errors are advisory: logged and returned, state is unchanged.
    pub fn on_decode_error(&mut self, message: impl Into<String>) -> ScanError {
        let message = message.into();
        tracing::warn!(session_id = %self.id, error = %message, "decoder read failed");
        ScanError::ReadFailed(message)
    }

    /// Accept the pending read.
    pub fn accept<M>(&mut self, committed: &M) -> Result<ScanStep, ScanError>
    where
        M: Membership + ?Sized,
    {
        let ScanState::PendingConfirmation(serial) = &self.state else {
            return Err(self.invalid_state("pending confirmation"));
        };
        let serial = serial.clone();
        let target = self.target.ok_or(ValidationError::QuantityRequired)?;

        // The committed selection may have changed while the read was pending.
        if let Err(err) = self.check_candidate(&serial, committed) {
            tracing::warn!(session_id = %self.id, serial = %serial, error = %err, "pending scan discarded");
            self.state = ScanState::AwaitingDecode;
            self.keep_reading();
            return Err(err);
        }

        self.accumulated.push(serial.clone());
        let accumulated = self.accumulated.len();
        if accumulated < target.as_usize() {
            self.state = ScanState::AwaitingDecode;
            self.keep_reading();
            tracing::info!(session_id = %self.id, serial = %serial, accumulated, target = target.get(), "scan accepted");
            Ok(ScanStep::Accepted {
                serial,
                accumulated,
                target: target.get(),
            })
        } else {
            self.state = ScanState::Complete;
            tracing::info!(session_id = %self.id, serial = %serial, target = target.get(), "scan session complete");
            Ok(ScanStep::Completed {
                serial,
                target: target.get(),
            })
        }
    }

    /// Discard the pending read and scan again.
    pub fn retry(&mut self) -> Result<SerialNumber, ScanError> {
        let ScanState::PendingConfirmation(serial) = &self.state else {
            return Err(self.invalid_state("pending confirmation"));
        };
        let serial = serial.clone();
        self.state = ScanState::AwaitingDecode;
        self.keep_reading();
        tracing::debug!(session_id = %self.id, serial = %serial, "pending scan retried");
        Ok(serial)
    }

    /// Close the dialog and hand back the accumulated serials.
    ///
    /// Refused (state unchanged) unless the target count was reached.
    pub fn finalize(&mut self) -> Result<Vec<SerialNumber>, ScanError> {
        if self.state != ScanState::Complete {
            return Err(ScanError::Incomplete {
                accumulated: self.accumulated.len(),
                target: self.target.map(|t| t.get()).unwrap_or(0),
            });
        }
        let serials = std::mem::take(&mut self.accumulated);
        self.close();
        tracing::info!(session_id = %self.id, count = serials.len(), "scan session finalized");
        Ok(serials)
    }

    /// Close the dialog, discarding every accumulated read. Returns how many
    /// reads were discarded.
    pub fn cancel(&mut self) -> usize {
        let discarded = self.accumulated.len();
        self.accumulated.clear();
        if self.state != ScanState::Idle {
            tracing::info!(session_id = %self.id, discarded, "scan session cancelled");
        }
        self.close();
        discarded
    }

    fn close(&mut self) {
        self.decoder.release();
        self.target = None;
        self.state = ScanState::Idle;
    }

    fn check_candidate<M>(&self, serial: &SerialNumber, committed: &M) -> Result<(), ScanError>
    where
        M: Membership + ?Sized,
    {
        if self.accumulated.contains(serial) || committed.contains_serial(serial) {
            return Err(ScanError::Duplicate(serial.clone()));
        }
        if !self.policy.permits(serial) {
            return Err(ScanError::NotEligible(serial.clone()));
        }
        Ok(())
    }

    fn keep_reading(&mut self) {
        if let Err(err) = self.decoder.resume() {
            tracing::warn!(session_id = %self.id, error = %err, "failed to resume decoder");
        }
    }

    fn expect_state(&self, ok: bool, expected: &'static str) -> Result<(), ScanError> {
        if ok {
            Ok(())
        } else {
            Err(self.invalid_state(expected))
        }
    }

    fn invalid_state(&self, expected: &'static str) -> ScanError {
        ScanError::InvalidState {
            expected,
            actual: self.state.name(),
        }
    }
}

//! Decoder capability and its scoped lease.

use thiserror::Error;

/// One read delivered by a decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// A code was read successfully; the payload is the raw decoded text.
    Decoded(String),
    /// The decoder failed to read a frame. Advisory only.
    Failed(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("decoder unavailable: {0}")]
    Unavailable(String),
}

/// A code reader that emits [`DecodeEvent`]s while active.
///
/// Implementations must not deliver events while deactivated. Events that
/// were produced while inactive are discarded rather than replayed.
pub trait DecodeSource {
    fn activate(&mut self) -> Result<(), DecodeError>;

    fn deactivate(&mut self);

    fn is_active(&self) -> bool;

    /// Next pending event, without blocking.
    fn next_event(&mut self) -> Option<DecodeEvent>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LeaseState {
    Released,
    Active,
    Paused,
}

/// Owned decoder with acquire/release pairing.
///
/// Every exit path deactivates the decoder: explicit [`release`](Self::release)
/// and `Drop` both do.
#[derive(Debug)]
pub struct DecoderLease<D: DecodeSource> {
    source: D,
    state: LeaseState,
}

impl<D: DecodeSource> DecoderLease<D> {
    pub fn new(source: D) -> Self {
        Self {
            source,
            state: LeaseState::Released,
        }
    }

    pub fn state(&self) -> LeaseState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == LeaseState::Active
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut D {
        &mut self.source
    }

    /// Activate the decoder. Acquiring an already-acquired lease resumes it.
    pub fn acquire(&mut self) -> Result<(), DecodeError> {
        if self.state == LeaseState::Active {
            return Ok(());
        }
        self.source.activate()?;
        self.state = LeaseState::Active;
        tracing::debug!("decoder acquired");
        Ok(())
    }

    /// Stop reads while keeping the lease.
    pub fn pause(&mut self) {
        if self.state == LeaseState::Active {
            self.source.deactivate();
            self.state = LeaseState::Paused;
            tracing::debug!("decoder paused");
        }
    }

    pub fn resume(&mut self) -> Result<(), DecodeError> {
        match self.state {
            LeaseState::Paused => {
                self.source.activate()?;
                self.state = LeaseState::Active;
                tracing::debug!("decoder resumed");
                Ok(())
            }
            LeaseState::Active => Ok(()),
            LeaseState::Released => Err(DecodeError::Unavailable(
                "decoder lease was released".to_string(),
            )),
        }
    }

    pub fn release(&mut self) {
        if self.state == LeaseState::Active {
            self.source.deactivate();
        }
        if self.state != LeaseState::Released {
            tracing::debug!("decoder released");
        }
        self.state = LeaseState::Released;
    }

    /// Next event, only while active.
    pub fn next_event(&mut self) -> Option<DecodeEvent> {
        if self.state != LeaseState::Active {
            return None;
        }
        self.source.next_event()
    }
}

impl<D: DecodeSource> Drop for DecoderLease<D> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Probe {
        active: bool,
        activations: u32,
        deactivations: u32,
    }

    #[derive(Debug, Clone, Default)]
    struct ProbeSource(Rc<RefCell<Probe>>);

    impl DecodeSource for ProbeSource {
        fn activate(&mut self) -> Result<(), DecodeError> {
            let mut p = self.0.borrow_mut();
            p.active = true;
            p.activations += 1;
            Ok(())
        }

        fn deactivate(&mut self) {
            let mut p = self.0.borrow_mut();
            p.active = false;
            p.deactivations += 1;
        }

        fn is_active(&self) -> bool {
            self.0.borrow().active
        }

        fn next_event(&mut self) -> Option<DecodeEvent> {
            Some(DecodeEvent::Decoded("X".to_string()))
        }
    }

    #[test]
    fn drop_releases_an_active_decoder() {
        let probe = ProbeSource::default();
        {
            let mut lease = DecoderLease::new(probe.clone());
            lease.acquire().unwrap();
            assert!(probe.0.borrow().active);
        }
        assert!(!probe.0.borrow().active);
        assert_eq!(probe.0.borrow().deactivations, 1);
    }

    #[test]
    fn paused_lease_delivers_nothing() {
        let probe = ProbeSource::default();
        let mut lease = DecoderLease::new(probe.clone());
        assert_eq!(lease.next_event(), None);

        lease.acquire().unwrap();
        assert!(lease.next_event().is_some());

        lease.pause();
        assert_eq!(lease.state(), LeaseState::Paused);
        assert_eq!(lease.next_event(), None);

        lease.resume().unwrap();
        assert!(lease.next_event().is_some());
        assert_eq!(probe.0.borrow().activations, 2);
    }

    #[test]
    fn release_after_pause_does_not_deactivate_twice() {
        let probe = ProbeSource::default();
        let mut lease = DecoderLease::new(probe.clone());
        lease.acquire().unwrap();
        lease.pause();
        lease.release();
        drop(lease);
        assert_eq!(probe.0.borrow().deactivations, 1);
    }

    #[test]
    fn resume_after_release_is_an_error() {
        let mut lease = DecoderLease::new(ProbeSource::default());
        assert!(lease.resume().is_err());
    }
}

//! Channel-backed decode source.
//!
//! The decoder (camera thread, console line reader, test script) pushes
//! events through a [`DecodeSender`]; the scan session polls them through
//! [`DecodeSource::next_event`].

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::decode::{DecodeError, DecodeEvent, DecodeSource};

/// Producer side of a [`ChannelDecodeSource`].
#[derive(Debug, Clone)]
pub struct DecodeSender {
    tx: Sender<DecodeEvent>,
}

impl DecodeSender {
    /// Push a decoded payload. Returns `false` once the source is gone.
    pub fn decoded(&self, text: impl Into<String>) -> bool {
        self.tx.send(DecodeEvent::Decoded(text.into())).is_ok()
    }

    pub fn failed(&self, message: impl Into<String>) -> bool {
        self.tx.send(DecodeEvent::Failed(message.into())).is_ok()
    }
}

#[derive(Debug)]
pub struct ChannelDecodeSource {
    rx: Receiver<DecodeEvent>,
    active: bool,
    disconnected: bool,
}

impl ChannelDecodeSource {
    pub fn new() -> (Self, DecodeSender) {
        let (tx, rx) = mpsc::channel();
        let source = Self {
            rx,
            active: false,
            disconnected: false,
        };
        (source, DecodeSender { tx })
    }

    /// Discard everything queued so far.
    fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(_) => continue,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
    }
}

impl DecodeSource for ChannelDecodeSource {
    fn activate(&mut self) -> Result<(), DecodeError> {
        self.drain();
        if self.disconnected {
            return Err(DecodeError::Unavailable("decoder channel closed".to_string()));
        }
        self.active = true;
        Ok(())
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn next_event(&mut self) -> Option<DecodeEvent> {
        if !self.active {
            self.drain();
            return None;
        }
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }
}

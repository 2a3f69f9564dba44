//! `cylinder-scanning`: turning decoder reads into a confirmed, de-duplicated
//! set of serial numbers.
//!
//! - [`DecodeSource`]: the camera/keyboard decoder capability
//! - [`DecoderLease`]: scoped ownership of an active decoder
//! - [`ScanSession`]: one-at-a-time confirmation state machine

pub mod decode;
pub mod session;
pub mod source;

pub use decode::{DecodeError, DecodeEvent, DecodeSource, DecoderLease, LeaseState};
pub use session::{Membership, ScanError, ScanPolicy, ScanSession, ScanState, ScanStep};
pub use source::{ChannelDecodeSource, DecodeSender};

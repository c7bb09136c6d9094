//! Non-blocking Modbus RTU master engine for `no_std` targets.
//!
//! The crate covers the frame protocol only: CRC-16, RTU byte framing and a
//! polled request/response state machine with per-handle buffers. The byte
//! transport and the tick source are capability traits implemented by the
//! application ([`Transport`], [`Clock`]); receive completion crosses from
//! interrupt context through an ordered [`RxLatch`].

#![cfg_attr(not(test), no_std)]

mod bus;
mod crc;
mod error;
mod frame;
mod function;
mod latch;
mod transport;

pub use bus::*;
pub use crc::crc16;
pub use error::*;
pub use frame::*;
pub use function::*;
pub use latch::*;
pub use transport::*;

//! Interrupt-to-thread handoff for received frames.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

const IDLE: u8 = 0;
const ARMED: u8 = 1;
const FILLING: u8 = 2;
const READY: u8 = 3;

/// Receive buffer fused with its completion indicator.
///
/// The interrupt side stores bytes through `&self` ([`feed_byte`],
/// [`write_frame`]); the control side arms, reads and releases. The `Ready`
/// state is published with `Release` ordering after the last buffer write
/// and observed with `Acquire`, so the control side can never see the
/// indicator set while the buffer is only partially written.
///
/// Each [`arm`] accepts exactly one completion. Bytes arriving outside an
/// armed receive are discarded, and a completion racing with [`disarm`]
/// loses the final state transition, so a late frame can neither surface
/// after a timeout nor corrupt the next transaction's fill.
///
/// [`arm`]: RxLatch::arm
/// [`disarm`]: RxLatch::disarm
/// [`feed_byte`]: RxLatch::feed_byte
/// [`write_frame`]: RxLatch::write_frame
pub struct RxLatch<const N: usize> {
    state: AtomicU8,
    expected: AtomicUsize,
    filled: AtomicUsize,
    buf: UnsafeCell<[u8; N]>,
}

// State protocol: the interrupt side writes `buf` only in Armed/Filling,
// the control side reads it only in Ready.
unsafe impl<const N: usize> Sync for RxLatch<N> {}

impl<const N: usize> RxLatch<N> {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            expected: AtomicUsize::new(0),
            filled: AtomicUsize::new(0),
            buf: UnsafeCell::new([0; N]),
        }
    }

    /// Accept exactly one frame of `expected` bytes (clamped to capacity).
    ///
    /// Control side; must not be called while a receive is in flight.
    pub fn arm(&self, expected: usize) {
        self.expected.store(expected.min(N), Ordering::Relaxed);
        self.filled.store(0, Ordering::Relaxed);
        self.state.store(ARMED, Ordering::Release);
    }

    /// Drop an in-flight receive, e.g. on timeout.
    pub fn disarm(&self) {
        self.state.store(IDLE, Ordering::Release);
    }

    /// Interrupt side: store one received byte.
    ///
    /// Returns `false` if the byte was discarded (no receive armed, frame
    /// already complete, or byte count exhausted).
    pub fn feed_byte(&self, byte: u8) -> bool {
        match self.state.load(Ordering::Acquire) {
            ARMED => {
                if self
                    .state
                    .compare_exchange(ARMED, FILLING, Ordering::AcqRel, Ordering::Relaxed)
                    .is_err()
                {
                    return false;
                }
            }
            FILLING => {}
            _ => return false,
        }

        let expected = self.expected.load(Ordering::Relaxed);
        let filled = self.filled.load(Ordering::Relaxed);
        if filled >= expected {
            return false;
        }
        unsafe {
            (*self.buf.get())[filled] = byte;
        }
        self.filled.store(filled + 1, Ordering::Relaxed);

        if filled + 1 == expected {
            // Publishes the buffer; fails if a disarm won the race, in which
            // case the frame is dropped.
            self.state
                .compare_exchange(FILLING, READY, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
        } else {
            true
        }
    }

    /// Interrupt side: store a complete frame at once (DMA completion).
    ///
    /// The length must match the armed byte count exactly; a mismatched
    /// frame consumes the arm and the transaction is left to time out.
    pub fn write_frame(&self, frame: &[u8]) -> bool {
        if self
            .state
            .compare_exchange(ARMED, FILLING, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }
        if frame.len() != self.expected.load(Ordering::Relaxed) {
            self.state.store(IDLE, Ordering::Release);
            return false;
        }

        unsafe {
            (&mut (*self.buf.get()))[..frame.len()].copy_from_slice(frame);
        }
        self.filled.store(frame.len(), Ordering::Relaxed);
        self.state
            .compare_exchange(FILLING, READY, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    /// Control side: has a complete frame been published?
    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == READY
    }

    /// Read the completed frame under a controlled borrow.
    ///
    /// Returns `None` unless a frame is ready. The slice never escapes the
    /// closure, so it cannot alias a later interrupt write; the latch stays
    /// ready until [`release`](RxLatch::release).
    pub fn with_frame<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        if self.state.load(Ordering::Acquire) != READY {
            return None;
        }
        let filled = self.filled.load(Ordering::Relaxed);
        // Writers only touch the buffer in Armed/Filling, and only the
        // control side can leave Ready.
        let frame = unsafe { &(&(*self.buf.get()))[..filled] };
        Some(f(frame))
    }

    /// Consume the completed frame and return to idle.
    pub fn release(&self) {
        self.state.store(IDLE, Ordering::Release);
    }
}

impl<const N: usize> Default for RxLatch<N> {
    fn default() -> Self {
        Self::new()
    }
}

use core::fmt::Debug;

use fugit::TimerInstantU64;

/// Byte transport driving one half-duplex bus.
///
/// A handle owns its transport exclusively; two handles must never share
/// one. RS-485 direction control and the choice between blocking and
/// queued transmission are the implementation's business.
pub trait Transport {
    type Error: Debug;

    /// Transmit a fully encoded frame.
    fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Turn the bus around and start an asynchronous, byte-count-bounded
    /// receive. The implementation's interrupt handler feeds the handle's
    /// [`RxLatch`](crate::RxLatch) until `expected` bytes have arrived.
    fn begin_receive(&mut self, expected: usize);

    /// Tear down an armed receive; bytes arriving afterwards are noise.
    fn end_receive(&mut self);
}

/// Monotonic tick source used for timeout measurement.
pub trait Clock<const FREQ_HZ: u32> {
    fn now(&self) -> TimerInstantU64<FREQ_HZ>;
}

// A tick source may be shared between handles on different buses.
impl<C, const FREQ_HZ: u32> Clock<FREQ_HZ> for &C
where
    C: Clock<FREQ_HZ>,
{
    fn now(&self) -> TimerInstantU64<FREQ_HZ> {
        (**self).now()
    }
}

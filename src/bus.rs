//! Bus handle and the request/response transaction state machine.

use fugit::{TimerDurationU64, TimerInstantU64};
use heapless::Vec;
use log::{trace, warn};

use crate::{
    encode_frame, validate_frame, Clock, Error, FunctionCode, RxLatch, Transport, FRAME_OVERHEAD,
    MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};

/// Default response window, suitable for 9600-115200 baud deployments.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 100;

/// Response payload, copied out of the receive buffer so the buffer is free
/// for the next transaction the moment `poll` returns.
pub type Response = Vec<u8, MAX_PAYLOAD_SIZE>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState<const FREQ_HZ: u32> {
    Idle,
    AwaitingResponse { deadline: TimerInstantU64<FREQ_HZ> },
}

/// One endpoint of a Modbus RTU bus, talking to the device `slave_id`.
///
/// The handle owns its transmit buffer and receive latch exclusively, so
/// any number of handles (one per bus) can run transactions concurrently
/// without interfering. At most one transaction is in flight per handle.
///
/// Nothing here blocks: [`submit`](BusHandle::submit) and
/// [`poll`](BusHandle::poll) return immediately and the caller polls on its
/// own schedule until a terminal outcome is reported.
pub struct BusHandle<T, C, const FREQ_HZ: u32> {
    transport: T,
    clock: C,
    slave_id: u8,
    timeout: TimerDurationU64<FREQ_HZ>,
    tx_buf: [u8; MAX_FRAME_SIZE],
    rx: RxLatch<MAX_FRAME_SIZE>,
    state: TransactionState<FREQ_HZ>,
}

impl<T, C, const FREQ_HZ: u32> BusHandle<T, C, FREQ_HZ>
where
    T: Transport,
    C: Clock<FREQ_HZ>,
{
    /// Bind a transport and a tick source to the device at `slave_id`
    /// (1-247 for unicast).
    pub fn new(transport: T, clock: C, slave_id: u8) -> Self {
        Self {
            transport,
            clock,
            slave_id,
            timeout: TimerDurationU64::<FREQ_HZ>::millis(DEFAULT_RESPONSE_TIMEOUT_MS),
            tx_buf: [0; MAX_FRAME_SIZE],
            rx: RxLatch::new(),
            state: TransactionState::Idle,
        }
    }

    /// Start one request/response transaction.
    ///
    /// `response_payload_len` is the payload size of the expected response;
    /// the receive is armed for exactly that many bytes plus the frame
    /// overhead.
    ///
    /// Errors: `WouldBlock` while a transaction is in flight (the in-flight
    /// transaction is untouched), [`Error::InvalidFrame`] for an oversized
    /// request or expected response, [`Error::TxFailed`] if the transport
    /// rejects the frame (the handle stays idle, nothing was armed).
    pub fn submit(
        &mut self,
        function: FunctionCode,
        payload: &[u8],
        response_payload_len: usize,
    ) -> nb::Result<(), Error> {
        if self.state != TransactionState::Idle {
            return Err(nb::Error::WouldBlock);
        }
        if response_payload_len > MAX_PAYLOAD_SIZE {
            return Err(nb::Error::Other(Error::InvalidFrame));
        }

        let len = encode_frame(self.slave_id, function, payload, &mut self.tx_buf)
            .map_err(nb::Error::Other)?;
        if let Err(err) = self.transport.send(&self.tx_buf[..len]) {
            warn!("transmit to device {} failed: {:?}", self.slave_id, err);
            return Err(nb::Error::Other(Error::TxFailed));
        }

        let expected = response_payload_len + FRAME_OVERHEAD;
        // Arm the latch before the transport so no early byte is lost.
        self.rx.arm(expected);
        self.transport.begin_receive(expected);

        // Deadline is taken fresh here; a tick count left over from a
        // previous transaction can never trigger on this one.
        let deadline = self.clock.now() + self.timeout;
        self.state = TransactionState::AwaitingResponse { deadline };
        trace!(
            "{:?} sent to device {}, awaiting {} bytes",
            function,
            self.slave_id,
            expected
        );
        Ok(())
    }

    /// Check the in-flight transaction without blocking.
    ///
    /// Returns the validated response payload, `WouldBlock` while the
    /// response is still pending (or when nothing is in flight), or the
    /// terminal error. Every terminal outcome returns the handle to idle
    /// before this call returns.
    pub fn poll(&mut self) -> nb::Result<Response, Error> {
        let TransactionState::AwaitingResponse { deadline } = self.state else {
            return Err(nb::Error::WouldBlock);
        };

        if self.rx.is_ready() {
            let slave_id = self.slave_id;
            let outcome = self
                .rx
                .with_frame(|frame| {
                    let payload = validate_frame(frame, slave_id)?;
                    Response::from_slice(payload).map_err(|_| Error::InvalidFrame)
                })
                .unwrap_or(Err(Error::InvalidFrame));
            self.rx.release();
            self.transport.end_receive();
            self.state = TransactionState::Idle;

            match &outcome {
                Ok(payload) => {
                    trace!("transaction complete, {} payload bytes", payload.len())
                }
                Err(err) => warn!("response from device {} rejected: {}", slave_id, err),
            }
            outcome.map_err(nb::Error::Other)
        } else if self.clock.now() > deadline {
            // Orphan any late completion: the latch refuses it and the next
            // submit starts over with a fresh arm.
            self.rx.disarm();
            self.transport.end_receive();
            self.state = TransactionState::Idle;
            warn!("device {} response timeout", self.slave_id);
            Err(nb::Error::Other(Error::RxTimeout))
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// No transaction in flight; `submit` will be accepted.
    pub fn is_idle(&self) -> bool {
        self.state == TransactionState::Idle
    }

    /// Address of the peer device this handle talks to.
    pub fn slave_id(&self) -> u8 {
        self.slave_id
    }

    /// Receive side of the handle, for wiring into the transport's receive
    /// interrupt.
    pub fn rx(&self) -> &RxLatch<MAX_FRAME_SIZE> {
        &self.rx
    }

    pub fn timeout(&self) -> TimerDurationU64<FREQ_HZ> {
        self.timeout
    }

    /// Response window for subsequent transactions; pick per deployment,
    /// typically 50-200 ms depending on baud rate.
    pub fn set_timeout(&mut self, timeout: TimerDurationU64<FREQ_HZ>) {
        self.timeout = timeout;
    }

    /// Deconstruct the handle back into its transport and clock.
    pub fn free(self) -> (T, C) {
        (self.transport, self.clock)
    }
}

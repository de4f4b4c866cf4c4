//! Device-orientation collaborator contract.
//!
//! The platform exposes three things: whether motion access is gated, an
//! asynchronous permission request, and a subscription delivering raw
//! orientation readings. Subscriptions are scoped by a [`CancellationToken`];
//! dropping a [`SensorSubscription`] cancels it, so no listener can outlive
//! the controller that opened it.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use tokio::sync::oneshot;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("orientation sensor unavailable on this device")]
    Unavailable,
    #[error("permission request failed: {0}")]
    Platform(String),
    #[error("permission request abandoned before resolving")]
    Abandoned,
}

/// One raw device reading in degrees. Browsers and drivers report `None` for
/// axes they cannot measure.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawOrientation {
    pub alpha: Option<f32>,
    pub beta: Option<f32>,
    pub gamma: Option<f32>,
}

impl RawOrientation {
    pub fn new(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
        }
    }

    /// `None` when any axis is missing or not finite.
    pub fn validate(self) -> Option<OrientationSample> {
        let (alpha, beta, gamma) = (self.alpha?, self.beta?, self.gamma?);
        if !(alpha.is_finite() && beta.is_finite() && gamma.is_finite()) {
            return None;
        }
        Some(OrientationSample { alpha, beta, gamma })
    }
}

/// A complete orientation reading in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    Denied,
}

pub type PermissionRequest = Pin<Box<dyn Future<Output = Result<PermissionOutcome, SensorError>>>>;

pub trait OrientationSensor {
    /// Whether access must be requested by an explicit user action first.
    fn requires_permission(&self) -> bool;

    fn request_permission(&mut self) -> PermissionRequest;

    /// Starts delivering readings until `token` is cancelled or the receiver is dropped.
    fn subscribe(&mut self, token: CancellationToken) -> Result<Receiver<RawOrientation>, SensorError>;
}

/// Shared cancellation flag. Cloning creates another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Readings pulled off a subscription during one frame.
#[derive(Debug, Default)]
pub struct Drained {
    pub readings: Vec<RawOrientation>,
    pub disconnected: bool,
}

/// Live sensor subscription. Cancels its token on drop.
pub struct SensorSubscription {
    token: CancellationToken,
    readings: Receiver<RawOrientation>,
}

impl SensorSubscription {
    pub fn open(sensor: &mut dyn OrientationSensor) -> Result<Self, SensorError> {
        let token = CancellationToken::new();
        let readings = sensor.subscribe(token.clone())?;
        Ok(Self { token, readings })
    }

    pub fn drain(&mut self) -> Drained {
        let mut drained = Drained::default();
        loop {
            match self.readings.try_recv() {
                Ok(reading) => drained.readings.push(reading),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    drained.disconnected = true;
                    break;
                }
            }
        }
        drained
    }
}

impl Drop for SensorSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Resolving half of [`permission_channel`]. Dropping it unresolved abandons the request.
pub struct PermissionResolver {
    reply: oneshot::Sender<Result<PermissionOutcome, SensorError>>,
}

impl PermissionResolver {
    pub fn resolve(self, outcome: Result<PermissionOutcome, SensorError>) {
        if self.reply.send(outcome).is_err() {
            log::debug!("permission outcome arrived after the request was dropped");
        }
    }
}

/// Pairs a platform callback with a [`PermissionRequest`].
pub fn permission_channel() -> (PermissionResolver, PermissionRequest) {
    let (reply, outcome) = oneshot::channel();
    let request: PermissionRequest = Box::pin(async move {
        outcome.await.map_err(|_| SensorError::Abandoned)?
    });
    (PermissionResolver { reply }, request)
}

/// Poll a request once from the frame loop; `None` while still pending.
pub fn poll_permission(
    request: &mut PermissionRequest,
) -> Option<Result<PermissionOutcome, SensorError>> {
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    match request.as_mut().poll(&mut cx) {
        Poll::Ready(outcome) => Some(outcome),
        Poll::Pending => None,
    }
}

fn noop_waker() -> Waker {
    fn noop(_: *const ()) {}
    fn clone(p: *const ()) -> RawWaker {
        RawWaker::new(p, &VTABLE)
    }
    static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
    // SAFETY: every vtable entry ignores the data pointer.
    unsafe { Waker::from_raw(RawWaker::new(std::ptr::null(), &VTABLE)) }
}

/// Sensor for hosts with no motion hardware: no gate, but subscribing fails.
#[derive(Debug, Default)]
pub struct UnavailableSensor;

impl OrientationSensor for UnavailableSensor {
    fn requires_permission(&self) -> bool {
        false
    }

    fn request_permission(&mut self) -> PermissionRequest {
        Box::pin(std::future::ready(Ok(PermissionOutcome::Granted)))
    }

    fn subscribe(
        &mut self,
        _token: CancellationToken,
    ) -> Result<Receiver<RawOrientation>, SensorError> {
        Err(SensorError::Unavailable)
    }
}

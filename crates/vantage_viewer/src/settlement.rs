//! # Camera Settlements
//!
//! One-shot outcome of a camera operation. The viewer keeps the
//! [`Settler`]; the caller gets a [`CameraSettlement`] to poll or await.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::CameraError;

/// Successful settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraOutcome {
    /// The camera reached the target.
    Completed,
    /// A newer operation had already moved the camera.
    Superseded,
}

/// Final result of a camera operation.
pub type SettlementResult = Result<CameraOutcome, CameraError>;

/// Settling half. Clones share the same slot; only the first settle wins.
#[derive(Clone, Debug)]
pub struct Settler {
    sender: Arc<Mutex<Option<oneshot::Sender<SettlementResult>>>>,
}

impl Settler {
    /// Delivers `result`. Returns `false` if already settled.
    pub fn settle(&self, result: SettlementResult) -> bool {
        match self.sender.lock().take() {
            Some(sender) => {
                // Receiver may already be gone; nobody is waiting then
                let _ = sender.send(result);
                true
            }
            None => false,
        }
    }

    /// True once `settle` has been called.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.sender.lock().is_none()
    }
}

/// Receiving half, returned from `zoom_to` and `fly_to`.
#[derive(Debug)]
#[must_use = "a settlement reports whether the camera move happened"]
pub struct CameraSettlement {
    receiver: oneshot::Receiver<SettlementResult>,
    result: Option<SettlementResult>,
}

impl CameraSettlement {
    /// Creates a connected settler/settlement pair.
    pub fn channel() -> (Settler, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            Settler {
                sender: Arc::new(Mutex::new(Some(sender))),
            },
            Self {
                receiver,
                result: None,
            },
        )
    }

    /// A settlement that is already resolved.
    pub fn settled(result: SettlementResult) -> Self {
        let (_, receiver) = oneshot::channel();
        Self {
            receiver,
            result: Some(result),
        }
    }

    /// Result if settled, without blocking.
    ///
    /// A settler dropped without settling reads as [`CameraError::Abandoned`].
    pub fn try_result(&mut self) -> Option<SettlementResult> {
        if self.result.is_none() {
            match self.receiver.try_recv() {
                Ok(result) => self.result = Some(result),
                Err(TryRecvError::Closed) => self.result = Some(Err(CameraError::Abandoned)),
                Err(TryRecvError::Empty) => {}
            }
        }
        self.result
    }
}

impl Future for CameraSettlement {
    type Output = SettlementResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(result) = self.result {
            return Poll::Ready(result);
        }
        let result = match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => result,
            Poll::Ready(Err(_)) => Err(CameraError::Abandoned),
            Poll::Pending => return Poll::Pending,
        };
        self.result = Some(result);
        Poll::Ready(result)
    }
}

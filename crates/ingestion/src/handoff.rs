//! Channel handoff with drop accounting

use async_channel::{Receiver, Sender, TrySendError};
use contracts::DropPolicy;
use tracing::{trace, warn};

/// Outcome of a non-blocking handoff attempt
///
/// `SentAfterEvict` means the item got through but the oldest queued item
/// was evicted to make room, so one item was still lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ForwardOutcome {
    Sent,
    SentAfterEvict,
    DroppedFull,
    Closed,
}

/// Forward one item, never blocking the capture callback
///
/// `evict_rx` is a handle on the same channel used to pop the head under
/// `DropOldest`; without it a full queue degrades to dropping the incoming
/// item.
#[inline]
pub(crate) fn forward_item<T>(
    tx: &Sender<T>,
    evict_rx: Option<&Receiver<T>>,
    item: T,
    source_id: &str,
    policy: DropPolicy,
) -> ForwardOutcome {
    match tx.try_send(item) {
        Ok(_) => {
            trace!(source_id = %source_id, "item forwarded");
            ForwardOutcome::Sent
        }
        Err(TrySendError::Full(item)) => {
            if let (DropPolicy::DropOldest, Some(rx)) = (policy, evict_rx) {
                // pop the head to admit the incoming item; a racing consumer
                // may have freed a slot already, so a miss here is fine
                let _ = rx.try_recv();
                if tx.try_send(item).is_ok() {
                    trace!(source_id = %source_id, "oldest item evicted");
                    return ForwardOutcome::SentAfterEvict;
                }
            }
            trace!(source_id = %source_id, "item dropped (newest)");
            ForwardOutcome::DroppedFull
        }
        Err(TrySendError::Closed(_)) => {
            warn!(source_id = %source_id, "channel closed");
            ForwardOutcome::Closed
        }
    }
}

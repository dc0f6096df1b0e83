//! Point buffer between the tailing reader (producer) and the display (consumer).
//!
//! Appends go to a FIFO behind a mutex. Only the append that finds the FIFO
//! empty schedules a flush, so at most one flush is pending at any time and a
//! burst of points is delivered as one batch. Session events ([`Ingest::Restart`],
//! [`Ingest::Fields`]) travel through the same FIFO so they stay ordered with
//! respect to the points around them.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::data::field::Field;
use crate::data::point::Point;

/// One item handed from the producer to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum Ingest {
    /// The source restarted; everything before this belongs to the old session.
    Restart,
    /// The field set of the current session became known.
    Fields(Vec<Field>),
    Point(Point),
}

/// Arranges for [`Flusher::flush`](crate::flush::Flusher::flush) to run on the
/// consumer's execution context.
pub trait FlushScheduler: Send + Sync {
    fn schedule_flush(&self);
}

/// A consumer thread blocking on the receiving end flushes once per message.
impl FlushScheduler for Sender<()> {
    fn schedule_flush(&self) {
        // A closed receiver means the consumer is gone; nothing left to wake.
        let _ = self.send(());
    }
}

/// Shared FIFO with coalesced flush scheduling. Cloning shares the FIFO.
#[derive(Clone)]
pub struct PointBuffer {
    queue: Arc<Mutex<Vec<Ingest>>>,
    scheduler: Arc<dyn FlushScheduler>,
}

impl PointBuffer {
    pub fn new(scheduler: Arc<dyn FlushScheduler>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(Vec::new())),
            scheduler,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Ingest>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append to the tail of the FIFO. Returns `true` if this append scheduled
    /// a flush (the FIFO was empty before it).
    pub fn append(&self, item: Ingest) -> bool {
        let was_empty = {
            let mut queue = self.lock();
            let was_empty = queue.is_empty();
            queue.push(item);
            was_empty
        };
        if was_empty {
            self.scheduler.schedule_flush();
        }
        was_empty
    }

    pub fn append_point(&self, point: Point) -> bool {
        self.append(Ingest::Point(point))
    }

    /// Swap out everything appended so far, in arrival order.
    pub fn take_batch(&self) -> Vec<Ingest> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

//! Deferred contact events
//!
//! The physics engine reports contacts while a step is in progress and the
//! world is still borrowed by the pipeline. Events are queued here and
//! replayed to body observers once the step has completed.
//!
//! # Example
//!
//! ```ignore
//! // During the step (engine callback)
//! queue.push(ContactEvent::Begin { body: a, other: b });
//!
//! // After the step
//! for event in queue.drain() {
//!     relay(event);
//! }
//! ```

use std::collections::VecDeque;

use super::body::BodyHandle;

/// A contact change between two bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    /// `body` started touching `other`
    Begin {
        /// First body of the pair
        body: BodyHandle,
        /// Second body of the pair
        other: BodyHandle,
    },
    /// `body` stopped touching `other`
    End {
        /// First body of the pair
        body: BodyHandle,
        /// Second body of the pair
        other: BodyHandle,
    },
}

impl ContactEvent {
    /// Both bodies of the pair
    #[must_use]
    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        match *self {
            Self::Begin { body, other } | Self::End { body, other } => (body, other),
        }
    }
}

/// FIFO of contact events awaiting relay
#[derive(Debug, Default)]
pub struct ContactQueue {
    events: VecDeque<ContactEvent>,
}

impl ContactQueue {
    /// Default initial capacity
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new queue with default capacity
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    /// Queue an event for relay after the step
    #[inline]
    pub fn push(&mut self, event: ContactEvent) {
        self.events.push_back(event);
    }

    /// Take every queued event in arrival order
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = ContactEvent> + '_ {
        self.events.drain(..)
    }

    /// Check if nothing is queued
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of queued events
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Drop every queued event
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fire-and-forget notification hooks.
//!
//! Handlers enqueue an event after every successful booking state
//! change. Delivery is someone else's problem: implementations must
//! never fail the operation that produced the event.

/// A booking state change worth telling the outside world about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A booking was created.
    BookingCreated {
        /// The new booking.
        booking_id: i64,
    },
    /// A booking was cancelled.
    BookingCancelled {
        /// The cancelled booking.
        booking_id: i64,
    },
    /// A booking was moved, in place or by replacement.
    BookingRescheduled {
        /// The booking that now holds the time.
        booking_id: i64,
    },
}

/// Outbound notification sink.
///
/// `enqueue` is infallible by contract; an implementation that can
/// fail must swallow and log its own errors.
pub trait NotificationQueue {
    /// Hands an event to the sink.
    fn enqueue(&self, event: NotificationEvent);
}

/// A sink that drops every event. Used in tests and anywhere
/// notifications are not wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl NotificationQueue for NullNotifier {
    fn enqueue(&self, _event: NotificationEvent) {}
}

//! Change notification and background refresh.
//!
//! Subscribers hear about every publication that changed an effective value;
//! the poller drives reloads of hot-reloadable sources on an interval.

pub mod poller;
pub mod subscriber;

pub use poller::PollerHandle;
pub use subscriber::{SubscriberRegistry, SubscriptionHandle};

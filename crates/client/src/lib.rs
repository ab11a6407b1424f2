//! Read-side client for Divvy groups.
//!
//! Wraps the HTTP API behind [`GroupDataSource`], caches exchange rates
//! and member profiles, fans change events out to page subscribers, and
//! shapes everything the pages render through [`views`].

pub use error::{ClientError, Result};
pub use profile::{Profile, ProfileCache};
pub use providers::{GroupDataSource, HttpGroupSource, InMemorySource};
pub use rates::{HttpRateSource, RateCache, RateSource};
pub use subscriptions::{ChangeFeed, GroupEvent, SubscriptionToken};

pub mod config;
mod error;
mod profile;
mod providers;
mod rates;
mod subscriptions;
pub mod views;

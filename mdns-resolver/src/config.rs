//! Configuration for mDNS address lookups.
//!
//! This module provides the [`ResolverConfig`] struct, which bounds how long
//! a lookup waits, how often it re-sends its query and how much of a reply it
//! is willing to look at.
//!
//! # Examples
//!
//! ```rust
//! use mdns_resolver::ResolverConfig;
//! use std::time::Duration;
//!
//! // Wait 5 ticks of 200ms per attempt, re-send at most 3 times.
//! let config = ResolverConfig::default()
//!     .with_wait_ticks(5)
//!     .with_max_retries(3)
//!     .with_tick_interval(Duration::from_millis(200));
//! ```

use std::time::Duration;

/// Default number of ticks to wait for a reply before re-sending the query.
pub const DEFAULT_WAIT_TICKS: u32 = 3;

/// Default number of re-sends after the initial query.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default size of the receive buffer. Datagrams beyond it are truncated.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;

/// Maximum length of a domain name on the wire (RFC 1035 section 3.1).
pub const MAX_DOMAIN_NAME: usize = 255;

/// Default upper bound on a decoded dotted name.
///
/// Leaves headroom over [`MAX_DOMAIN_NAME`] for names gathered through
/// compression pointers.
pub const DEFAULT_MAX_NAME_LEN: usize = MAX_DOMAIN_NAME + MAX_DOMAIN_NAME / 2;

/// Default real-time length of one tick (1 second).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for a [`Session`](crate::Session) or
/// [`Resolver`](crate::Resolver).
///
/// A lookup sends one query and then re-sends it each time `wait_ticks`
/// ticks pass without a usable reply. After `max_retries` re-sends the
/// next expiry ends the lookup with a timeout, so at most
/// `max_retries + 1` queries go out and the lookup lasts about
/// `(max_retries + 1) * wait_ticks` ticks.
///
/// # Fields
///
/// - `wait_ticks`: Ticks to wait for each attempt (default: 3)
/// - `max_retries`: Re-sends after the first query (default: 2)
/// - `max_message_size`: Receive buffer size in bytes (default: 512)
/// - `max_name_len`: Longest dotted name accepted while parsing (default: 382)
/// - `tick_interval`: Wall-clock length of a tick (default: 1 second)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Ticks to wait for a reply to each query.
    ///
    /// Default: 3
    pub wait_ticks: u32,

    /// How many times the query is re-sent before giving up.
    ///
    /// Default: 2
    pub max_retries: u32,

    /// Bytes of each received datagram that are kept and parsed.
    ///
    /// Default: 512
    pub max_message_size: usize,

    /// Longest dotted name, trailing dot included, accepted from a reply.
    ///
    /// Default: 382
    pub max_name_len: usize,

    /// Real-time duration of one tick.
    ///
    /// Only used when time is driven through
    /// [`handle_timeout`](sansio::Protocol::handle_timeout); explicit
    /// [`SessionCommand::Tick`](crate::SessionCommand::Tick) events ignore it.
    ///
    /// Default: 1 second
    pub tick_interval: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            wait_ticks: DEFAULT_WAIT_TICKS,
            max_retries: DEFAULT_MAX_RETRIES,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl ResolverConfig {
    /// Create a new configuration with default values.
    ///
    /// Equivalent to [`ResolverConfig::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of ticks each attempt waits for a reply.
    ///
    /// A value of zero will use the default (3 ticks).
    ///
    /// # Example
    ///
    /// ```rust
    /// use mdns_resolver::ResolverConfig;
    ///
    /// let config = ResolverConfig::default().with_wait_ticks(10);
    /// assert_eq!(config.wait_ticks, 10);
    /// ```
    pub fn with_wait_ticks(mut self, ticks: u32) -> Self {
        self.wait_ticks = if ticks == 0 {
            DEFAULT_WAIT_TICKS
        } else {
            ticks
        };
        self
    }

    /// Set how many times the query is re-sent.
    ///
    /// Zero means the query is sent once and the lookup times out after the
    /// first wait.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the receive buffer size.
    ///
    /// A value of zero will use the default (512 bytes).
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = if size == 0 {
            DEFAULT_MAX_MESSAGE_SIZE
        } else {
            size
        };
        self
    }

    /// Set the longest dotted name accepted while parsing.
    ///
    /// A value of zero will use the default (382 bytes).
    pub fn with_max_name_len(mut self, len: usize) -> Self {
        self.max_name_len = if len == 0 { DEFAULT_MAX_NAME_LEN } else { len };
        self
    }

    /// Set the wall-clock length of a tick.
    ///
    /// A value of zero will use the default (1 second).
    ///
    /// # Example
    ///
    /// ```rust
    /// use mdns_resolver::ResolverConfig;
    /// use std::time::Duration;
    ///
    /// let config = ResolverConfig::default()
    ///     .with_tick_interval(Duration::from_millis(100));
    /// assert_eq!(config.tick_interval, Duration::from_millis(100));
    /// ```
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = if interval.is_zero() {
            DEFAULT_TICK_INTERVAL
        } else {
            interval
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::new();
        assert_eq!(config.wait_ticks, 3);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.max_message_size, 512);
        assert_eq!(config.max_name_len, 382);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_zero_falls_back_to_default() {
        let config = ResolverConfig::default()
            .with_wait_ticks(0)
            .with_max_message_size(0)
            .with_max_name_len(0)
            .with_tick_interval(Duration::ZERO)
            .with_max_retries(0);
        assert_eq!(config.wait_ticks, DEFAULT_WAIT_TICKS);
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.max_name_len, DEFAULT_MAX_NAME_LEN);
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
        assert_eq!(config.max_retries, 0);
    }
}

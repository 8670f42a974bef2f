//! Futures book constants

/// Page size used when none is requested
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Largest page a single listing call will probe
pub const MAX_PAGE_SIZE: u64 = 100;

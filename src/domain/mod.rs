// Domain layer - Readings, sessions and their per-second normalization
pub mod normalized;
pub mod reading;
pub mod report;
pub mod session;

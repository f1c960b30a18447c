//! Clients for the external services this system synchronizes with.
//!
//! Each boundary is a trait so services can be exercised against fakes in
//! tests: the mail transport, the AI completion service, and the calendar
//! service.

pub mod ai;
pub mod calendar;
pub mod mail;

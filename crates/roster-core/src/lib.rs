//! Core rules behind the personnel roster dashboard.
//!
//! Spreadsheet rows are normalized once by [`import`], scoped to what the
//! caller's role may see by [`roster::access`], checked for assigned/filled
//! post disagreements by [`roster::reconciliation`], and folded into headcount
//! summaries by [`roster::aggregation`].

pub mod config;
pub mod error;
pub mod import;
pub mod roster;
pub mod telemetry;

//! Car owner revenue split CLI tools.
//!
//! This crate provides command-line tools over exported ledger snapshots:
//!
//! - `osplit-payable`: the amount owed to a car's owner for one month
//! - `osplit-report`: yearly schedules, category totals, snapshot checks
//!
//! # Example Usage
//!
//! ```bash
//! osplit-payable snapshots/ --car 100 --year 2026 --month 3
//! osplit-payable snapshots/ --car 100 --year 2026 --month 3 --explain
//! osplit-report snapshots/ schedule --car 100 --year 2026
//! osplit-report snapshots/ check
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod format;

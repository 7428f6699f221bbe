//! Database access for skf-re
//!
//! One module per entity; every mutation that must appear atomic to readers
//! runs inside a single transaction.

pub mod organizations;
pub mod reports;
pub mod sessions;
pub mod users;
pub mod votes;

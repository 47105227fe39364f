//! Common test utilities

#![allow(dead_code)]

pub mod rtdb_mock;
pub mod test_fixtures;

pub use rtdb_mock::{DatabaseState, MockRealtimeDatabase, TEST_ACCESS_TOKEN};
pub use test_fixtures::*;

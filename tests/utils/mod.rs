pub mod event_log;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use event_log::EventLog;
#[allow(unused_imports)]
pub use mocks::{FailingConnector, RecordingChannel, RecordingConnector};
#[allow(unused_imports)]
pub use setup::{settle, TestSetup, TestSetupBuilder};

#![allow(dead_code)]

pub use restartwatch_test_utils::builders;
pub use restartwatch_test_utils::fake_launcher;
pub use restartwatch_test_utils::{init_tracing, with_timeout};

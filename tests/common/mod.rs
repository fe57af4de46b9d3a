#![allow(unused_imports)]
#![allow(dead_code)]

pub use ursm_launch_test_utils::builders;
pub use ursm_launch_test_utils::fake_job;
pub use ursm_launch_test_utils::init_tracing;
pub use ursm_launch_test_utils::with_timeout;

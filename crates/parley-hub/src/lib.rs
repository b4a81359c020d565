pub mod register;
pub mod registry;
pub mod verify;

pub use register::{RegisterError, RegisterOutcome, Registration, register, reverify_loop};
pub use registry::{ListFilter, Registry};
pub use verify::HealthVerifier;

use std::time::Duration;

/// Hub-wide settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub admin_authkey: String,
    pub verify_timeout: Duration,
    pub reverify_interval: Duration,
}

impl HubConfig {
    pub fn new(admin_authkey: impl Into<String>) -> Self {
        Self {
            admin_authkey: admin_authkey.into(),
            verify_timeout: Duration::from_secs(5),
            reverify_interval: Duration::from_secs(300),
        }
    }
}

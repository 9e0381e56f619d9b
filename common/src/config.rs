// Licensed under the Apache-2.0 license

use pmp_probe_drivers::memory_layout::TEST_TARGET_ADDR;

/// Build-time probe configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// RAM word the probe writes to.
    pub target: usize,

    /// Stop with `PMP_VERIFY_MISMATCH` when a PMP register does not read
    /// back as programmed, instead of logging and probing anyway.
    pub strict_verify: bool,
}

impl ProbeConfig {
    pub const fn new() -> Self {
        Self {
            target: TEST_TARGET_ADDR,
            strict_verify: cfg!(feature = "strict-verify"),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new()
    }
}

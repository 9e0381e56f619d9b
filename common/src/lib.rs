// Licensed under the Apache-2.0 license.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod config;
pub mod context;
pub mod handler;
pub mod probe;
pub mod regions;

pub use config::ProbeConfig;
pub use context::{ProbeContext, ProbeState, PROTECTED_SENTINEL, UNPROTECTED_SENTINEL};
pub use handler::StoreFaultHandler;
pub use probe::{Probe, ProbeExit};
pub use regions::{PMP_REGION_COUNT, PROBE_REGIONS, PROBE_REGIONS_RV32, PROBE_REGIONS_RV64};

pub use pmp_probe_drivers::cprint;
pub use pmp_probe_drivers::cprintln;
pub use pmp_probe_drivers::memory_layout;
pub use pmp_probe_error::{exit_code, ProbeError, ProbeResult};

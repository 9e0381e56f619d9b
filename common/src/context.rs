/*++

Licensed under the Apache-2.0 license.

File Name:

    context.rs

Abstract:

    State shared between the probe sequence and the trap handler.

--*/

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use pmp_probe_error::{ProbeError, ProbeResult};

/// Written to the target before protection is enabled.
pub const UNPROTECTED_SENTINEL: u32 = 0xAAAA_AAAA;

/// Written to the target after protection is enabled. Must never land.
pub const PROTECTED_SENTINEL: u32 = 0xEEEE_EEEE;

/// Progress of the probe.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Unprotected = 0,
    Configured = 1,
    Probing = 2,
    Pass = 3,
    FailSetup = 4,
    FailUnprotected = 5,
    FailNotEnforced = 6,
}

impl ProbeState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProbeState::Pass
                | ProbeState::FailSetup
                | ProbeState::FailUnprotected
                | ProbeState::FailNotEnforced
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProbeState::Unprotected => "UNPROTECTED",
            ProbeState::Configured => "CONFIGURED",
            ProbeState::Probing => "PROBING",
            ProbeState::Pass => "PASS",
            ProbeState::FailSetup => "FAIL_SETUP",
            ProbeState::FailUnprotected => "FAIL_UNPROTECTED",
            ProbeState::FailNotEnforced => "FAIL_NOT_ENFORCED",
        }
    }
}

impl From<ProbeState> for u8 {
    /// Converts to this type from the input type.
    fn from(state: ProbeState) -> u8 {
        state as u8
    }
}

impl From<u8> for ProbeState {
    fn from(val: u8) -> ProbeState {
        match val {
            0 => ProbeState::Unprotected,
            1 => ProbeState::Configured,
            2 => ProbeState::Probing,
            3 => ProbeState::Pass,
            5 => ProbeState::FailUnprotected,
            6 => ProbeState::FailNotEnforced,
            _ => ProbeState::FailSetup,
        }
    }
}

/// Target location plus the status and state of one probe run.
///
/// One writer at a time: the probe sequence until the protected store is
/// issued, the trap handler afterwards.
pub struct ProbeContext {
    target: usize,
    status: AtomicU32,
    state: AtomicU8,
}

impl ProbeContext {
    const INCOMPLETE: u32 = ProbeError::PROBE_INCOMPLETE.0.get();

    pub const fn new(target: usize) -> Self {
        Self {
            target,
            status: AtomicU32::new(Self::INCOMPLETE),
            state: AtomicU8::new(ProbeState::Unprotected as u8),
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn state(&self) -> ProbeState {
        ProbeState::from(self.state.load(Ordering::SeqCst))
    }

    /// Exit status recorded so far. `PROBE_INCOMPLETE` until a verdict.
    pub fn status(&self) -> u32 {
        self.status.load(Ordering::SeqCst)
    }

    pub fn result(&self) -> ProbeResult<()> {
        match ProbeError::try_from(self.status()) {
            Ok(err) => Err(err),
            Err(_) => Ok(()),
        }
    }

    pub(crate) fn reset(&self) {
        self.status.store(Self::INCOMPLETE, Ordering::SeqCst);
        self.enter(ProbeState::Unprotected);
    }

    pub(crate) fn enter(&self, state: ProbeState) {
        self.state.store(state.into(), Ordering::SeqCst);
    }

    /// Record a verdict.
    pub(crate) fn finish(&self, state: ProbeState, result: ProbeResult<()>) -> ProbeResult<()> {
        self.status
            .store(pmp_probe_error::exit_code(result), Ordering::SeqCst);
        self.enter(state);
        result
    }
}

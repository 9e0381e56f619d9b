/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Failure taxonomy of the PMP probe. Every failure ends the probe, and the
    error value is the process exit status.

--*/
#![cfg_attr(not(feature = "std"), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// Probe Error Type
/// Derives debug, copy, clone, eq, and partial eq
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ProbeError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, doc) tuples and generates
/// constant definitions for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: ProbeError = ProbeError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl ProbeError {
    /// Create a probe error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. The preferred way to get a ProbeError from a u32 is to
    /// use `ProbeError::try_from()` from the `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("ProbeError cannot be 0"),
        }
    }

    define_error_constants![
        (
            PROBE_INCOMPLETE,
            0x0000_0001,
            "Probe has not reached a verdict"
        ),
        (PROBE_FW_PANIC, 0x0000_0002, "Probe firmware panicked"),
        (
            PROBE_SETUP_FAILED,
            0x0000_00FA,
            "Target location is not writable memory before protection"
        ),
        (
            PMP_VERIFY_MISMATCH,
            0x0000_00FB,
            "PMP register readback differs from the programmed value"
        ),
        (
            PMP_REGIONS_NOT_ASCENDING,
            0x0000_00FC,
            "PMP region table boundaries are not ascending"
        ),
        (
            PROBE_WRITE_NOT_BLOCKED,
            0x0000_00FF,
            "Trap taken but the protected write reached memory"
        ),
        (
            PROBE_NOT_ENFORCED,
            0x0000_FA17,
            "Protected write completed without a trap"
        ),
    ];
}

impl From<core::num::NonZeroU32> for crate::ProbeError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::ProbeError(val)
    }
}

impl From<ProbeError> for core::num::NonZeroU32 {
    fn from(val: ProbeError) -> Self {
        val.0
    }
}

impl From<ProbeError> for u32 {
    fn from(val: ProbeError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for ProbeError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(ProbeError(val)),
            Err(err) => Err(err),
        }
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;

/// Process exit status for a probe verdict. Zero means the protection was
/// enforced.
pub fn exit_code(result: ProbeResult<()>) -> u32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_try_from() {
        assert!(ProbeError::try_from(0).is_err());
        assert_eq!(
            Ok(ProbeError::PROBE_NOT_ENFORCED),
            ProbeError::try_from(0xFA17)
        );
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(Ok(())), 0);
        assert_eq!(exit_code(Err(ProbeError::PROBE_SETUP_FAILED)), 0xFA);
        assert_eq!(exit_code(Err(ProbeError::PROBE_WRITE_NOT_BLOCKED)), 0xFF);
        assert_eq!(exit_code(Err(ProbeError::PROBE_NOT_ENFORCED)), 0xFA17);
    }

    #[test]
    fn test_error_constants_uniqueness() {
        let constants = ProbeError::all_constants();
        let mut error_values = HashSet::new();
        let mut duplicates = Vec::new();

        for (name, value) in constants {
            if !error_values.insert(value) {
                duplicates.push((name, value));
            }
        }

        assert!(
            duplicates.is_empty(),
            "Found duplicate error codes: {:?}",
            duplicates
        );
    }
}

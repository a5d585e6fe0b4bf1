//! Defines the cancellation probe interface [`Cancel`].

use crate::{Error, Result};

/// Caller-supplied cancellation probe.
///
/// Long operations poll the probe at their suspension points: the reporter
/// before each consumer call, the merge engine between its major phases.
/// State lives with the caller; the callee only borrows the probe for the
/// duration of the operation.
pub trait Cancel {
    /// Returns true once the enclosing operation should stop.
    fn cancelled(&self) -> bool;
}

/// A probe that never fires.
pub struct NeverCancel;

impl Cancel for NeverCancel {
    fn cancelled(&self) -> bool {
        false
    }
}

impl<F: Fn() -> bool> Cancel for F {
    fn cancelled(&self) -> bool {
        self()
    }
}

/// Turns a fired probe into the error the operation surfaces.
pub fn check(probe: &dyn Cancel) -> Result<()> {
    if probe.cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

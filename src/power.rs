//! Local device power transitions and the registry sweeps they trigger.

use log::debug;

use crate::{registry::Registry, types::ConnectionStatus};

/// Power-state notifications from the local device manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceEvent {
    PoweredOn,
    PoweringOff,
    PoweredOff,
}

impl DeviceEvent {
    /// Report whether the event takes the radio down.
    #[must_use]
    pub const fn is_power_down(self) -> bool { matches!(self, Self::PoweringOff | Self::PoweredOff) }
}

/// Wake every blocking connect with [`ConnectionStatus::FailureDevicePowerOff`].
///
/// Records are kept; each waiter removes its own record. Returns the number
/// of waiters woken.
pub(crate) fn fail_openers(registry: &mut Registry) -> usize {
    let mut woken = 0;
    registry.retain(|record| {
        if record.opening && record.complete(ConnectionStatus::FailureDevicePowerOff) {
            woken += 1;
        }
        true
    });
    woken
}

/// Fail every opening record and drop every other one.
pub(crate) fn power_down(registry: &mut Registry) {
    let before = registry.len();
    registry.retain(|record| {
        if record.opening {
            record.complete(ConnectionStatus::FailureDevicePowerOff);
            true
        } else {
            false
        }
    });
    debug!(
        "power-down sweep kept {} opening records, dropped {}",
        registry.len(),
        before - registry.len()
    );
}

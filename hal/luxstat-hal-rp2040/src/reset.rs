//! System reset via the Cortex-M SCB

use luxstat_hal::SystemReset;

/// Requests a full chip reset through `AIRCR.SYSRESETREQ`
#[derive(Debug, Default)]
pub struct ScbReset;

impl SystemReset for ScbReset {
    fn restart(&mut self) -> ! {
        cortex_m::peripheral::SCB::sys_reset()
    }
}

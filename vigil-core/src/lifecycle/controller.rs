//! Lifecycle controller
//!
//! Drives a capability table through setup, the main loop and shutdown,
//! fanning each phase out to the optional groups the board exposes.

use super::phase::{Event, Phase};
use crate::soc::{BootError, DisplayKind, ShutdownReason, Soc};

/// Lifecycle errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleError {
    /// Operation not allowed in the current phase
    OutOfOrder(Phase),
    /// Board setup failed
    Boot(BootError),
}

/// Owns the capability table and the current phase
pub struct Lifecycle<S: Soc> {
    soc: S,
    phase: Phase,
    display: DisplayKind,
}

impl<S: Soc> Lifecycle<S> {
    pub fn new(soc: S) -> Self {
        Self {
            soc,
            phase: Phase::Setup,
            display: DisplayKind::None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Display found during setup
    pub fn display_kind(&self) -> DisplayKind {
        self.display
    }

    pub fn soc(&self) -> &S {
        &self.soc
    }

    pub fn soc_mut(&mut self) -> &mut S {
        &mut self.soc
    }

    fn advance(&mut self, event: Event) {
        let next = self.phase.transition(event);
        #[cfg(feature = "defmt")]
        if next != self.phase {
            defmt::debug!("lifecycle: {} -> {}", self.phase, next);
        }
        self.phase = next;
    }

    /// Bring the board up
    ///
    /// Runs once. The phase advances even when the board reports a boot
    /// failure; whether to continue is the caller's decision.
    pub fn setup(&mut self) -> Result<(), LifecycleError> {
        if self.phase != Phase::Setup {
            return Err(LifecycleError::OutOfOrder(self.phase));
        }

        let status = self.soc.setup();

        if let Some(wdt) = self.soc.watchdog() {
            wdt.setup();
        }
        if let Some(button) = self.soc.button() {
            button.setup();
        }
        if let Some(bt) = self.soc.bluetooth() {
            bt.setup();
        }
        if let Some(usb) = self.soc.usb() {
            usb.setup();
        }
        self.display = match self.soc.display() {
            Some(display) => display.setup(),
            None => DisplayKind::None,
        };

        self.advance(Event::SetupDone);
        status.map_err(LifecycleError::Boot)
    }

    /// Finish initialization once application subsystems are up
    pub fn post_init(&mut self) -> Result<(), LifecycleError> {
        if self.phase != Phase::PostInit {
            return Err(LifecycleError::OutOfOrder(self.phase));
        }
        self.soc.post_init();
        self.advance(Event::PostInitDone);
        Ok(())
    }

    /// Run one main-loop iteration
    ///
    /// Returns `Ok(false)` once the device has shut down.
    pub fn tick(&mut self) -> Result<bool, LifecycleError> {
        match self.phase {
            Phase::LoopTick => {}
            Phase::Shutdown(_) | Phase::Reset => return Ok(false),
            other => return Err(LifecycleError::OutOfOrder(other)),
        }

        self.soc.loop_tick();

        if let Some(wdt) = self.soc.watchdog() {
            wdt.feed();
        }
        if let Some(display) = self.soc.display() {
            display.loop_tick();
        }
        if let Some(bt) = self.soc.bluetooth() {
            bt.loop_tick();
        }
        if let Some(usb) = self.soc.usb() {
            usb.loop_tick();
        }
        if let Some(button) = self.soc.button() {
            button.loop_tick();
        }

        self.advance(Event::Tick);
        Ok(true)
    }

    /// Release every peripheral
    ///
    /// Cleanup runs once; later calls return `false` and do nothing.
    pub fn shutdown(&mut self, reason: ShutdownReason) -> bool {
        if self.phase.is_shut_down() {
            return false;
        }

        if let Some(display) = self.soc.display() {
            display.fini(reason);
        }
        if let Some(wifi) = self.soc.wifi() {
            wifi.stop_all();
        }
        if let Some(bt) = self.soc.bluetooth() {
            bt.fini();
        }
        if let Some(usb) = self.soc.usb() {
            usb.fini();
        }
        if let Some(button) = self.soc.button() {
            button.fini();
        }
        if let Some(wdt) = self.soc.watchdog() {
            wdt.fini();
        }
        self.soc.fini(reason);

        self.advance(Event::Shutdown(reason));
        true
    }

    /// Restart the chip
    pub fn reset(mut self) -> ! {
        self.advance(Event::Reset);
        self.soc.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::BatteryParam;
    use crate::soc::{ButtonOps, DisplayOps, ResetInfo, SocId, WatchdogOps, WifiOps, WifiParam};
    use heapless::Vec;
    use vigil_display::PanelModel;
    use vigil_hal::{RawResetCause, ResetCause};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Setup,
        PostInit,
        Loop,
        Fini(ShutdownReason),
        WdtSetup,
        WdtFeed,
        WdtFini,
        ButtonSetup,
        ButtonLoop,
        ButtonFini,
        DisplaySetup,
        DisplayLoop,
        DisplayFini,
        WifiStop,
    }

    struct MockSoc {
        boot: Result<(), BootError>,
        calls: Vec<Call, 64>,
        with_groups: bool,
    }

    impl MockSoc {
        fn new(with_groups: bool) -> Self {
            Self {
                boot: Ok(()),
                calls: Vec::new(),
                with_groups,
            }
        }

        fn log(&mut self, call: Call) {
            let _ = self.calls.push(call);
        }
    }

    impl Soc for MockSoc {
        fn id(&self) -> SocId {
            SocId::Host
        }
        fn name(&self) -> &'static str {
            "mock"
        }
        fn chip_id(&self) -> u32 {
            0x123456
        }
        fn free_heap(&self) -> u32 {
            0
        }
        fn reset_info(&self) -> ResetInfo {
            RawResetCause::new(ResetCause::PowerOn, 0)
        }
        fn random(&mut self, low: i32, _high: i32) -> i32 {
            low
        }
        fn setup(&mut self) -> Result<(), BootError> {
            self.log(Call::Setup);
            self.boot
        }
        fn post_init(&mut self) {
            self.log(Call::PostInit);
        }
        fn loop_tick(&mut self) {
            self.log(Call::Loop);
        }
        fn fini(&mut self, reason: ShutdownReason) {
            self.log(Call::Fini(reason));
        }
        fn reset(&mut self) -> ! {
            panic!("reset")
        }
        fn gnss_serial_begin(&mut self, _baud: u32) {}
        fn gnss_serial_enable_rx(&mut self, _enabled: bool) {}
        fn eeprom_begin(&mut self, _size: usize) -> bool {
            true
        }
        fn spi_begin(&mut self) {}
        fn max_sketch_space(&self) -> u32 {
            0
        }
        fn battery_param(&mut self, _param: BatteryParam) -> f32 {
            0.0
        }
        fn pps_interrupt(&mut self, _now_ms: u32) {}
        fn pps_time_marker(&self) -> u32 {
            0
        }

        fn wifi(&mut self) -> Option<&mut dyn WifiOps> {
            if self.with_groups {
                Some(self)
            } else {
                None
            }
        }
        fn display(&mut self) -> Option<&mut dyn DisplayOps> {
            if self.with_groups {
                Some(self)
            } else {
                None
            }
        }
        fn watchdog(&mut self) -> Option<&mut dyn WatchdogOps> {
            if self.with_groups {
                Some(self)
            } else {
                None
            }
        }
        fn button(&mut self) -> Option<&mut dyn ButtonOps> {
            if self.with_groups {
                Some(self)
            } else {
                None
            }
        }
    }

    impl WifiOps for MockSoc {
        fn set_param(&mut self, _param: WifiParam) {}
        fn transmit_udp(&mut self, _port: u16, _payload: &[u8]) -> usize {
            0
        }
        fn stop_all(&mut self) {
            self.log(Call::WifiStop);
        }
        fn set_hostname(&mut self, _hostname: &str) -> bool {
            true
        }
        fn clients_count(&mut self) -> Option<usize> {
            None
        }
    }

    impl DisplayOps for MockSoc {
        fn setup(&mut self) -> DisplayKind {
            self.log(Call::DisplaySetup);
            DisplayKind::Epd(PanelModel::Depg0213bn)
        }
        fn loop_tick(&mut self) {
            self.log(Call::DisplayLoop);
        }
        fn fini(&mut self, _reason: ShutdownReason) {
            self.log(Call::DisplayFini);
        }
    }

    impl WatchdogOps for MockSoc {
        fn setup(&mut self) {
            self.log(Call::WdtSetup);
        }
        fn feed(&mut self) {
            self.log(Call::WdtFeed);
        }
        fn fini(&mut self) {
            self.log(Call::WdtFini);
        }
    }

    impl ButtonOps for MockSoc {
        fn setup(&mut self) {
            self.log(Call::ButtonSetup);
        }
        fn loop_tick(&mut self) {
            self.log(Call::ButtonLoop);
        }
        fn fini(&mut self) {
            self.log(Call::ButtonFini);
        }
    }

    #[test]
    fn test_full_lifecycle_order() {
        let mut lc = Lifecycle::new(MockSoc::new(true));

        lc.setup().unwrap();
        assert_eq!(lc.phase(), Phase::PostInit);
        assert_eq!(lc.display_kind(), DisplayKind::Epd(PanelModel::Depg0213bn));

        lc.post_init().unwrap();
        assert_eq!(lc.phase(), Phase::LoopTick);

        assert_eq!(lc.tick(), Ok(true));
        assert!(lc.shutdown(ShutdownReason::NormalRestart));

        let expected = [
            Call::Setup,
            Call::WdtSetup,
            Call::ButtonSetup,
            Call::DisplaySetup,
            Call::PostInit,
            Call::Loop,
            Call::WdtFeed,
            Call::DisplayLoop,
            Call::ButtonLoop,
            Call::DisplayFini,
            Call::WifiStop,
            Call::ButtonFini,
            Call::WdtFini,
            Call::Fini(ShutdownReason::NormalRestart),
        ];
        assert_eq!(lc.soc().calls.as_slice(), &expected);
    }

    #[test]
    fn test_absent_groups_skipped() {
        let mut lc = Lifecycle::new(MockSoc::new(false));
        lc.setup().unwrap();
        lc.post_init().unwrap();
        lc.tick().unwrap();
        lc.shutdown(ShutdownReason::UserCommand);

        let expected = [
            Call::Setup,
            Call::PostInit,
            Call::Loop,
            Call::Fini(ShutdownReason::UserCommand),
        ];
        assert_eq!(lc.soc().calls.as_slice(), &expected);
        assert_eq!(lc.display_kind(), DisplayKind::None);
    }

    #[test]
    fn test_boot_failure_reported_once() {
        let mut soc = MockSoc::new(false);
        soc.boot = Err(BootError::Storage);
        let mut lc = Lifecycle::new(soc);

        assert_eq!(lc.setup(), Err(LifecycleError::Boot(BootError::Storage)));
        assert_eq!(lc.phase(), Phase::PostInit);
        assert_eq!(
            lc.setup(),
            Err(LifecycleError::OutOfOrder(Phase::PostInit))
        );
    }

    #[test]
    fn test_out_of_order_calls() {
        let mut lc = Lifecycle::new(MockSoc::new(false));
        assert_eq!(lc.post_init(), Err(LifecycleError::OutOfOrder(Phase::Setup)));
        assert_eq!(lc.tick(), Err(LifecycleError::OutOfOrder(Phase::Setup)));
        assert!(lc.soc().calls.is_empty());
    }

    #[test]
    fn test_shutdown_runs_once() {
        let mut lc = Lifecycle::new(MockSoc::new(true));
        lc.setup().unwrap();
        lc.post_init().unwrap();

        assert!(lc.shutdown(ShutdownReason::Watchdog));
        let after_first = lc.soc().calls.len();
        assert!(!lc.shutdown(ShutdownReason::UserCommand));
        assert_eq!(lc.soc().calls.len(), after_first);
        assert_eq!(lc.phase(), Phase::Shutdown(ShutdownReason::Watchdog));
    }

    #[test]
    fn test_tick_after_shutdown_is_false() {
        let mut lc = Lifecycle::new(MockSoc::new(false));
        lc.setup().unwrap();
        lc.post_init().unwrap();
        lc.shutdown(ShutdownReason::ExternalReset);
        let before = lc.soc().calls.len();
        assert_eq!(lc.tick(), Ok(false));
        assert_eq!(lc.soc().calls.len(), before);
    }

    #[test]
    #[should_panic(expected = "reset")]
    fn test_reset_reaches_chip() {
        let lc = Lifecycle::new(MockSoc::new(false));
        lc.reset();
    }
}

//! Lifecycle phases
//!
//! Setup -> PostInit -> LoopTick* -> Shutdown(reason) -> Reset.

use crate::soc::ShutdownReason;

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Power-on board bring-up
    Setup,
    /// Application subsystems are starting, board setup is done
    PostInit,
    /// Steady-state main loop
    LoopTick,
    /// Cleanup has run
    Shutdown(ShutdownReason),
    /// Chip restart requested
    Reset,
}

/// Events driving the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    SetupDone,
    PostInitDone,
    Tick,
    Shutdown(ShutdownReason),
    Reset,
}

impl Phase {
    /// Check whether the main loop may run
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::LoopTick)
    }

    /// Check whether cleanup has already happened
    pub fn is_shut_down(&self) -> bool {
        matches!(self, Phase::Shutdown(_) | Phase::Reset)
    }

    /// Process an event and return the next phase
    ///
    /// Events that do not apply to the current phase leave it unchanged.
    pub fn transition(self, event: Event) -> Self {
        use Phase::*;

        match (self, event) {
            (Setup, Event::SetupDone) => PostInit,
            (PostInit, Event::PostInitDone) => LoopTick,
            (LoopTick, Event::Tick) => LoopTick,

            // Shutdown is reachable from every live phase, once
            (Setup | PostInit | LoopTick, Event::Shutdown(reason)) => Shutdown(reason),

            (_, Event::Reset) => Reset,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_order() {
        let phase = Phase::Setup
            .transition(Event::SetupDone)
            .transition(Event::PostInitDone)
            .transition(Event::Tick)
            .transition(Event::Tick);
        assert_eq!(phase, Phase::LoopTick);

        let phase = phase.transition(Event::Shutdown(ShutdownReason::UserCommand));
        assert_eq!(phase, Phase::Shutdown(ShutdownReason::UserCommand));
        assert_eq!(phase.transition(Event::Reset), Phase::Reset);
    }

    #[test]
    fn test_out_of_order_events_ignored() {
        assert_eq!(Phase::Setup.transition(Event::PostInitDone), Phase::Setup);
        assert_eq!(Phase::Setup.transition(Event::Tick), Phase::Setup);
        assert_eq!(Phase::PostInit.transition(Event::SetupDone), Phase::PostInit);
        assert_eq!(Phase::LoopTick.transition(Event::SetupDone), Phase::LoopTick);
    }

    #[test]
    fn test_shutdown_reason_sticks() {
        let phase = Phase::LoopTick.transition(Event::Shutdown(ShutdownReason::Watchdog));
        let again = phase.transition(Event::Shutdown(ShutdownReason::UserCommand));
        assert_eq!(again, Phase::Shutdown(ShutdownReason::Watchdog));
    }

    #[test]
    fn test_shutdown_from_early_phases() {
        for phase in [Phase::Setup, Phase::PostInit] {
            let next = phase.transition(Event::Shutdown(ShutdownReason::Unknown));
            assert!(next.is_shut_down());
        }
    }

    #[test]
    fn test_reset_from_any_phase() {
        let phases = [
            Phase::Setup,
            Phase::PostInit,
            Phase::LoopTick,
            Phase::Shutdown(ShutdownReason::NormalRestart),
        ];
        for phase in phases {
            assert_eq!(phase.transition(Event::Reset), Phase::Reset);
        }
    }

    #[test]
    fn test_tick_after_shutdown_ignored() {
        let phase = Phase::Shutdown(ShutdownReason::ExternalReset);
        assert_eq!(phase.transition(Event::Tick), phase);
        assert!(!phase.is_running());
    }
}

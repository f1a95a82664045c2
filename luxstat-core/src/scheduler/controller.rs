//! Main loop controller
//!
//! Owns the selected sensor, the renderer and the run state. The
//! firmware drives it forever with [`Controller::run_cycle`]; the only
//! way out is [`KeepAliveExpired`], which the caller must answer with a
//! restart.

use embedded_hal_async::delay::DelayNs;
use luxstat_hal::{ControlChannel, Monotonic};

use crate::config::{DeviceConfig, Timing};
use crate::display::Renderer;
use crate::safety::{KeepAliveExpired, Watchdog};
use crate::serial::{CommandProcessor, IntakeStats};
use crate::state::{Effect, RunState};
use crate::telemetry::{render_rows, RowSpec};
use crate::traits::{LightSensor, Panel};

use super::cadence::ticks_per_cycle;

/// Result of one slow polling step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// Illuminance, if the sensor produced one this cycle
    pub lux: Option<f32>,
}

/// Single-owner main loop state
pub struct Controller<S, P> {
    sensor: S,
    renderer: Renderer<P>,
    layout: &'static [RowSpec],
    state: RunState,
    watchdog: Watchdog,
    commands: CommandProcessor,
    timing: Timing,
}

impl<S: LightSensor, P: Panel> Controller<S, P> {
    /// Build the controller and fix the display rows
    ///
    /// Rows are rendered once against the selected sensor; only rows that
    /// produce text now get a place on screen.
    pub fn new(
        mut sensor: S,
        panel: Option<P>,
        layout: &'static [RowSpec],
        config: &DeviceConfig,
        now_ms: u64,
    ) -> Self {
        let state = RunState::new(config.timing.polling_ms, now_ms);
        let initial = render_rows(layout, &mut sensor, &state);
        let renderer = Renderer::new(panel, config.display, &initial);

        Self {
            sensor,
            renderer,
            layout,
            state,
            watchdog: Watchdog::from_timing(&config.timing),
            commands: CommandProcessor::new(),
            timing: config.timing,
        }
    }

    /// Current run state
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// The renderer
    pub fn renderer(&self) -> &Renderer<P> {
        &self.renderer
    }

    /// The selected sensor
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Ticks in the upcoming polling cycle
    pub fn ticks_per_cycle(&self) -> u32 {
        ticks_per_cycle(self.state.polling_interval_ms(), self.timing.tick_ms)
    }

    /// Fast-tick work: drain host commands, then check the watchdog
    ///
    /// A `T` command redraws before this returns. A `K` in this batch is
    /// already visible to the watchdog check that follows.
    pub fn service<C: ControlChannel>(
        &mut self,
        channel: &mut C,
        now_ms: u64,
    ) -> Result<IntakeStats, KeepAliveExpired> {
        let layout = self.layout;
        let Self {
            commands,
            state,
            sensor,
            renderer,
            ..
        } = self;

        let stats = commands.poll(channel, |command| {
            if state.apply(command, now_ms) == Effect::Refresh {
                let rows = render_rows(layout, &mut *sensor, state);
                renderer.refresh(&rows);
            }
        });

        self.watchdog.ensure(&self.state, now_ms)?;
        Ok(stats)
    }

    /// Re-render every row and redraw
    pub fn refresh(&mut self) {
        let rows = render_rows(self.layout, &mut self.sensor, &self.state);
        self.renderer.refresh(&rows);
    }

    /// Slow-cycle work: one sensor read and one full refresh
    pub fn poll(&mut self) -> PollReport {
        let lux = self.sensor.lux().ok();
        self.refresh();
        PollReport { lux }
    }

    /// Run one polling cycle
    ///
    /// Sleeps one tick at a time, servicing commands and the watchdog
    /// after each sleep, then polls the sensor. The tick count is fixed
    /// when the cycle starts.
    pub async fn run_cycle<D, C, M>(
        &mut self,
        delay: &mut D,
        channel: &mut C,
        clock: &M,
    ) -> Result<PollReport, KeepAliveExpired>
    where
        D: DelayNs,
        C: ControlChannel,
        M: Monotonic,
    {
        for _ in 0..self.ticks_per_cycle() {
            delay.delay_ms(self.timing.tick_ms).await;
            self.service(channel, clock.now_ms())?;
        }
        Ok(self.poll())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::DEFAULT_LAYOUT;
    use crate::testing::{FakePanel, FakeSensor, ScriptChannel, SimClock, SimDelay, SimTime};
    use crate::traits::Capability;
    use embassy_futures::block_on;

    fn lux_only(panel: Option<FakePanel>) -> Controller<FakeSensor, FakePanel> {
        Controller::new(
            FakeSensor::with(&[Capability::Lux]),
            panel,
            DEFAULT_LAYOUT,
            &DeviceConfig::default(),
            0,
        )
    }

    /// Run cycles until the watchdog fires; returns simulated uptime
    fn run_until_expired(
        controller: &mut Controller<FakeSensor, FakePanel>,
        time: &SimTime,
        mut before_cycle: impl FnMut(u64, &mut ScriptChannel),
    ) -> (u64, KeepAliveExpired) {
        let mut delay = SimDelay(time);
        let clock = SimClock(time);
        let mut channel = ScriptChannel::new();
        for _ in 0..10_000 {
            before_cycle(time.now(), &mut channel);
            if let Err(expired) = block_on(controller.run_cycle(&mut delay, &mut channel, &clock)) {
                return (time.now(), expired);
            }
        }
        panic!("watchdog never fired");
    }

    #[test]
    fn test_lux_only_sensor_shows_two_rows() {
        let controller = lux_only(Some(FakePanel::new()));
        let renderer = controller.renderer();
        assert_eq!(renderer.row_count(), 2);
        assert_eq!(renderer.row_text(0), Some("Lux: 123.4"));
        assert_eq!(renderer.row_text(1), Some("Polling: 0.5s"));
    }

    #[test]
    fn test_set_interval_refreshes_immediately() {
        let mut controller = lux_only(Some(FakePanel::new()));
        let mut channel = ScriptChannel::new();
        channel.send(b"T2000\n");

        let before = controller.renderer().stats().refreshes;
        let stats = controller.service(&mut channel, 100).unwrap();

        assert_eq!(stats.accepted, 1);
        assert_eq!(controller.state().polling_interval_ms(), 2000);
        assert_eq!(controller.renderer().stats().refreshes, before + 1);
        assert_eq!(controller.renderer().row_text(1), Some("Polling: 2.0s"));
        assert_eq!(controller.ticks_per_cycle(), 4);
    }

    #[test]
    fn test_repeated_set_interval_refreshes_each_time() {
        let mut controller = lux_only(Some(FakePanel::new()));
        let mut channel = ScriptChannel::new();
        channel.send(b"T750\nT750\n");

        let before = controller.renderer().stats().refreshes;
        controller.service(&mut channel, 0).unwrap();

        assert_eq!(controller.state().polling_interval_ms(), 750);
        assert_eq!(controller.renderer().stats().refreshes, before + 2);
    }

    #[test]
    fn test_malformed_commands_leave_state_alone() {
        let mut controller = lux_only(Some(FakePanel::new()));
        let mut channel = ScriptChannel::new();
        channel.send(b"\nT\nTabc\nQ1\n");

        let before = *controller.state();
        let stats = controller.service(&mut channel, 1_000).unwrap();

        assert_eq!(*controller.state(), before);
        assert_eq!(stats.dropped, 4);
    }

    #[test]
    fn test_zero_interval_still_polls_every_tick() {
        let mut controller = lux_only(None);
        let mut channel = ScriptChannel::new();
        channel.send(b"T0\n");
        controller.service(&mut channel, 0).unwrap();

        assert_eq!(controller.state().polling_interval_ms(), 0);
        assert_eq!(controller.ticks_per_cycle(), 1);
    }

    #[test]
    fn test_watchdog_fires_strictly_after_sixty_seconds() {
        let time = SimTime::new();
        let mut controller = lux_only(Some(FakePanel::new()));
        let (now, expired) = run_until_expired(&mut controller, &time, |_, _| {});

        // 500 ms ticks: 60.0 s is tolerated, 60.5 s is not
        assert_eq!(now, 60_500);
        assert_eq!(expired.elapsed_ms, 60_500);
    }

    #[test]
    fn test_keep_alive_postpones_restart() {
        let time = SimTime::new();
        let mut controller = lux_only(Some(FakePanel::new()));
        let (now, _) = run_until_expired(&mut controller, &time, |now, channel| {
            if now == 30_000 {
                channel.send(b"K\n");
            }
        });

        // K is read on the tick ending at 30.5 s
        assert_eq!(now, 30_500 + 60_500);
    }

    #[test]
    fn test_keep_alive_seen_by_same_tick_watchdog() {
        let mut controller = lux_only(None);
        let mut channel = ScriptChannel::new();
        channel.send(b"K\n");
        assert!(controller.service(&mut channel, 60_500).is_ok());
        assert!(controller.service(&mut channel, 120_500).is_ok());
        assert!(controller.service(&mut channel, 120_501).is_err());
    }

    #[test]
    fn test_cycle_reads_sensor_and_refreshes() {
        let time = SimTime::new();
        let mut controller = lux_only(Some(FakePanel::new()));
        let mut channel = ScriptChannel::new();
        channel.send(b"T1000\n");
        controller.service(&mut channel, 0).unwrap();

        let before = controller.renderer().stats().refreshes;
        let report = block_on(controller.run_cycle(
            &mut SimDelay(&time),
            &mut channel,
            &SimClock(&time),
        ))
        .unwrap();

        assert_eq!(time.now(), 1_000);
        assert_eq!(report.lux, Some(123.4));
        assert_eq!(controller.renderer().stats().refreshes, before + 1);
        // Two reads to drain the T line, then one empty read per tick
        assert_eq!(channel.reads, 2 + 2);
    }

    #[test]
    fn test_runs_without_display() {
        let time = SimTime::new();
        let mut controller = lux_only(None);
        let mut channel = ScriptChannel::new();
        let report = block_on(controller.run_cycle(
            &mut SimDelay(&time),
            &mut channel,
            &SimClock(&time),
        ))
        .unwrap();

        assert_eq!(report.lux, Some(123.4));
        assert!(!controller.renderer().is_active());
    }
}

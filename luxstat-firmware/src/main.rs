//! Luxstat - Ambient Light Sensor Status Display Firmware
//!
//! Main firmware binary for RP2040 boards with an I2C light sensor and
//! an SSD1306 OLED. Probes whichever supported sensor is fitted, shows
//! its readings and restarts itself when the host stops sending
//! keep-alives over USB serial.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C1, USB};
use embassy_rp::usb::{Driver, InterruptHandler as UsbInterruptHandler};
use embassy_time::Delay;
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, Config as UsbConfig};
use embedded_hal_bus::i2c::RefCellDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use luxstat_core::scheduler::{Controller, PollReport};
use luxstat_core::sensor::{probe, ProbeError};
use luxstat_core::telemetry::DEFAULT_LAYOUT;
use luxstat_drivers::display::Ssd1306;
use luxstat_drivers::sensor::probe_chain;
use luxstat_hal_rp2040::{EmbassyClock, Monotonic, PipeChannel, ScbReset, SystemReset};

use crate::channels::COMMAND_PIPE;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => UsbInterruptHandler<USB>;
});

type I2cBus = I2c<'static, I2C1, i2c::Blocking>;

// Shared sensor/display bus (must live forever for device handles)
static I2C_BUS: StaticCell<RefCell<I2cBus>> = StaticCell::new();

// USB descriptor buffers and CDC state
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_STATE: StaticCell<State> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Luxstat firmware starting...");

    let p = embassy_rp::init(Default::default());
    let device_config = config::device_config();
    info!("Peripherals initialized");

    // USB serial control port
    let driver = Driver::new(p.USB, Irqs);
    let mut usb_config = UsbConfig::new(0xc0de, 0x1ec5);
    usb_config.manufacturer = Some("Luxstat");
    usb_config.product = Some("Ambient Light Sensor");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUF.init([0; 64]),
    );
    let class = CdcAcmClass::new(
        &mut builder,
        CDC_STATE.init(State::new()),
        tasks::usb::MAX_PACKET_SIZE,
    );
    let usb = builder.build();
    let (_tx, rx) = class.split();

    spawner.spawn(tasks::usb_device_task(usb)).unwrap();
    spawner.spawn(tasks::usb_rx_task(rx)).unwrap();
    info!("USB serial ready");

    // I2C1: SCL on GP19, SDA on GP18
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = config::I2C_FREQUENCY_HZ;
    let bus: &'static RefCell<I2cBus> = I2C_BUS.init(RefCell::new(I2c::new_blocking(
        p.I2C1, p.PIN_19, p.PIN_18, i2c_config,
    )));

    // First sensor in the chain that answers wins
    let chain = probe_chain();
    let mut report = match probe(&chain, || RefCellDevice::new(bus)) {
        Ok(report) => report,
        Err(ProbeError::NoSensor { attempts }) => {
            for attempt in &attempts {
                error!("{} not usable: {:?}", attempt.name, attempt.error);
            }
            panic!("No supported light sensor found");
        }
    };
    for failure in &report.failures {
        debug!("Skipped {}: {:?}", failure.name, failure.error);
    }
    info!("Using {} light sensor", report.name);

    // Startup rows are fixed from the first reading, so it must be real
    if let Err(e) = report.sensor.start(&mut Delay) {
        warn!("{} did not start: {:?}", report.name, e);
    }

    // Display is optional; the device keeps running without it
    let mut display_reset = Output::new(p.PIN_21, Level::High);
    let panel = match Ssd1306::new(
        RefCellDevice::new(bus),
        config::DISPLAY_ADDRESS,
        config::DISPLAY_WIDTH,
        config::DISPLAY_HEIGHT,
    )
    .and_then(|mut display| display.init(&mut display_reset, &mut Delay).map(|()| display))
    {
        Ok(display) => Some(display),
        Err(e) => {
            warn!("Display unavailable: {:?}", e);
            None
        }
    };

    let clock = EmbassyClock;
    let mut controller = Controller::new(
        report.sensor,
        panel,
        DEFAULT_LAYOUT,
        &device_config,
        clock.now_ms(),
    );
    info!(
        "Showing {} rows, polling every {} ms",
        controller.renderer().row_count(),
        controller.state().polling_interval_ms()
    );

    let mut channel = PipeChannel::new(&COMMAND_PIPE);
    let mut delay = Delay;

    loop {
        match controller.run_cycle(&mut delay, &mut channel, &clock).await {
            Ok(PollReport { lux: Some(lux) }) => info!("{} lux", lux),
            Ok(PollReport { lux: None }) => {}
            Err(expired) => {
                error!(
                    "No keep-alive for {} s, restarting",
                    expired.elapsed_secs()
                );
                ScbReset.restart();
            }
        }
    }
}

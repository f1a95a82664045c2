//! USB CDC-ACM control port
//!
//! The device task runs the USB stack. The receive task copies every
//! packet the host sends into [`COMMAND_PIPE`]. Nothing is ever sent
//! back.

use defmt::*;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::cdc_acm::Receiver;
use embassy_usb::driver::EndpointError;
use embassy_usb::UsbDevice;

use crate::channels::COMMAND_PIPE;

/// RP2040 USB driver
pub type UsbDriver = Driver<'static, USB>;

/// Largest full-speed bulk packet
pub const MAX_PACKET_SIZE: u16 = 64;

/// USB device task - services the bus forever
#[embassy_executor::task]
pub async fn usb_device_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

/// USB receive task - forwards host bytes to the main loop
#[embassy_executor::task]
pub async fn usb_rx_task(mut rx: Receiver<'static, UsbDriver>) {
    info!("USB RX task started");

    let mut buf = [0u8; MAX_PACKET_SIZE as usize];

    loop {
        rx.wait_connection().await;
        info!("Host connected");

        loop {
            match rx.read_packet(&mut buf).await {
                Ok(n) => {
                    trace!("RX: {} bytes", n);
                    forward(&buf[..n]);
                }
                Err(EndpointError::Disabled) => break,
                Err(EndpointError::BufferOverflow) => {
                    warn!("USB packet too large, dropped");
                }
            }
        }

        info!("Host disconnected");
    }
}

/// Push bytes into the pipe, dropping what does not fit
fn forward(bytes: &[u8]) {
    let mut rest = bytes;
    // The ring buffer may accept only part of a write at its wrap point
    while !rest.is_empty() {
        match COMMAND_PIPE.try_write(rest) {
            Ok(n) => rest = &rest[n..],
            Err(_) => {
                warn!("Command pipe full, dropping {} bytes", rest.len());
                return;
            }
        }
    }
}

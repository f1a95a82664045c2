//! Embassy async tasks
//!
//! USB runs in its own tasks; everything else happens in the main loop.

pub mod usb;

pub use usb::{usb_device_task, usb_rx_task, UsbDriver};

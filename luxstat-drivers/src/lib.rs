//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in luxstat-core for the parts found on the board:
//!
//! - Light sensors over I2C (VEML7700, TSL2591, TSL2561, TCS34725, VCNL4040)
//! - The fixed-priority probe chain built from them
//! - SSD1306 OLED panels up to 128x64

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod sensor;

#[cfg(test)]
mod testing;

//! Fake I2C register map shared by the driver tests

use embedded_hal::i2c::{self, ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nack;

impl i2c::Error for Nack {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

/// One chip's register file behind a single I2C address
///
/// The first written byte selects the register; `command_mask` strips
/// command bits (TAOS/AMS parts) and `stride` is the register width in
/// bytes. Further written bytes and all reads auto-increment.
pub struct FakeI2c {
    pub address: u8,
    command_mask: u8,
    stride: usize,
    pub mem: [u8; 64],
    pointer: usize,
    pub transactions: u32,
}

impl FakeI2c {
    /// Chip with 8-bit registers addressed through a command byte
    pub fn command(address: u8, command_mask: u8) -> Self {
        Self {
            address,
            command_mask,
            stride: 1,
            mem: [0; 64],
            pointer: 0,
            transactions: 0,
        }
    }

    /// Chip with 16-bit little-endian registers
    pub fn words(address: u8) -> Self {
        Self {
            address,
            command_mask: 0xFF,
            stride: 2,
            mem: [0; 64],
            pointer: 0,
            transactions: 0,
        }
    }

    /// Nothing answers at any address
    pub fn empty() -> Self {
        Self::words(0x7F)
    }

    pub fn set_u8(&mut self, reg: u8, value: u8) {
        self.mem[reg as usize * self.stride] = value;
    }

    pub fn set_u16(&mut self, reg: u8, value: u16) {
        let offset = reg as usize * self.stride;
        self.mem[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    pub fn u8_at(&self, reg: u8) -> u8 {
        self.mem[reg as usize * self.stride]
    }

    pub fn u16_at(&self, reg: u8) -> u16 {
        let offset = reg as usize * self.stride;
        u16::from_le_bytes([self.mem[offset], self.mem[offset + 1]])
    }
}

impl ErrorType for FakeI2c {
    type Error = Nack;
}

impl i2c::I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transactions += 1;
        if address != self.address {
            return Err(Nack);
        }
        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    let Some((&reg, data)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer = (reg & self.command_mask) as usize * self.stride;
                    for &byte in data {
                        self.mem[self.pointer] = byte;
                        self.pointer += 1;
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.mem[self.pointer];
                        self.pointer += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Float comparison that does not rely on std float methods
pub fn close_to(actual: f32, expected: f32, tolerance: f32) -> bool {
    actual - expected < tolerance && expected - actual < tolerance
}

/// Delay that returns at once and records each requested wait in ns
#[derive(Default)]
pub struct SpyDelay {
    pub waits: heapless::Vec<u32, 8>,
}

impl embedded_hal::delay::DelayNs for SpyDelay {
    fn delay_ns(&mut self, ns: u32) {
        let _ = self.waits.push(ns);
    }
}

//! SSD1306 OLED Display Driver
//!
//! Driver for SSD1306-based OLED displays via I2C, up to 128x64. Drawing
//! goes to a page-organised framebuffer through `embedded-graphics`;
//! nothing is sent until [`Panel::flush`].

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use luxstat_core::traits::Panel;

/// Usual I2C address (SA0 low)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Largest panel the controller can drive
pub const MAX_WIDTH: u32 = 128;
pub const MAX_HEIGHT: u32 = 64;
const MAX_PAGES: usize = MAX_HEIGHT as usize / 8;

/// Control bytes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const RESUME_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Errors that can occur with the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// I2C write failed
    Bus,
    /// Reset line could not be driven
    Pin,
    /// Panel size the controller cannot drive
    UnsupportedSize,
}

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    width: usize,
    height: usize,
    /// Frame buffer (1 bit per pixel, organized as pages)
    buffer: [[u8; MAX_WIDTH as usize]; MAX_PAGES],
}

impl<I2C: I2c> Ssd1306<I2C> {
    /// Create a driver for a `width` x `height` panel
    ///
    /// Height must be a whole number of pages between 16 and 64 rows.
    pub fn new(i2c: I2C, address: u8, width: u32, height: u32) -> Result<Self, DisplayError> {
        let height_ok = (16..=MAX_HEIGHT).contains(&height) && height % 8 == 0;
        if !(1..=MAX_WIDTH).contains(&width) || !height_ok {
            return Err(DisplayError::UnsupportedSize);
        }
        Ok(Self {
            i2c,
            address,
            width: width as usize,
            height: height as usize,
            buffer: [[0; MAX_WIDTH as usize]; MAX_PAGES],
        })
    }

    fn pages(&self) -> usize {
        self.height / 8
    }

    /// COM pin wiring: sequential on 16 and 32 row panels
    fn com_pins(&self) -> u8 {
        if self.height <= 32 {
            0x02
        } else {
            0x12
        }
    }

    /// Pulse the reset line and run the power-up sequence
    pub fn init<RST, D>(&mut self, reset: &mut RST, delay: &mut D) -> Result<(), DisplayError>
    where
        RST: OutputPin,
        D: DelayNs,
    {
        reset.set_high().map_err(|_| DisplayError::Pin)?;
        delay.delay_ms(1);
        reset.set_low().map_err(|_| DisplayError::Pin)?;
        delay.delay_ms(10);
        reset.set_high().map_err(|_| DisplayError::Pin)?;
        delay.delay_ms(1);

        let init_cmds = [
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80, // Default clock
            cmd::SET_MUX_RATIO,
            (self.height - 1) as u8,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            cmd::SET_MEMORY_MODE,
            0x00, // Horizontal addressing
            cmd::SET_SEG_REMAP,
            cmd::SET_COM_SCAN_DEC,
            cmd::SET_COM_PINS,
            self.com_pins(),
            cmd::SET_CONTRAST,
            0xCF,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::RESUME_RAM,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ];

        for c in init_cmds {
            self.command(c)?;
        }

        Ok(())
    }

    /// Send a command to the display
    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[CONTROL_COMMAND, cmd])
            .map_err(|_| DisplayError::Bus)
    }

    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        let byte = &mut self.buffer[y / 8][x];
        let mask = 1 << (y % 8);
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

impl<I2C: I2c> OriginDimensions for Ssd1306<I2C> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl<I2C: I2c> DrawTarget for Ssd1306<I2C> {
    type Color = BinaryColor;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Off-screen pixels are clipped silently
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                if x < self.width && y < self.height {
                    self.set_pixel(x, y, color.is_on());
                }
            }
        }
        Ok(())
    }
}

impl<I2C: I2c> Panel for Ssd1306<I2C> {
    /// Send the whole frame buffer, one page per write
    fn flush(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::SET_COLUMN_ADDR)?;
        self.command(0)?;
        self.command((self.width - 1) as u8)?;
        self.command(cmd::SET_PAGE_ADDR)?;
        self.command(0)?;
        self.command((self.pages() - 1) as u8)?;

        let width = self.width;
        for page in 0..self.pages() {
            let mut data = [0u8; MAX_WIDTH as usize + 1];
            data[0] = CONTROL_DATA;
            data[1..=width].copy_from_slice(&self.buffer[page][..width]);
            self.i2c
                .write(self.address, &data[..=width])
                .map_err(|_| DisplayError::Bus)?;
        }

        Ok(())
    }
}

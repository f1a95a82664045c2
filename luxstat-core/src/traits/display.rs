//! Display panel trait for the status OLED

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::DrawTarget;

/// Trait for monochrome display panels
///
/// Drawing goes to an in-memory framebuffer through `embedded-graphics`;
/// nothing reaches the glass until [`Panel::flush`] is called.
pub trait Panel: DrawTarget<Color = BinaryColor> {
    /// Push the framebuffer to the hardware
    fn flush(&mut self) -> Result<(), Self::Error>;
}


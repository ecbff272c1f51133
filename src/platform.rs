//! Capability traits for the register bus and blocking delays.
//!
//! The firmware package implements these over `esp-hal`; tests drive the
//! same code through in-memory fakes.

pub trait DelayOps {
    fn delay_us(&self, micros: u32);
    fn delay_ms(&self, millis: u32);
}

pub trait I2cOps {
    type Error: core::fmt::Debug;

    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Self::Error>;
    fn write_read(&mut self, addr: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error>;
    fn reset(&mut self) -> Result<(), Self::Error>;
}

impl<T: I2cOps + ?Sized> I2cOps for &mut T {
    type Error = T::Error;

    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(addr, buffer)
    }

    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(addr, bytes)
    }

    fn write_read(&mut self, addr: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).write_read(addr, bytes, buffer)
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        (**self).reset()
    }
}

/// Delay that returns immediately; used where timing is irrelevant.
#[derive(Clone, Copy, Default)]
pub struct NoDelay;

impl NoDelay {
    pub const fn new() -> Self {
        Self
    }
}

impl DelayOps for NoDelay {
    fn delay_us(&self, _micros: u32) {}

    fn delay_ms(&self, _millis: u32) {}
}

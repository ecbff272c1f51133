use esp_hal::{
    i2c::master::{Error as I2cError, I2c},
    time::{Duration, Instant},
    Blocking,
};
use jumpnote::platform::{DelayOps, I2cOps};

/// Blocking esp-hal I2C master behind the library's bus trait.
pub struct HalI2c<'d> {
    bus: I2c<'d, Blocking>,
}

impl<'d> HalI2c<'d> {
    pub fn new(bus: I2c<'d, Blocking>) -> Self {
        Self { bus }
    }
}

impl I2cOps for HalI2c<'_> {
    type Error = I2cError;

    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.read(addr, buffer)
    }

    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.bus.write(addr, bytes)
    }

    fn write_read(&mut self, addr: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.write_read(addr, bytes, buffer)
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        // The driver clears FIFO and FSM state at the start of every transaction.
        Ok(())
    }
}

#[derive(Clone, Copy, Default)]
pub struct BusyDelay;

impl BusyDelay {
    pub const fn new() -> Self {
        Self
    }

    fn spin(&self, duration: Duration) {
        let start = Instant::now();
        while start.elapsed() < duration {}
    }
}

impl DelayOps for BusyDelay {
    fn delay_us(&self, micros: u32) {
        self.spin(Duration::from_micros(u64::from(micros)));
    }

    fn delay_ms(&self, millis: u32) {
        self.spin(Duration::from_millis(u64::from(millis)));
    }
}

pub fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

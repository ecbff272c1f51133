use crate::{
    config::MotionConfig,
    platform::{DelayOps, I2cOps},
};

use super::{AccelerationSample, Axis, MotionSampler, SensorError, SensorInitError};

pub const LSM6DS3_ADDR: u8 = 0x6B;
pub const LSM6DS3_WHO_AM_I_VALUE: u8 = 0x69;

pub(super) const REG_WHO_AM_I: u8 = 0x0F;
pub(super) const REG_CTRL1_XL: u8 = 0x10;
pub(super) const REG_CTRL2_G: u8 = 0x11;
pub(super) const REG_CTRL3_C: u8 = 0x12;
pub(super) const REG_OUTX_L_XL: u8 = 0x28;

// Block data update + register auto-increment for burst reads.
const CTRL3_C_BDU_IF_INC: u8 = 0x44;
const BUS_RETRY_DELAY_MS: u32 = 1;

/// LSM6DS3 accelerometer read over a register bus, one axis per poll.
pub struct Lsm6ds3Sampler<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
    config: MotionConfig,
}

impl<I2C, D> Lsm6ds3Sampler<I2C, D>
where
    I2C: I2cOps,
    D: DelayOps,
{
    pub fn new(i2c: I2C, delay: D, config: MotionConfig) -> Self {
        Self {
            i2c,
            delay,
            addr: LSM6DS3_ADDR,
            config,
        }
    }

    pub fn with_address(mut self, addr: u8) -> Self {
        self.addr = addr;
        self
    }

    /// Verify the device id and program the accelerometer; gyro stays off.
    pub fn init(&mut self) -> Result<(), SensorInitError<I2C::Error>> {
        let id = self.read_reg(REG_WHO_AM_I).map_err(SensorError::Bus)?;
        if id != LSM6DS3_WHO_AM_I_VALUE {
            return Err(SensorError::UnexpectedId(id));
        }

        self.write_reg(REG_CTRL3_C, CTRL3_C_BDU_IF_INC)
            .map_err(SensorError::Bus)?;
        self.write_reg(REG_CTRL1_XL, ctrl1_xl(&self.config))
            .map_err(SensorError::Bus)?;
        self.write_reg(REG_CTRL2_G, 0x00).map_err(SensorError::Bus)?;

        log::info!(
            "imu: ready addr=0x{:02x} axis={:?} fs={:?} odr={:?}",
            self.addr,
            self.config.vertical_axis,
            self.config.full_scale,
            self.config.output_rate
        );
        Ok(())
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c_write_read(&[reg], &mut buf)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        let addr = self.addr;
        match self.i2c.write(addr, &[reg, value]) {
            Ok(()) => Ok(()),
            Err(_) => {
                let _ = self.i2c.reset();
                self.delay.delay_ms(BUS_RETRY_DELAY_MS);
                self.i2c.write(addr, &[reg, value])
            }
        }
    }

    fn i2c_write_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> Result<(), I2C::Error> {
        let addr = self.addr;
        match self.i2c.write_read(addr, bytes, buffer) {
            Ok(()) => Ok(()),
            Err(_) => {
                let _ = self.i2c.reset();
                self.delay.delay_ms(BUS_RETRY_DELAY_MS);
                self.i2c.write_read(addr, bytes, buffer)
            }
        }
    }
}

impl<I2C, D> MotionSampler for Lsm6ds3Sampler<I2C, D>
where
    I2C: I2cOps,
    D: DelayOps,
{
    type Error = SensorError<I2C::Error>;

    fn read_vertical(&mut self) -> Result<AccelerationSample, Self::Error> {
        let mut raw = [0u8; 2];
        self.i2c_write_read(&[axis_out_reg(self.config.vertical_axis)], &mut raw)
            .map_err(SensorError::Bus)?;
        Ok(AccelerationSample(i16::from_le_bytes(raw)))
    }

    fn recover(&mut self) -> Result<(), Self::Error> {
        self.init()
    }
}

pub(super) fn ctrl1_xl(config: &MotionConfig) -> u8 {
    ((config.output_rate as u8) << 4) | ((config.full_scale as u8) << 2)
}

pub(super) fn axis_out_reg(axis: Axis) -> u8 {
    REG_OUTX_L_XL + 2 * axis as u8
}

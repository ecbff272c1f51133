//! Vertical-axis acceleration sampling.

mod lsm6ds3;

use core::fmt;

pub use lsm6ds3::{Lsm6ds3Sampler, LSM6DS3_ADDR, LSM6DS3_WHO_AM_I_VALUE};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// Accelerometer full-scale range; the discriminant is the `FS_XL` field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum AccelFullScale {
    G2 = 0b00,
    G4 = 0b10,
    G8 = 0b11,
    G16 = 0b01,
}

/// Accelerometer output data rate; the discriminant is the `ODR_XL` field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum AccelOutputRate {
    Hz13 = 0b0001,
    Hz26 = 0b0010,
    Hz52 = 0b0011,
    Hz104 = 0b0100,
    Hz208 = 0b0101,
    Hz416 = 0b0110,
}

/// One raw vertical-axis reading.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AccelerationSample(pub i16);

impl AccelerationSample {
    /// Absolute value, widened so `i16::MIN` does not overflow.
    pub fn magnitude(self) -> i32 {
        i32::from(self.0).abs()
    }
}

pub trait MotionSampler {
    type Error: fmt::Debug;

    fn read_vertical(&mut self) -> Result<AccelerationSample, Self::Error>;

    /// Bring the sensor back after a read fault.
    fn recover(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: MotionSampler + ?Sized> MotionSampler for &mut T {
    type Error = T::Error;

    fn read_vertical(&mut self) -> Result<AccelerationSample, Self::Error> {
        (**self).read_vertical()
    }

    fn recover(&mut self) -> Result<(), Self::Error> {
        (**self).recover()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SensorError<E> {
    Bus(E),
    UnexpectedId(u8),
}

/// Failure of [`Lsm6ds3Sampler::init`]; fatal at startup.
pub type SensorInitError<E> = SensorError<E>;

impl<E> SensorError<E> {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bus(_) => "bus_error",
            Self::UnexpectedId(_) => "unexpected_id",
        }
    }
}

impl<E: fmt::Debug> fmt::Display for SensorError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "sensor bus error: {err:?}"),
            Self::UnexpectedId(id) => write!(f, "unexpected sensor id 0x{id:02x}"),
        }
    }
}

use core::fmt;

use embedded_hal::{delay::DelayNs, spi::SpiDevice};
use embedded_io::{ErrorKind, ErrorType, Read, Seek, SeekFrom};
use embedded_sdmmc::{
    Error as FsError, Mode, RawDirectory, RawFile, RawVolume, SdCard, SdCardError, TimeSource,
    Timestamp, VolumeIdx, VolumeManager,
};
use jumpnote::audio::{AssetFile, AssetStore, AudioInitError};

/// Assets are only read, so file timestamps never matter.
pub struct FixedTime;

impl TimeSource for FixedTime {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 56,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

type Volumes<S, D> = VolumeManager<SdCard<S, D>, FixedTime>;

/// First FAT volume of the SD card, opened read-only per asset.
pub struct SdAssetStore<S, D>
where
    S: SpiDevice<u8>,
    D: DelayNs,
{
    volumes: Volumes<S, D>,
    volume: RawVolume,
}

impl<S, D> SdAssetStore<S, D>
where
    S: SpiDevice<u8>,
    D: DelayNs,
{
    pub fn mount(spi: S, delay: D) -> Result<Self, AudioInitError> {
        let card = SdCard::new(spi, delay);
        match card.num_bytes() {
            Ok(bytes) => log::info!("sd: card_ready bytes={}", bytes),
            Err(err) => {
                log::warn!("sd: probe_failed err={:?}", err);
                return Err(AudioInitError::StorageUnavailable);
            }
        }

        let mut volumes = VolumeManager::new(card, FixedTime);
        let volume = volumes.open_raw_volume(VolumeIdx(0)).map_err(|err| {
            log::warn!("sd: mount_failed err={:?}", err);
            AudioInitError::StorageUnavailable
        })?;
        Ok(Self { volumes, volume })
    }

    /// Walks `path` from the root; the returned directory must be closed.
    fn open_parent<'p>(
        &mut self,
        path: &'p str,
    ) -> Result<(RawDirectory, &'p str), FsError<SdCardError>> {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let mut current = segments.next().ok_or(FsError::NotFound)?;
        let mut dir = self.volumes.open_root_dir(self.volume)?;

        for next in segments {
            let child = self.volumes.open_dir(dir, current);
            let _ = self.volumes.close_dir(dir);
            dir = child?;
            current = next;
        }
        Ok((dir, current))
    }
}

impl<S, D> AssetStore for SdAssetStore<S, D>
where
    S: SpiDevice<u8>,
    D: DelayNs,
{
    type Error = FsError<SdCardError>;
    type Asset<'a>
        = SdAsset<'a, S, D>
    where
        Self: 'a;

    fn open(&mut self, path: &str) -> Result<Self::Asset<'_>, Self::Error> {
        let (dir, name) = self.open_parent(path)?;
        let file = self.volumes.open_file_in_dir(dir, name, Mode::ReadOnly);
        let _ = self.volumes.close_dir(dir);
        Ok(SdAsset {
            volumes: &mut self.volumes,
            file: file?,
        })
    }
}

pub struct SdAsset<'a, S, D>
where
    S: SpiDevice<u8>,
    D: DelayNs,
{
    volumes: &'a mut Volumes<S, D>,
    file: RawFile,
}

impl<S, D> ErrorType for SdAsset<'_, S, D>
where
    S: SpiDevice<u8>,
    D: DelayNs,
{
    type Error = SdIoError;
}

impl<S, D> Read for SdAsset<'_, S, D>
where
    S: SpiDevice<u8>,
    D: DelayNs,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.volumes.read(self.file, buf) {
            Ok(read) => Ok(read),
            Err(FsError::EndOfFile) => Ok(0),
            Err(err) => Err(SdIoError(err)),
        }
    }
}

impl<S, D> Seek for SdAsset<'_, S, D>
where
    S: SpiDevice<u8>,
    D: DelayNs,
{
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        let moved = match pos {
            SeekFrom::Start(offset) => {
                let offset = u32::try_from(offset).map_err(|_| SdIoError(FsError::InvalidOffset))?;
                self.volumes.file_seek_from_start(self.file, offset)
            }
            SeekFrom::Current(delta) => {
                let delta = i32::try_from(delta).map_err(|_| SdIoError(FsError::InvalidOffset))?;
                self.volumes.file_seek_from_current(self.file, delta)
            }
            SeekFrom::End(delta) => {
                let back = u32::try_from(delta.unsigned_abs())
                    .ok()
                    .filter(|_| delta <= 0)
                    .ok_or(SdIoError(FsError::InvalidOffset))?;
                self.volumes.file_seek_from_end(self.file, back)
            }
        };
        moved.map_err(SdIoError)?;

        self.volumes
            .file_offset(self.file)
            .map(u64::from)
            .map_err(SdIoError)
    }
}

impl<S, D> AssetFile for SdAsset<'_, S, D>
where
    S: SpiDevice<u8>,
    D: DelayNs,
{
    fn close(self) {
        if let Err(err) = self.volumes.close_file(self.file) {
            log::warn!("sd: close_failed err={:?}", err);
        }
    }
}

#[derive(Debug)]
pub struct SdIoError(pub FsError<SdCardError>);

impl fmt::Display for SdIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sd: {:?}", self.0)
    }
}

impl core::error::Error for SdIoError {}

impl embedded_io::Error for SdIoError {
    fn kind(&self) -> ErrorKind {
        match self.0 {
            FsError::NotFound => ErrorKind::NotFound,
            FsError::InvalidOffset => ErrorKind::InvalidInput,
            _ => ErrorKind::Other,
        }
    }
}

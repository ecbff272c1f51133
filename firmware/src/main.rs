#![no_std]
#![no_main]

mod audio;
mod board;
mod config;
mod storage;

use embassy_time::{Duration, Instant, Ticker};
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_backtrace as _;
use esp_hal::{
    delay::Delay,
    dma_buffers,
    gpio::{Level, Output, OutputConfig},
    i2c::master::{Config as I2cConfig, I2c, SoftwareTimeout},
    i2s::master::{Config as I2sConfig, DataFormat, I2s},
    spi::{
        master::{Config as SpiConfig, Spi},
        Mode as SpiMode,
    },
    time::{Duration as HalDuration, Rate},
    timer::timg::TimerGroup,
    Blocking,
};
use jumpnote::{
    audio::{AudioInitError, SampleStreamer},
    config::active_config,
    motion::Lsm6ds3Sampler,
    Orchestrator,
};

use self::{
    audio::I2sAudioDevice,
    board::{halt_forever, BusyDelay, HalI2c},
    config::{
        AUDIO_DMA_BYTES, AUDIO_SAMPLE_RATE_HZ, I2C_FREQ_KHZ, I2C_TRANSACTION_TIMEOUT_MS,
        SD_SPI_FREQ_KHZ, TELEMETRY_EVERY_STEPS,
    },
    storage::SdAssetStore,
};

type Sampler = Lsm6ds3Sampler<HalI2c<'static>, BusyDelay>;
type SdSpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, Delay>;
type JumpOrchestrator = Orchestrator<Sampler, SdAssetStore<SdSpi, Delay>, I2sAudioDevice<'static>>;

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger(log::LevelFilter::Info);
    let config = active_config();

    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let i2c_cfg = I2cConfig::default()
        .with_frequency(Rate::from_khz(I2C_FREQ_KHZ))
        .with_software_timeout(SoftwareTimeout::Transaction(HalDuration::from_millis(
            I2C_TRANSACTION_TIMEOUT_MS,
        )));
    let i2c = match I2c::new(peripherals.I2C0, i2c_cfg) {
        Ok(bus) => bus.with_sda(peripherals.GPIO21).with_scl(peripherals.GPIO22),
        Err(err) => {
            log::error!("imu: bus_config_failed err={:?}", err);
            halt_forever();
        }
    };
    let mut sampler = Lsm6ds3Sampler::new(HalI2c::new(i2c), BusyDelay::new(), config.motion);
    if let Err(err) = sampler.init() {
        log::error!("imu: init_failed err={}", err);
        halt_forever();
    }

    let sd_spi_cfg = SpiConfig::default()
        .with_frequency(Rate::from_khz(SD_SPI_FREQ_KHZ))
        .with_mode(SpiMode::_0);
    let storage = match Spi::new(peripherals.SPI2, sd_spi_cfg) {
        Ok(spi) => {
            let spi = spi
                .with_sck(peripherals.GPIO14)
                .with_mosi(peripherals.GPIO13)
                .with_miso(peripherals.GPIO12);
            let cs = Output::new(peripherals.GPIO15, Level::High, OutputConfig::default());
            match ExclusiveDevice::new(spi, cs, Delay::new()) {
                Ok(device) => SdAssetStore::mount(device, Delay::new()),
                Err(_) => Err(AudioInitError::StorageUnavailable),
            }
        }
        Err(err) => {
            log::warn!("sd: spi_config_failed err={:?}", err);
            Err(AudioInitError::StorageUnavailable)
        }
    };

    let amp_enable = Output::new(peripherals.GPIO4, Level::Low, OutputConfig::default());
    let (_, _, _, tx_descriptors) = dma_buffers!(0, AUDIO_DMA_BYTES);
    let i2s_cfg = I2sConfig::new_tdm_philips()
        .with_sample_rate(Rate::from_hz(AUDIO_SAMPLE_RATE_HZ))
        .with_data_format(DataFormat::Data16Channel16);
    let device = match I2s::new(peripherals.I2S0, peripherals.DMA_I2S0, i2s_cfg) {
        Ok(i2s) => {
            let tx = i2s
                .i2s_tx
                .with_bclk(peripherals.GPIO26)
                .with_ws(peripherals.GPIO25)
                .with_dout(peripherals.GPIO27)
                .build(tx_descriptors);
            Ok(I2sAudioDevice::new(tx, amp_enable))
        }
        Err(err) => {
            log::warn!("audio: i2s_config_failed err={:?}", err);
            Err(AudioInitError::DeviceUnavailable)
        }
    };

    let audio = match (storage, device) {
        (Ok(store), Ok(device)) => Ok(SampleStreamer::new(
            store,
            device,
            config.stream,
            config.scale.notes,
        )),
        (Err(err), _) | (_, Err(err)) => Err(err),
    };
    let orchestrator: JumpOrchestrator = Orchestrator::new(sampler, config, audio);

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(jump_task(orchestrator));
    });
}

#[embassy_executor::task]
async fn jump_task(mut orchestrator: JumpOrchestrator) {
    let boot_instant = Instant::now();
    let mut ticker = Ticker::every(Duration::from_millis(orchestrator.sample_period_ms()));
    let mut steps = 0u32;

    log::info!("jump: loop_started muted={}", orchestrator.is_muted());
    loop {
        let now_ms = Instant::now()
            .saturating_duration_since(boot_instant)
            .as_millis();
        orchestrator.step(now_ms);

        steps = steps.wrapping_add(1);
        if steps % TELEMETRY_EVERY_STEPS == 0 {
            let t = orchestrator.telemetry();
            log::info!(
                "telemetry: jumps={} landings={} ok={} failed={} truncated={} muted={} bytes={} imu_faults={} imu_recoveries={}",
                t.jumps,
                t.landings,
                t.plays_ok,
                t.plays_failed,
                t.plays_truncated,
                t.plays_muted,
                t.bytes_streamed,
                t.sensor_faults,
                t.sensor_recoveries
            );
        }

        ticker.next().await;
    }
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}

//! On-target check that the detection path runs under the embassy executor.
//! Needs only the board, not the IMU or SD card.

#![no_std]
#![no_main]

#[cfg(test)]
#[embedded_test::tests(executor = esp_rtos::embassy::Executor::new())]
mod tests {
    use jumpnote::{config::DEFAULT_CONFIG, JumpDetector, ScaleIndex, ScaleMapper};

    #[init]
    fn init() {
        let peripherals = esp_hal::init(esp_hal::Config::default());
        let timg0 = esp_hal::timer::timg::TimerGroup::new(peripherals.TIMG0);
        esp_rtos::start(timg0.timer0);
    }

    #[test]
    async fn detects_and_maps_a_jump_between_ticks() {
        let mut detector = JumpDetector::new(DEFAULT_CONFIG.jump);
        let mapper = ScaleMapper::new(&DEFAULT_CONFIG.scale);
        let start = embassy_time::Instant::now();

        let mut fired = None;
        for magnitude in [50, 50, 120, 150, 60] {
            embassy_time::Timer::after(embassy_time::Duration::from_millis(10)).await;
            let now_ms = start.elapsed().as_millis();
            if let Some(event) = detector.observe(magnitude, now_ms) {
                assert!(fired.is_none());
                fired = Some(event);
            }
        }

        let event = fired.unwrap();
        assert_eq!(event.peak, 120);
        assert_eq!(mapper.map_to_scale(event.peak), ScaleIndex(1));
    }
}

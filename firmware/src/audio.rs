use esp_hal::{
    gpio::Output,
    i2s::master::{Error as I2sError, I2sTx},
    Blocking,
};
use heapless::Vec;
use jumpnote::audio::AudioDevice;

use crate::config::AUDIO_PENDING_BYTES;

const WORDS_PER_BURST: usize = 256;

/// 16-bit little-endian PCM out over I2S into a switched amplifier.
///
/// Bytes are queued in a bounded buffer; the amplifier is enabled and the
/// buffer pushed to I2S whenever it fills, and the tail goes out on `start`.
/// `stop` drops anything still queued and mutes the amplifier.
pub struct I2sAudioDevice<'d> {
    tx: I2sTx<'d, Blocking>,
    amp_enable: Output<'d>,
    pending: Vec<u8, AUDIO_PENDING_BYTES>,
}

impl<'d> I2sAudioDevice<'d> {
    pub fn new(tx: I2sTx<'d, Blocking>, mut amp_enable: Output<'d>) -> Self {
        amp_enable.set_low();
        Self {
            tx,
            amp_enable,
            pending: Vec::new(),
        }
    }

    fn flush(&mut self) -> Result<(), I2sError> {
        self.amp_enable.set_high();

        let whole = self.pending.len() & !1;
        let mut words = [0i16; WORDS_PER_BURST];
        for block in self.pending[..whole].chunks(WORDS_PER_BURST * 2) {
            let count = block.len() / 2;
            for (word, pair) in words.iter_mut().zip(block.chunks_exact(2)) {
                *word = i16::from_le_bytes([pair[0], pair[1]]);
            }
            self.tx.write_words(&words[..count])?;
        }

        // An odd byte waits for its partner from the next chunk.
        let carry = self.pending.get(whole).copied();
        self.pending.clear();
        if let Some(byte) = carry {
            let _ = self.pending.push(byte);
        }
        Ok(())
    }
}

impl AudioDevice for I2sAudioDevice<'_> {
    type Error = I2sError;

    fn stop(&mut self) {
        self.pending.clear();
        self.amp_enable.set_low();
    }

    fn start(&mut self) {
        if let Err(err) = self.flush() {
            log::warn!("audio: flush_failed err={:?}", err);
        }
    }

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let room = self.pending.capacity() - self.pending.len();
            let (head, tail) = rest.split_at(room.min(rest.len()));
            if self.pending.extend_from_slice(head).is_err() {
                break;
            }
            rest = tail;
            if self.pending.is_full() {
                self.flush()?;
            }
        }
        Ok(())
    }
}

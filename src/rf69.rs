//! RF69 Radio Driver
//!
//! A polling driver for RFM69 / SX1231 modules using `embedded-hal-async` traits.
//! The radio rests in receive mode between calls; there is no interrupt line.
//!
//! # Example
//!
//! ```ignore
//! let mut radio = Rf69::new(spi_device, delay);
//! radio.init(&Rf69Config::default()).await?;
//!
//! // Send a message
//! radio.transmit(b"Hello, World!", false).await?;
//!
//! // Poll for a message
//! let mut buffer = [0u8; 64];
//! if let Some(len) = radio.poll_received_packet(&mut buffer).await? {
//!     // use &buffer[..len]
//! }
//! ```

use crate::read_write::ReadWrite;
use crate::registers::Register;
use crate::settings::{
    sync_config_value, ContinuousDagc, RF69_FIFO_SIZE, RF69_LIVENESS_PATTERNS, RF69_MAX_SYNC_LEN,
    RF_BITRATE, RF_DATAMODUL_FSK_NO_SHAPING, RF_FDEV, RF_FIFOTHRESH_TXSTART_FIFONOTEMPTY, RF_FRF,
    RF_IRQFLAGS2_FIFONOTEMPTY, RF_IRQFLAGS2_FIFOOVERRUN, RF_IRQFLAGS2_PACKETSENT,
    RF_IRQFLAGS2_PAYLOADREADY, RF_PACKET1_FIXED_NO_FILTERING, RF_RXBW, RF_SYNC_OFF,
};
#[cfg(feature = "defmt")]
use defmt::{debug, trace, warn};
use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};
#[cfg(not(feature = "defmt"))]
use log::{debug, trace, warn};

/// RF69 radio driver instance.
///
/// Owns the SPI device and a delay provider used between status polls.
pub struct Rf69<SPI, D> {
    spi: SPI,
    delay: D,
    poll_interval_us: u32,
    max_poll_attempts: u32,
    current_mode: Rf69Mode,
}

/// Errors that can occur when interacting with the RF69 module.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rf69Error {
    /// SPI write operation failed.
    SpiWriteError,
    /// SPI read operation failed.
    SpiReadError,
    /// Invalid configuration provided.
    ConfigurationError,
    /// The chip did not respond within the poll budget.
    ChipNotResponding,
    /// The receive buffer filled up before the FIFO was drained.
    BufferTooSmall,
    /// Payload exceeds the 66 byte FIFO.
    PayloadTooLarge,
    /// Payload is empty.
    EmptyPayload,
}

/// Operating mode of the RF69 module.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rf69Mode {
    /// Standby mode - ready to transmit or receive.
    Standby = 0x04,
    /// Transmit mode.
    Tx = 0x0C,
    /// Receive mode.
    Rx = 0x10,
}

/// Configuration for initializing the RF69 module.
#[derive(Clone, Debug)]
pub struct Rf69Config {
    /// Sync words (up to 8 bytes).
    pub sync_words: [u8; 8],
    /// Number of sync words to use (1-8).
    pub sync_word_len: usize,
    /// Allowed bit errors in the sync word, clamped to 7.
    pub sync_tolerance: u8,
    /// Fixed payload length of received packets.
    pub receive_packet_len: u8,
    /// Delay between two status polls in microseconds.
    pub poll_interval_us: u32,
    /// Number of status polls before giving up with `ChipNotResponding`.
    pub max_poll_attempts: u32,
}

impl Default for Rf69Config {
    fn default() -> Self {
        Self {
            sync_words: [0x2D, 0xD4, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            sync_word_len: 2,
            sync_tolerance: 0,
            receive_packet_len: 64,
            poll_interval_us: 1_000,
            max_poll_attempts: 1_000,
        }
    }
}

/// Register values overridden for the duration of one transmission.
///
/// A field is set as soon as the original value has been read back, so
/// restoration covers exactly what was changed.
#[derive(Default)]
struct TxOverride {
    sync_config: Option<u8>,
    payload_length: Option<u8>,
}

impl<SPI, D> Rf69<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    /// Creates a new RF69 driver instance.
    ///
    /// No bus traffic happens here. The poll budget starts at the
    /// `Rf69Config` defaults and `current_mode` reports the chip's power-on
    /// Standby mode until [`Rf69::init`] has run.
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device for communication, owning the chip-select line
    /// * `delay` - Delay provider used between status polls
    #[must_use]
    pub fn new(spi: SPI, delay: D) -> Self {
        let config = Rf69Config::default();
        Rf69 {
            spi,
            delay,
            poll_interval_us: config.poll_interval_us,
            max_poll_attempts: config.max_poll_attempts,
            current_mode: Rf69Mode::Standby,
        }
    }

    /// Initializes the module and leaves it in receive mode.
    ///
    /// Checks the chip answers on the bus, programs 1000 bps FSK at
    /// ~433.9 MHz with fixed length packets of `receive_packet_len` bytes,
    /// and sets up the sync word. No preamble is generated by the chip.
    ///
    /// # Errors
    ///
    /// Returns `Rf69Error::ConfigurationError` if the sync word length is not
    /// within 1-8 or the packet length is not within 1-66, and
    /// `Rf69Error::ChipNotResponding` if the scratch register never reads
    /// back what was written.
    pub async fn init(&mut self, config: &Rf69Config) -> Result<(), Rf69Error> {
        if config.sync_word_len == 0 || config.sync_word_len > RF69_MAX_SYNC_LEN {
            return Err(Rf69Error::ConfigurationError);
        }
        // 0 selects unlimited length; more than the FIFO overruns before a poll
        if config.receive_packet_len == 0
            || usize::from(config.receive_packet_len) > RF69_FIFO_SIZE
        {
            return Err(Rf69Error::ConfigurationError);
        }

        self.poll_interval_us = config.poll_interval_us;
        self.max_poll_attempts = config.max_poll_attempts;

        debug!("rf69::init start");

        for pattern in RF69_LIVENESS_PATTERNS {
            self.check_liveness(pattern).await?;
        }

        self.set_mode(Rf69Mode::Standby).await?;
        self.set_modem_config().await?;
        self.write_register(Register::PacketConfig1, RF_PACKET1_FIXED_NO_FILTERING)
            .await?;
        self.clear_fifo().await?;
        self.set_preamble_length(0).await?;
        self.set_sync_words(
            config.sync_tolerance,
            &config.sync_words[..config.sync_word_len],
        )
        .await?;
        self.write_register(Register::PayloadLength, config.receive_packet_len)
            .await?;
        self.set_default_fifo_threshold().await?;
        self.set_dagc(ContinuousDagc::ImprovedLowBeta0).await?;

        self.set_mode(Rf69Mode::Rx).await?;

        debug!("rf69::init done");
        Ok(())
    }

    async fn check_liveness(&mut self, pattern: u8) -> Result<(), Rf69Error> {
        let attempts = self.max_poll_attempts.max(1);
        for attempt in 0..attempts {
            self.write_register(Register::SyncValue1, pattern).await?;
            let value = self.read_register(Register::SyncValue1).await?;
            if value == pattern {
                return Ok(());
            }
            trace!(
                "rf69: scratch register read {:#x}, expected {:#x}",
                value,
                pattern
            );
            if attempt + 1 < attempts {
                self.delay.delay_us(self.poll_interval_us).await;
            }
        }

        warn!("rf69: chip not responding after {} attempts", attempts);
        Err(Rf69Error::ChipNotResponding)
    }

    async fn set_modem_config(&mut self) -> Result<(), Rf69Error> {
        // DataModul, BitrateMsb/Lsb and FdevMsb/Lsb are contiguous
        let values = [
            RF_DATAMODUL_FSK_NO_SHAPING,
            RF_BITRATE[0],
            RF_BITRATE[1],
            RF_FDEV[0],
            RF_FDEV[1],
        ];
        self.write_many(Register::DataModul, &values).await?;
        self.write_many(Register::FrfMsb, &RF_FRF).await?;
        self.write_register(Register::RxBw, RF_RXBW).await?;
        Ok(())
    }

    async fn set_preamble_length(&mut self, preamble_length: u16) -> Result<(), Rf69Error> {
        self.write_many(Register::PreambleMsb, &preamble_length.to_be_bytes())
            .await?;
        Ok(())
    }

    async fn set_sync_words(
        &mut self,
        sync_tolerance: u8,
        sync_words: &[u8],
    ) -> Result<(), Rf69Error> {
        if sync_words.len() > RF69_MAX_SYNC_LEN || sync_words.is_empty() {
            return Err(Rf69Error::ConfigurationError);
        }

        // SyncConfig is directly followed by SyncValue1..8
        let mut buffer = [0u8; 1 + RF69_MAX_SYNC_LEN];
        buffer[0] = sync_config_value(sync_words.len() as u8, sync_tolerance);
        buffer[1..1 + sync_words.len()].copy_from_slice(sync_words);
        self.write_many(Register::SyncConfig, &buffer[..1 + sync_words.len()])
            .await?;

        Ok(())
    }

    async fn set_default_fifo_threshold(&mut self) -> Result<(), Rf69Error> {
        self.write_register(Register::FifoThresh, RF_FIFOTHRESH_TXSTART_FIFONOTEMPTY)
            .await?;
        Ok(())
    }

    async fn set_dagc(&mut self, value: ContinuousDagc) -> Result<(), Rf69Error> {
        self.write_register(Register::TestDagc, value as u8).await?;
        Ok(())
    }

    async fn clear_fifo(&mut self) -> Result<(), Rf69Error> {
        self.write_register(Register::IrqFlags2, RF_IRQFLAGS2_FIFOOVERRUN)
            .await
    }

    async fn set_mode(&mut self, mode: Rf69Mode) -> Result<(), Rf69Error> {
        self.write_register(Register::OpMode, mode as u8).await?;
        self.current_mode = mode;
        Ok(())
    }

    /// Checks for a completed packet and drains it into `buffer`.
    ///
    /// Returns `Ok(None)` after a single status read if no payload is ready.
    /// Otherwise reads the FIFO one byte at a time while it reports data and
    /// returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns `Rf69Error::BufferTooSmall` if the FIFO still holds data once
    /// `buffer` is full. The remaining bytes are discarded so the next packet
    /// starts on a clean FIFO.
    pub async fn poll_received_packet(
        &mut self,
        buffer: &mut [u8],
    ) -> Result<Option<usize>, Rf69Error> {
        if (self.read_register(Register::IrqFlags2).await? & RF_IRQFLAGS2_PAYLOADREADY) == 0 {
            return Ok(None);
        }

        let mut received = 0;
        while (self.read_register(Register::IrqFlags2).await? & RF_IRQFLAGS2_FIFONOTEMPTY) != 0 {
            if received == buffer.len() {
                warn!("rf69: packet larger than {} byte buffer, dropped", buffer.len());
                self.clear_fifo().await?;
                return Err(Rf69Error::BufferTooSmall);
            }
            buffer[received] = self.read_register(Register::Fifo).await?;
            received += 1;
        }

        trace!("rf69: received {} bytes", received);
        Ok(Some(received))
    }

    /// Sends a packet and returns to receive mode.
    ///
    /// The chip's payload length is set to `data.len()` for the transmission
    /// and restored afterwards. With `suppress_sync` the chip sends no sync
    /// word, so the caller can frame the packet itself; the sync
    /// configuration is restored afterwards as well.
    ///
    /// # Errors
    ///
    /// Returns `Rf69Error::EmptyPayload` or `Rf69Error::PayloadTooLarge`
    /// (more than 66 bytes) without touching the bus, and
    /// `Rf69Error::ChipNotResponding` if the packet is not reported sent in
    /// time. Overridden registers and receive mode are restored on every
    /// error after the transmission started.
    pub async fn transmit(&mut self, data: &[u8], suppress_sync: bool) -> Result<(), Rf69Error> {
        if data.is_empty() {
            return Err(Rf69Error::EmptyPayload);
        }
        if data.len() > RF69_FIFO_SIZE {
            return Err(Rf69Error::PayloadTooLarge);
        }

        debug!(
            "rf69: transmit {} bytes, sync suppressed: {}",
            data.len(),
            suppress_sync
        );

        let mut saved = TxOverride::default();
        let sent = self.send_packet(data, suppress_sync, &mut saved).await;
        let restored = self.restore(saved).await;
        sent.and(restored)
    }

    async fn send_packet(
        &mut self,
        data: &[u8],
        suppress_sync: bool,
        saved: &mut TxOverride,
    ) -> Result<(), Rf69Error> {
        // Abort any reception in progress
        self.set_mode(Rf69Mode::Standby).await?;
        self.clear_fifo().await?;

        if suppress_sync {
            saved.sync_config = Some(self.read_register(Register::SyncConfig).await?);
            self.write_register(Register::SyncConfig, RF_SYNC_OFF).await?;
        }

        saved.payload_length = Some(self.read_register(Register::PayloadLength).await?);
        self.write_register(Register::PayloadLength, data.len() as u8)
            .await?;

        self.write_many(Register::Fifo, data).await?;

        self.set_mode(Rf69Mode::Tx).await?;
        self.wait_packet_sent().await
    }

    async fn wait_packet_sent(&mut self) -> Result<(), Rf69Error> {
        let attempts = self.max_poll_attempts.max(1);
        for attempt in 0..attempts {
            if (self.read_register(Register::IrqFlags2).await? & RF_IRQFLAGS2_PACKETSENT) != 0 {
                return Ok(());
            }
            if attempt + 1 < attempts {
                self.delay.delay_us(self.poll_interval_us).await;
            }
        }

        warn!("rf69: packet not sent after {} polls", attempts);
        Err(Rf69Error::ChipNotResponding)
    }

    /// Every step runs even if an earlier one failed; the first error is kept.
    async fn restore(&mut self, saved: TxOverride) -> Result<(), Rf69Error> {
        let mut restored = Ok(());
        if let Some(sync_config) = saved.sync_config {
            // SyncConfig may only be rewritten outside of TX
            restored = restored.and(self.set_mode(Rf69Mode::Standby).await);
            restored = restored.and(
                self.write_register(Register::SyncConfig, sync_config)
                    .await,
            );
        }
        if let Some(payload_length) = saved.payload_length {
            restored = restored.and(
                self.write_register(Register::PayloadLength, payload_length)
                    .await,
            );
        }
        restored.and(self.set_mode(Rf69Mode::Rx).await)
    }

    /// Reads the chip revision/version register.
    ///
    /// Should return 0x24 for RFM69 modules.
    pub async fn read_revision(&mut self) -> Result<u8, Rf69Error> {
        self.read_register(Register::Version).await
    }

    /// Reads the current RSSI (Received Signal Strength Indicator).
    ///
    /// # Returns
    ///
    /// Returns the RSSI value in -dBm (e.g., 40 means -40 dBm).
    pub async fn rssi(&mut self) -> Result<u8, Rf69Error> {
        let rssi = self.read_register(Register::RssiValue).await?;
        Ok(rssi / 2)
    }

    /// Returns the mode the driver last put the chip in.
    #[must_use]
    pub fn current_mode(&self) -> Rf69Mode {
        self.current_mode
    }

    /// Releases the SPI device and delay provider.
    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }

    async fn write_register(&mut self, register: Register, value: u8) -> Result<(), Rf69Error> {
        self.write_many(register, &[value]).await?;
        Ok(())
    }

    async fn read_register(&mut self, register: Register) -> Result<u8, Rf69Error> {
        let mut buffer = [0u8; 1];
        self.read_many(register, &mut buffer).await?;
        Ok(buffer[0])
    }

    async fn write_many(&mut self, register: Register, values: &[u8]) -> Result<(), Rf69Error> {
        self.spi
            .write_many(register, values)
            .await
            .map_err(|_| Rf69Error::SpiWriteError)?;
        Ok(())
    }

    async fn read_many(&mut self, register: Register, buffer: &mut [u8]) -> Result<(), Rf69Error> {
        self.spi
            .read_many(register, buffer)
            .await
            .map_err(|_| Rf69Error::SpiReadError)?;
        Ok(())
    }
}

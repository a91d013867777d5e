//! Fixed modem settings and register bit layouts.

/// Size of the chip's FIFO in bytes.
pub const RF69_FIFO_SIZE: usize = 66;

/// Maximum number of sync word bytes.
pub const RF69_MAX_SYNC_LEN: usize = 8;

/// Packet mode, FSK, no shaping.
pub const RF_DATAMODUL_FSK_NO_SHAPING: u8 = 0x00;

/// Bit rate: 32 MHz / 0x7D00 = 1000 bps.
pub const RF_BITRATE: [u8; 2] = [0x7D, 0x00];

/// Frequency deviation: 0x019A * 61 Hz ~= 25 kHz.
pub const RF_FDEV: [u8; 2] = [0x01, 0x9A];

/// Carrier frequency: 0x6C7AFF * 61 Hz ~= 433.9 MHz.
pub const RF_FRF: [u8; 3] = [0x6C, 0x7A, 0xFF];

/// Receiver channel filter bandwidth (DccFreq 010, mantissa 20, exponent 2).
pub const RF_RXBW: u8 = 0x42;

/// Fixed length packets, no address filtering, no CRC.
pub const RF_PACKET1_FIXED_NO_FILTERING: u8 = 0x00;

/// TxStartCondition = FifoNotEmpty, threshold 0.
pub const RF_FIFOTHRESH_TXSTART_FIFONOTEMPTY: u8 = 0x80;

pub const RF_SYNC_ON: u8 = 0x80;
pub const RF_SYNC_OFF: u8 = 0x00;
pub const RF_SYNC_TOLERANCE_MAX: u8 = 0x07;

pub const RF_IRQFLAGS2_FIFONOTEMPTY: u8 = 0x40;
/// Writing this bit clears the FIFO and the packet flags.
pub const RF_IRQFLAGS2_FIFOOVERRUN: u8 = 0x10;
pub const RF_IRQFLAGS2_PACKETSENT: u8 = 0x08;
pub const RF_IRQFLAGS2_PAYLOADREADY: u8 = 0x04;

/// Sentinels written to a scratch register to check the chip is alive.
pub const RF69_LIVENESS_PATTERNS: [u8; 2] = [0xAA, 0x55];

/// Continuous DAGC setting for the TestDagc register.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContinuousDagc {
    Normal = 0x00,
    /// Improved margin, use when AfcLowBetaOn = 0.
    ImprovedLowBeta0 = 0x20,
    /// Improved margin, use when AfcLowBetaOn = 1.
    ImprovedLowBeta1 = 0x30,
}

/// Encodes the SyncConfig register for a sync word of `len` bytes.
///
/// `len` must be within 1..=8; the tolerance is clamped to 7 bit errors.
pub const fn sync_config_value(len: u8, tolerance: u8) -> u8 {
    let tolerance = if tolerance > RF_SYNC_TOLERANCE_MAX {
        RF_SYNC_TOLERANCE_MAX
    } else {
        tolerance
    };
    RF_SYNC_ON | ((len.saturating_sub(1) & 0x07) << 3) | tolerance
}

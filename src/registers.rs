//! Register map of the RFM69 / SX1231.
//!
//! Only the registers the driver touches are listed. Burst accesses rely on
//! the chip's address auto-increment, so e.g. writing five bytes starting at
//! [`Register::DataModul`] also programs the bit rate and deviation registers.

/// Addressable register of the radio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    Fifo = 0x00,
    OpMode = 0x01,
    DataModul = 0x02,
    BitrateMsb = 0x03,
    BitrateLsb = 0x04,
    FdevMsb = 0x05,
    FdevLsb = 0x06,
    FrfMsb = 0x07,
    FrfMid = 0x08,
    FrfLsb = 0x09,
    Version = 0x10,
    RxBw = 0x19,
    RssiValue = 0x24,
    IrqFlags1 = 0x27,
    IrqFlags2 = 0x28,
    PreambleMsb = 0x2C,
    PreambleLsb = 0x2D,
    SyncConfig = 0x2E,
    SyncValue1 = 0x2F,
    PacketConfig1 = 0x37,
    PayloadLength = 0x38,
    FifoThresh = 0x3C,
    TestDagc = 0x6F,
}

impl Register {
    /// Raw 7-bit address.
    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// First byte of a read access: address with the write bit clear.
    #[inline]
    pub const fn read(self) -> u8 {
        self.addr() & 0x7F
    }

    /// First byte of a write access: address with the write bit set.
    #[inline]
    pub const fn write(self) -> u8 {
        self.addr() | 0x80
    }
}

use crate::registers::Register;
use embedded_hal::spi::Operation;
use embedded_hal_async::spi::SpiDevice;

/// Register-level access over a chip-select bracketed SPI device.
///
/// Each call is exactly one `SpiDevice` transaction: the device asserts
/// chip-select and owns the bus for the address byte and the data phase.
pub(crate) trait ReadWrite {
    type Error;

    /// Writes `values` starting at `register`, auto-incrementing the address
    /// (except for the FIFO).
    async fn write_many(&mut self, register: Register, values: &[u8]) -> Result<(), Self::Error>;

    /// Fills `buffer` starting at `register`, clocking out dummy bytes.
    async fn read_many(&mut self, register: Register, buffer: &mut [u8])
        -> Result<(), Self::Error>;
}

impl<SPI> ReadWrite for SPI
where
    SPI: SpiDevice<u8>,
{
    type Error = SPI::Error;

    async fn write_many(&mut self, register: Register, values: &[u8]) -> Result<(), Self::Error> {
        self.transaction(&mut [
            Operation::Write(&[register.write()]),
            Operation::Write(values),
        ])
        .await
    }

    async fn read_many(
        &mut self,
        register: Register,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        buffer.fill(0);
        self.transaction(&mut [
            Operation::Write(&[register.read()]),
            Operation::TransferInPlace(buffer),
        ])
        .await
    }
}

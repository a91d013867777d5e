//! # RF69 Radio Driver
//!
//! A polling, `no_std` compatible driver for RFM69 / SX1231 FSK radio modules.
//!
//! The driver talks to the chip through an `embedded-hal-async` [`SpiDevice`],
//! which brackets every register access with the chip-select line. It
//! configures the radio once for 1000 bps FSK around 433.9 MHz, then offers
//! exactly two packet operations: polling for a received packet and sending
//! one. Between calls the radio always rests in receive mode.
//!
//! ## Features
//!
//! - No interrupt line needed, all waiting is bounded status polling
//! - Fixed length packets with a configurable 1-8 byte sync word
//! - Per-packet sync word suppression for caller-framed transmissions
//! - Logging through `log`, or through `defmt` with the `defmt` feature
//!
//! ## Example
//!
//! ```ignore
//! use rf69::{Rf69, Rf69Config};
//!
//! let mut radio = Rf69::new(spi_device, delay);
//! radio.init(&Rf69Config::default()).await?;
//!
//! radio.transmit(b"Hello!", false).await?;
//!
//! let mut buf = [0u8; 64];
//! loop {
//!     if let Some(len) = radio.poll_received_packet(&mut buf).await? {
//!         // handle &buf[..len]
//!     }
//! }
//! ```
//!
//! [`SpiDevice`]: embedded_hal_async::spi::SpiDevice

#![cfg_attr(not(test), no_std)]

pub mod registers;
pub mod rf69;
pub mod settings;

mod read_write;

// Re-export commonly used types for convenience
pub use rf69::{Rf69, Rf69Config, Rf69Error, Rf69Mode};

//! # qrforge
//!
//! A Rust library for encoding QR codes with Reed-Solomon error correction,
//! automatic mask selection and PNG/SVG rendering.
//!
//! ## Features
//!
//! - **QR Code Generation**: Versions 1-40 with numeric, alphanumeric, byte and kanji modes
//! - **Reed-Solomon Error Correction**: Configurable levels (L, M, Q, H) with automatic boosting
//! - **Mask Selection**: Scores all 8 patterns with the standard penalty rules
//! - **Rendering**: PNG via the `image` crate, SVG markup, and terminal output
//!
//! ## Quick Start
//!
//! ```rust
//! use qrforge::{ECLevel, QRBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::new(b"Hello, world!").ec_level(ECLevel::L).build()?;
//!
//! let img = qr.to_image(4); // 4 pixels per module
//! # Ok(())
//! # }
//! ```
//!
//! ## Full Configuration
//!
//! ```rust
//! use qrforge::{ECLevel, MaskPattern, QRBuilder, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::new(b"Hello, world!")
//!     .version_range(Version::new(2), Version::new(10))
//!     .ec_level(ECLevel::Q)      // Defaults to ECLevel::M
//!     .mask(MaskPattern::new(3)) // If not provided, finds the best mask
//!     .boost_ecl(false)          // Enabled by default
//!     .build()?;
//!
//! assert_eq!(qr.version(), Version::new(2));
//! # Ok(())
//! # }
//! ```
//!
//! ## Rendering to Files
//!
//! ```rust,no_run
//! use qrforge::render::{save_png, save_svg, RenderConfig};
//! use qrforge::{encode_text, ECLevel};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = encode_text("https://example.com", ECLevel::M)?;
//! let config = RenderConfig::new(10, 4);
//! save_png(&qr, &config, "example.png")?;
//! save_svg(&qr, &config, "example.svg")?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub(crate) mod common;
pub mod render;

pub use builder::{
    encode_bytes, encode_segments, encode_segments_advanced, encode_text,
    qr::{Module, QrCode},
    QRBuilder,
};
pub use common::{
    bitstream::BitStream,
    codec::{Mode, Segment},
    error::{QRError, QRResult},
    mask::MaskPattern,
    metadata::{Color, ECLevel, Version},
};
pub use render::RenderConfig;

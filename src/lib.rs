//! # qrforge
//!
//! A Rust library for generating QR codes with Reed-Solomon error correction.
//! Encodes arbitrary bytes in byte mode into symbols of versions 1 to 40.
//!
//! ## Features
//!
//! - **QR Code Generation**: Smallest fitting version is chosen automatically, or forced
//! - **Reed-Solomon Error Correction**: Four levels (L, M, Q, H) over GF(256)
//! - **Mask Selection**: All eight masks are scored and the lowest penalty wins
//! - **Rendering**: Square or circular modules, quiet zone, scale and a debug palette
//! - **Payload Helpers**: Wi-Fi and SMS strings ready to be encoded
//!
//! ## Quick Start
//!
//! ### Simple QR Code Generation
//!
//! ```rust
//! use qrforge::{QRBuilder, RenderOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Simplest usage - provide only data, all other settings are automatically chosen
//! let qr = QRBuilder::new(b"Hello, World!").build()?;
//!
//! let img = qr.render(&RenderOptions::default())?;
//! assert_eq!(img.width(), 290);
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use qrforge::{ECLevel, MaskPattern, QRBuilder, RenderOptions, Shape, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = "Hello, World!";
//! let qr = QRBuilder::new(data.as_bytes())
//!     .version(Version::new(2)?)     // QR version (size) - if not provided, finds smallest version to fit data
//!     .ec_level(ECLevel::try_from('Q')?) // Error correction level - if not provided, defaults to ECLevel::M
//!     .mask(MaskPattern::new(3)?)    // Mask pattern - if not provided, finds best mask based on penalty score
//!     .build()?;
//!
//! let opts = RenderOptions::default().scale(4)?.default_shape(Shape::Circle);
//! let img = qr.render(&opts)?;
//! img.save("configured_qr.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## QR Code Components
//!
//! ### Versions
//! Versions 1-40, with sizes from 21x21 to 177x177 modules
//!
//! ### Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;
pub mod payload;
pub mod render;

pub use builder::{Module, ModuleKind, QRBuilder, QR};
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{Color, ECLevel, Metadata, Version};
pub use common::tables::SpecTables;
pub use render::{ColorMode, RenderOptions, Shape};

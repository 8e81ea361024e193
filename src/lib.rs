//! # qrmatrix
//!
//! A Rust library for encoding text into QR Code Model 2 symbols.
//!
//! `qrmatrix` picks the densest segment mode for each piece of text (numeric, alphanumeric or
//! byte), finds the smallest version from 1 to 40 that fits, optionally raises the error
//! correction level for free, places the codewords with Reed-Solomon ECC and chooses the mask
//! with the lowest penalty. The finished symbol can be queried module by module or rendered as
//! terminal text, SVG or an image.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrmatrix = "0.1"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use qrmatrix::{QrCode, QrCodeEcc, QrOptions};
//!
//! let options = QrOptions {
//!     ecl: QrCodeEcc::Low,
//!     ..QrOptions::default()
//! };
//! let qr = QrCode::generate(&["ORDER-", "1234567", "/abc"], &options).unwrap();
//! assert_eq!(qr.dimension(), qr.version().dimension());
//! println!("{}", qrmatrix::helper::to_text_medium(&qr));
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Symbol generation, options, versions, masks and error correction levels.
//! - [`segment`]: Segment modes and their bit encodings.
//! - [`matrix`]: The module grid, function patterns, data placement and penalty scoring.
//! - [`helper`]: Text, SVG and image renderers.

pub mod bitbuffer;
pub mod error;
pub mod helper;
pub mod matrix;
pub mod metadata;
pub mod qrcode;
pub mod reed_solomon;
pub mod segment;
pub mod tables;

pub use error::{QrError, Result};
pub use matrix::{FunctionPattern, Matrix};
pub use qrcode::{Mask, QrCode, QrCodeEcc, QrOptions, Version};
pub use segment::{QrSegment, QrSegmentMode};

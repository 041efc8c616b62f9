//! Steganography and steganalysis for images and plain text.
//!
//! Hides text messages inside RGB images with the KJB, LSB matching
//! revisited, INMI and IMNP methods, and inside plain text with whitespace,
//! zero-width and homoglyph channels. The analysis suite compares covers
//! with stego images (PSNR, chi-square, AUMP, RS analysis, compression
//! residual) and renders visual attack images.
//!
//! Every routine is a pure function over an [`image::RgbImage`] or a string.
//! The [`cli`] module wraps them in a command line interface.
pub mod analysis;
pub mod bitstream;
pub mod cli;
pub mod pixels;
pub mod stego;
pub mod text;

pub use analysis::{AnalysisConfig, AnalysisError, AnalysisReport};
pub use pixels::Channel;
pub use stego::{ImageMethod, KjbParams, StegoError};
pub use text::TextMethod;

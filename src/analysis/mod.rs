//! Statistical analysis of cover/stego image pairs.
//!
//! - [`metrics`]: capacity estimate, PSNR, compression residual and the
//!   visual attack image
//! - [`chi_square`]: pairs-of-values chi-square statistic
//! - [`aump`]: polynomial-prediction AUMP statistic and block variance
//! - [`rs`]: Fridrich RS analysis
//!
//! [`analyze`] runs the whole suite and collects an [`AnalysisReport`].
//! Every statistic works on the gray sample (red channel) unless a channel
//! is passed explicitly. Degenerate inputs such as empty images yield `0.0`.
use image::RgbImage;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::pixels::{Channel, gray};

pub mod aump;
pub mod chi_square;
pub mod metrics;
pub mod rs;

pub use metrics::ChannelPsnr;
pub use rs::{RsAnalysis, RsReport};

/// Errors that can be emitted while comparing two images
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError
{
    #[error(
        "cover is {}x{} but stego is {}x{}",
        cover.0,
        cover.1,
        stego.0,
        stego.1
    )]
    DimensionMismatch
    {
        /// Width and height of the cover image
        cover: (u32, u32),
        /// Width and height of the stego image
        stego: (u32, u32),
    },
}

/// Returns an error unless both images have the same dimensions.
///
/// # Errors
///
/// Returns [`AnalysisError::DimensionMismatch`] on differing sizes.
pub fn ensure_same_dimensions(
    cover: &RgbImage,
    stego: &RgbImage,
) -> Result<(), AnalysisError>
{
    if cover.dimensions() == stego.dimensions()
    {
        Ok(())
    }
    else
    {
        Err(AnalysisError::DimensionMismatch {
            cover: cover.dimensions(),
            stego: stego.dimensions(),
        })
    }
}

/// Parameters of [`analyze`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AnalysisConfig
{
    /// Tile edge of the chi-square test
    pub chi_square_block: u32,
    /// Tile edge of the AUMP test
    pub aump_block: u32,
    /// Degree of the AUMP predictor polynomial
    pub aump_degree: usize,
    /// Channel RS analysis runs on
    pub rs_channel: Channel,
    /// Whether RS groups overlap
    pub rs_overlap: bool,
}

impl Default for AnalysisConfig
{
    fn default() -> Self
    {
        Self {
            chi_square_block: 16,
            aump_block: 4,
            aump_degree: 2,
            rs_channel: Channel::Red,
            rs_overlap: true,
        }
    }
}

/// Metrics of one cover/stego pair
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisReport
{
    /// Capacity estimate of the cover as `bits / 8`, a byte count. The
    /// field keeps its `_kb` name for JSON consumers.
    pub capacity_kb: f64,
    /// Gray channel PSNR in dB, infinite for identical images
    pub psnr_db: f64,
    /// Per channel PSNR
    pub channel_psnr: ChannelPsnr,
    /// Chi-square statistic of the stego image
    pub chi_square: f64,
    /// AUMP statistic of the stego image
    pub aump: f64,
    /// RMS difference between cover and stego
    pub compression: f64,
    /// RS analysis of the stego image
    pub rs: RsReport,
}

/// Runs every statistic on `cover` and `stego`.
///
/// # Errors
///
/// Returns [`AnalysisError::DimensionMismatch`] when the images differ in
/// size.
pub fn analyze(
    cover: &RgbImage,
    stego: &RgbImage,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError>
{
    ensure_same_dimensions(cover, stego)?;
    debug!(?config, width = cover.width(), height = cover.height(), "analyze");

    Ok(AnalysisReport {
        capacity_kb: metrics::capacity(cover) as f64 / 8.0,
        psnr_db: metrics::psnr(cover, stego)?,
        channel_psnr: metrics::psnr_channels(cover, stego)?,
        chi_square: chi_square::chi_square(stego, config.chi_square_block),
        aump: aump::aump(stego, config.aump_block, config.aump_degree),
        compression: metrics::compression(cover, stego)?,
        rs: RsAnalysis::default().analyze(
            stego,
            config.rs_channel,
            config.rs_overlap,
        ),
    })
}

/// Gray samples of each `block_size` square tile.
///
/// Tiles are visited column by column and so are the samples inside a
/// tile. Tiles on the right and bottom edges may be partial. A block size
/// of zero yields no tiles.
pub(crate) fn tiles(
    image: &RgbImage,
    block_size: u32,
) -> impl Iterator<Item = Vec<u8>> + '_
{
    let (width, height) = image.dimensions();
    let step = block_size.max(1) as usize;
    let origins = if block_size == 0 { 0 } else { width };

    (0..origins).step_by(step).flat_map(move |x0| {
        (0..height).step_by(step).map(move |y0| {
            let x_end = x0.saturating_add(block_size).min(width);
            let y_end = y0.saturating_add(block_size).min(height);
            (x0..x_end)
                .flat_map(|x| (y0..y_end).map(move |y| gray(image, x, y)))
                .collect()
        })
    })
}

//! Polynomial-prediction AUMP statistic.
//!
//! The gray samples of each tile are indexed `1..=N` and fitted with a
//! polynomial of the given degree, `H[i][j] = (i + 1)^j`, by least squares.
//! The normal equations `HᵀH p = Hᵀx` are solved by LU decomposition. With
//! residuals `r`, residual variance `s² = Σr² / N` and weight `w = √(s²/N)`,
//! a tile contributes `w Σ (x - x̄) r` where `x̄` is `x` with its LSB
//! flipped. The statistic is the mean contribution over all tiles holding
//! at least `degree + 1` samples.
use image::RgbImage;

use super::tiles;

/// Mean AUMP contribution of the tiles of `image`.
///
/// Returns `0.0` when no tile has enough samples for the fit.
#[must_use]
pub fn aump(image: &RgbImage, block_size: u32, degree: usize) -> f64
{
    let terms = degree + 1;
    let mut beta = 0.0;
    let mut tile_count = 0usize;

    for samples in tiles(image, block_size)
    {
        if samples.len() < terms
        {
            continue;
        }
        tile_count += 1;

        let contribution = tile_contribution(&samples, terms);
        if contribution.is_finite()
        {
            beta += contribution;
        }
    }

    if tile_count == 0 { 0.0 } else { beta / tile_count as f64 }
}

/// Sum over all tiles of the sample variance of the tile.
#[must_use]
pub fn block_variance(image: &RgbImage, block_size: u32) -> f64
{
    tiles(image, block_size)
        .filter(|samples| !samples.is_empty())
        .map(|samples| {
            let count = samples.len() as f64;
            let mean =
                samples.iter().map(|&sample| f64::from(sample)).sum::<f64>()
                    / count;
            samples
                .iter()
                .map(|&sample| (f64::from(sample) - mean).powi(2))
                .sum::<f64>()
                / count
        })
        .sum()
}

fn tile_contribution(samples: &[u8], terms: usize) -> f64
{
    let values: Vec<f64> =
        samples.iter().map(|&sample| f64::from(sample)).collect();
    let Some(predicted) = polynomial_prediction(&values, terms)
    else
    {
        return 0.0;
    };

    let residuals: Vec<f64> = values
        .iter()
        .zip(&predicted)
        .map(|(value, prediction)| value - prediction)
        .collect();
    let count = residuals.len() as f64;
    let variance = residuals.iter().map(|r| r * r).sum::<f64>() / count;
    let weight = (variance / count).sqrt();

    // x - x̄ is +1 for odd samples and -1 for even ones
    let statistic: f64 = samples
        .iter()
        .zip(&residuals)
        .map(|(&sample, residual)| {
            let flip = if sample % 2 == 1 { 1.0 } else { -1.0 };
            flip * residual
        })
        .sum();

    weight * statistic
}

/// Least-squares fit of `values` by a polynomial with `terms` coefficients,
/// evaluated at every sample index.
fn polynomial_prediction(values: &[f64], terms: usize) -> Option<Vec<f64>>
{
    let design: Vec<Vec<f64>> = (0..values.len())
        .map(|i| {
            let base = (i + 1) as f64;
            (0..terms).map(|j| base.powi(j as i32)).collect()
        })
        .collect();

    let normal: Vec<Vec<f64>> = (0..terms)
        .map(|i| {
            (0..terms)
                .map(|j| design.iter().map(|row| row[i] * row[j]).sum())
                .collect()
        })
        .collect();
    let rhs: Vec<f64> = (0..terms)
        .map(|i| design.iter().zip(values).map(|(row, v)| row[i] * v).sum())
        .collect();

    let coefficients = solve_lu(&normal, &rhs)?;
    Some(
        design
            .iter()
            .map(|row| row.iter().zip(&coefficients).map(|(h, p)| h * p).sum())
            .collect(),
    )
}

/// Solves `a x = b` by Crout decomposition into a lower triangular `L` and
/// a unit upper triangular `U`, then forward and back substitution.
///
/// Returns `None` when a pivot vanishes.
fn solve_lu(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>>
{
    let n = a.len();
    let mut lower = vec![vec![0.0; n]; n];
    let mut upper = vec![vec![0.0; n]; n];

    for i in 0..n
    {
        upper[i][i] = 1.0;
        for j in i..n
        {
            let sum: f64 = (0..i).map(|k| lower[j][k] * upper[k][i]).sum();
            lower[j][i] = a[j][i] - sum;
        }

        let pivot = lower[i][i];
        if pivot == 0.0 || !pivot.is_finite()
        {
            return None;
        }
        for j in i + 1..n
        {
            let sum: f64 = (0..i).map(|k| lower[i][k] * upper[k][j]).sum();
            upper[i][j] = (a[i][j] - sum) / pivot;
        }
    }

    let mut y = vec![0.0; n];
    for i in 0..n
    {
        let sum: f64 = (0..i).map(|j| lower[i][j] * y[j]).sum();
        y[i] = (b[i] - sum) / lower[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev()
    {
        let sum: f64 = (i + 1..n).map(|j| upper[i][j] * x[j]).sum();
        x[i] = y[i] - sum;
    }

    Some(x)
}

//! RS steganalysis (Fridrich, Goljan, Du).
//!
//! The image is cut into `m x n` groups. Each group is measured with the
//! discrimination function
//!
//! ```text
//! f(g) = |g0 - g1| + |g3 - g2| + |g1 - g3| + |g2 - g0|
//! ```
//!
//! applied to every run of four samples. A checkerboard mask and its
//! inverse select the samples to flip: `F1` swaps `2k <-> 2k + 1`, `F-1`
//! swaps `2k - 1 <-> 2k`. A group is regular when flipping increases `f`,
//! singular when it decreases it and unusable otherwise. Counting the
//! groups for `F1` and `F-1`, on the image and on a copy with every LSB
//! flipped, gives the quadratic whose smallest root estimates the embedded
//! message length.
use std::cmp::Ordering;

use image::RgbImage;
use serde::Serialize;
use tracing::debug;

use crate::pixels::{Channel, channel};

/// RS analysis with an `m x n` group mask
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RsAnalysis
{
    m: u32,
    n: u32,
}

impl Default for RsAnalysis
{
    fn default() -> Self
    {
        Self::new(2, 2)
    }
}

/// Group classification counts of one pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GroupCounts
{
    /// Regular groups under the positive mask
    pub regular: usize,
    /// Singular groups under the positive mask
    pub singular: usize,
    /// Regular groups under the negative mask
    pub negative_regular: usize,
    /// Singular groups under the negative mask
    pub negative_singular: usize,
    /// Groups left unchanged by the positive mask
    pub unusable: usize,
}

/// Result of [`RsAnalysis::analyze`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RsReport
{
    /// Counts on the image as given
    pub groups: GroupCounts,
    /// Counts on the image with every LSB flipped
    pub flipped_groups: GroupCounts,
    /// Number of groups classified under the positive mask
    pub total_groups: usize,
    /// Estimated share of flipped LSBs
    pub estimated_flipped_percent: f64,
    /// Estimated message length relative to the pixel count
    pub message_length_percent: f64,
    /// Estimated message length in bytes, three channels per pixel
    pub message_length_bytes: f64,
}

impl RsReport
{
    /// Number of entries of [`Self::to_array`]
    pub const LEN: usize = 28;

    /// Label of every entry of [`Self::to_array`]
    pub const NAMES: [&'static str; Self::LEN] = [
        "Number of regular groups (positive)",
        "Number of singular groups (positive)",
        "Number of regular groups (negative)",
        "Number of singular groups (negative)",
        "Difference for regular groups",
        "Difference for singular groups",
        "Percentage of regular groups (positive)",
        "Percentage of singular groups (positive)",
        "Percentage of regular groups (negative)",
        "Percentage of singular groups (negative)",
        "Difference for regular groups %",
        "Difference for singular groups %",
        "Number of regular groups (positive for all flipped)",
        "Number of singular groups (positive for all flipped)",
        "Number of regular groups (negative for all flipped)",
        "Number of singular groups (negative for all flipped)",
        "Difference for regular groups (all flipped)",
        "Difference for singular groups (all flipped)",
        "Percentage of regular groups (positive for all flipped)",
        "Percentage of singular groups (positive for all flipped)",
        "Percentage of regular groups (negative for all flipped)",
        "Percentage of singular groups (negative for all flipped)",
        "Difference for regular groups (all flipped) %",
        "Difference for singular groups (all flipped) %",
        "Total number of groups",
        "Estimated percent of flipped pixels",
        "Estimated message length (in percent of pixels)(p)",
        "Estimated message length (in bytes)",
    ];

    /// Flat vector of all results, in the order of [`Self::NAMES`].
    ///
    /// Percentages are relative to [`Self::total_groups`] and are zero when
    /// no group was classified.
    #[must_use]
    pub fn to_array(&self) -> [f64; Self::LEN]
    {
        let total = self.total_groups as f64;
        let percent = |value: f64| {
            if total == 0.0 { 0.0 } else { value / total * 100.0 }
        };

        let mut results = [0.0; Self::LEN];
        for (counts, slice) in [self.groups, self.flipped_groups]
            .iter()
            .zip(results.chunks_exact_mut(12))
        {
            let regular = counts.regular as f64;
            let singular = counts.singular as f64;
            let negative_regular = counts.negative_regular as f64;
            let negative_singular = counts.negative_singular as f64;
            let regular_difference = (regular - negative_regular).abs();
            let singular_difference = (singular - negative_singular).abs();

            slice.copy_from_slice(&[
                regular,
                singular,
                negative_regular,
                negative_singular,
                regular_difference,
                singular_difference,
                percent(regular),
                percent(singular),
                percent(negative_regular),
                percent(negative_singular),
                percent(regular_difference),
                percent(singular_difference),
            ]);
        }

        results[24] = total;
        results[25] = self.estimated_flipped_percent;
        results[26] = self.message_length_percent;
        results[27] = self.message_length_bytes;
        results
    }

    /// Pairs of [`Self::NAMES`] and [`Self::to_array`].
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)>
    {
        Self::NAMES.into_iter().zip(self.to_array())
    }
}

impl RsAnalysis
{
    /// Creates an analysis with an `m` wide and `n` tall group.
    ///
    /// Zero sizes are raised to one. Only complete runs of four samples
    /// count towards the discrimination function, so `m * n` should be a
    /// multiple of four.
    #[must_use]
    pub fn new(m: u32, n: u32) -> Self
    {
        Self {
            m: m.max(1),
            n: n.max(1),
        }
    }

    /// Runs RS analysis on one colour channel of `image`.
    ///
    /// With `overlap` groups start at every pixel, otherwise they tile the
    /// image. Degenerate results, such as an image smaller than a group,
    /// report zeros.
    #[must_use]
    pub fn analyze(
        &self,
        image: &RgbImage,
        colour: Channel,
        overlap: bool,
    ) -> RsReport
    {
        let groups = self.classify(image, colour, overlap, false);
        let flipped_groups = self.classify(image, colour, overlap, true);
        let total_groups = groups.regular + groups.singular + groups.unusable;

        let x = estimate_root(&groups, &flipped_groups);
        let estimated_flipped_percent = if x == 1.0
        {
            0.0
        }
        else
        {
            (x / (2.0 * (x - 1.0))).abs()
        };
        let message_length_percent =
            if x == 0.5 { 0.0 } else { (x / (x - 0.5)).abs() };
        let channel_count =
            image.width() as f64 * image.height() as f64 * 3.0;

        debug!(
            ?colour,
            overlap,
            total_groups,
            root = x,
            message_length_percent,
            "rs analysis"
        );

        RsReport {
            groups,
            flipped_groups,
            total_groups,
            estimated_flipped_percent,
            message_length_percent,
            message_length_bytes: channel_count * message_length_percent / 8.0,
        }
    }

    /// Classifies every group twice, once per mask.
    fn classify(
        &self,
        image: &RgbImage,
        colour: Channel,
        overlap: bool,
        flip_all: bool,
    ) -> GroupCounts
    {
        let masks = self.masks();
        let mut counts = GroupCounts::default();

        for (x0, y0) in self.group_origins(image, overlap)
        {
            let group: Vec<i32> = (0..self.n)
                .flat_map(|dy| (0..self.m).map(move |dx| (x0 + dx, y0 + dy)))
                .map(|(x, y)| i32::from(channel(image, x, y, colour)))
                .map(|value| {
                    if flip_all { flip_positive(value) } else { value }
                })
                .collect();
            let base = variation(&group);

            for mask in &masks
            {
                let positive = variation(&apply(&group, mask, flip_positive));
                let negative = variation(&apply(&group, mask, flip_negative));

                match positive.cmp(&base)
                {
                    Ordering::Greater => counts.regular += 1,
                    Ordering::Less => counts.singular += 1,
                    Ordering::Equal => counts.unusable += 1,
                }
                match negative.cmp(&base)
                {
                    Ordering::Greater => counts.negative_regular += 1,
                    Ordering::Less => counts.negative_singular += 1,
                    Ordering::Equal => {},
                }
            }
        }

        counts
    }

    /// Checkerboard mask starting with a flip, and its inverse.
    fn masks(&self) -> [Vec<bool>; 2]
    {
        let checkerboard: Vec<bool> = (0..self.n)
            .flat_map(|row| (0..self.m).map(move |col| row % 2 == col % 2))
            .collect();
        let inverse = checkerboard.iter().map(|&flip| !flip).collect();
        [checkerboard, inverse]
    }

    /// Top-left corners of the groups that fit inside the image.
    ///
    /// Origins stop one pixel short of the right and bottom edges.
    fn group_origins(
        &self,
        image: &RgbImage,
        overlap: bool,
    ) -> Vec<(u32, u32)>
    {
        let (width, height) = image.dimensions();
        let (step_x, step_y) = if overlap
        {
            (1, 1)
        }
        else
        {
            (self.m as usize, self.n as usize)
        };

        let columns: Vec<u32> = (0..width.saturating_sub(1))
            .step_by(step_x)
            .filter(|&x| x + self.m <= width)
            .collect();
        (0..height.saturating_sub(1))
            .step_by(step_y)
            .filter(|&y| y + self.n <= height)
            .flat_map(|y| columns.iter().map(move |&x| (x, y)))
            .collect()
    }
}

/// Discrimination function over consecutive runs of four samples.
fn variation(group: &[i32]) -> i32
{
    group
        .chunks_exact(4)
        .map(|g| {
            (g[0] - g[1]).abs()
                + (g[3] - g[2]).abs()
                + (g[1] - g[3]).abs()
                + (g[2] - g[0]).abs()
        })
        .sum()
}

fn apply(group: &[i32], mask: &[bool], flip: fn(i32) -> i32) -> Vec<i32>
{
    group
        .iter()
        .zip(mask)
        .map(|(&value, &selected)| if selected { flip(value) } else { value })
        .collect()
}

/// `F1`: `2k <-> 2k + 1`.
const fn flip_positive(value: i32) -> i32
{
    value ^ 1
}

/// `F-1`: `2k - 1 <-> 2k`, so 0 maps to -1 and 255 to 256.
const fn flip_negative(value: i32) -> i32
{
    if value & 1 == 1 { value + 1 } else { value - 1 }
}

/// Root of `2(d1 + d0)x² + (d-0 - d-1 - d1 - 3d0)x + d0 - d-0 = 0` with
/// the smallest magnitude.
///
/// Falls back to the straight line estimate when the quadratic degenerates
/// or has no real root. Non-finite results are reported as zero.
fn estimate_root(groups: &GroupCounts, flipped: &GroupCounts) -> f64
{
    let r = groups.regular as f64;
    let s = groups.singular as f64;
    let rm = groups.negative_regular as f64;
    let sm = groups.negative_singular as f64;
    let r1 = flipped.regular as f64;
    let s1 = flipped.singular as f64;
    let rm1 = flipped.negative_regular as f64;
    let sm1 = flipped.negative_singular as f64;

    let d0 = r - s;
    let dm0 = rm - sm;
    let d1 = r1 - s1;
    let dm1 = rm1 - sm1;

    let a = 2.0 * (d1 + d0);
    let b = dm0 - dm1 - d1 - 3.0 * d0;
    let c = d0 - dm0;

    let x = if a == 0.0
    {
        ratio(-c, b)
    }
    else
    {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant >= 0.0
        {
            let root = discriminant.sqrt();
            let positive = (-b + root) / (2.0 * a);
            let negative = (-b - root) / (2.0 * a);
            if positive.abs() <= negative.abs() { positive } else { negative }
        }
        else
        {
            let cr = ratio(rm - r, r1 - r + rm - rm1);
            let cs = ratio(sm - s, s1 - s + sm - sm1);
            (cr + cs) / 2.0
        }
    };

    if x.is_finite() { x } else { 0.0 }
}

fn ratio(numerator: f64, denominator: f64) -> f64
{
    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}

#[cfg(test)]
mod tests
{
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::pixels::gray_from_fn;

    fn smooth_cover() -> RgbImage
    {
        gray_from_fn(64, 64, |x, y| {
            let wave = (f64::from(x) / 9.0).sin() * (f64::from(y) / 7.0).cos();
            (128.0 + 60.0 * wave).round() as u8
        })
    }

    #[test]
    fn flips_are_involutions()
    {
        for value in 0..=255
        {
            assert_eq!(flip_positive(flip_positive(value)), value);
            assert_eq!(flip_negative(flip_negative(value)), value);
        }
        assert_eq!(flip_negative(0), -1);
        assert_eq!(flip_negative(255), 256);
        assert_eq!(flip_negative(4), 3);
        assert_eq!(flip_positive(4), 5);
    }

    #[test]
    fn variation_of_a_2x2_group()
    {
        // |1-5| + |7-2| + |5-7| + |2-1|
        assert_eq!(variation(&[1, 5, 2, 7]), 4 + 5 + 2 + 1);
        // incomplete runs are ignored
        assert_eq!(variation(&[1, 5, 2]), 0);
    }

    #[test]
    fn masks_are_complementary_checkerboards()
    {
        let [mask, inverse] = RsAnalysis::new(2, 2).masks();
        assert_eq!(mask, vec![true, false, false, true]);
        assert_eq!(inverse, vec![false, true, true, false]);
    }

    #[test]
    fn group_counts_on_a_flat_image()
    {
        let image = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        let rs = RsAnalysis::default();

        let report = rs.analyze(&image, Channel::Red, true);
        // 3 x 3 origins, two masks each; every flip adds variation
        let expected = GroupCounts {
            regular: 18,
            negative_regular: 18,
            ..GroupCounts::default()
        };
        assert_eq!(report.groups, expected);
        assert_eq!(report.flipped_groups, expected);
        assert_eq!(report.total_groups, 18);
        assert_eq!(report.message_length_percent, 0.0);

        let tiled = rs.analyze(&image, Channel::Red, false);
        assert_eq!(tiled.total_groups, 8);
    }

    #[test]
    fn array_matches_names()
    {
        let report = RsAnalysis::default().analyze(
            &smooth_cover(),
            Channel::Green,
            true,
        );
        let values = report.to_array();
        assert_eq!(values.len(), RsReport::NAMES.len());
        assert_eq!(values[0], report.groups.regular as f64);
        assert_eq!(values[14], report.flipped_groups.negative_regular as f64);
        assert_eq!(values[24], report.total_groups as f64);
        assert_eq!(values[26], report.message_length_percent);

        let total = report.total_groups as f64;
        let regular_percent = report.groups.regular as f64 / total * 100.0;
        assert!((values[6] - regular_percent).abs() < 1e-9);

        let (name, value) = report.named().last().expect("28 entries");
        assert_eq!(name, "Estimated message length (in bytes)");
        assert_eq!(value, report.message_length_bytes);
    }

    #[test]
    fn flipped_differences_pair_positive_and_negative_counts()
    {
        let report = RsReport {
            groups: GroupCounts::default(),
            flipped_groups: GroupCounts {
                regular: 10,
                singular: 4,
                negative_regular: 7,
                negative_singular: 9,
                unusable: 0,
            },
            total_groups: 20,
            estimated_flipped_percent: 0.0,
            message_length_percent: 0.0,
            message_length_bytes: 0.0,
        };
        let values = report.to_array();
        // |R1 - R-1| and |S1 - S-1| of the all flipped pass
        assert_eq!(values[16], 3.0);
        assert_eq!(values[17], 5.0);
        assert!((values[22] - 15.0).abs() < 1e-9);
        assert_eq!(values[23], 25.0);
    }

    #[test]
    fn analysis_is_deterministic()
    {
        let cover = smooth_cover();
        let rs = RsAnalysis::default();
        assert_eq!(
            rs.analyze(&cover, Channel::Red, true),
            rs.analyze(&cover, Channel::Red, true)
        );
    }

    #[test]
    fn randomized_lsbs_raise_the_estimate()
    {
        let cover = smooth_cover();
        let mut rng = StdRng::seed_from_u64(21);
        let mut stego = cover.clone();
        for pixel in stego.pixels_mut()
        {
            let value = (pixel.0[0] & 0xFE) | rng.random_range(0..=1u8);
            *pixel = Rgb([value; 3]);
        }

        let rs = RsAnalysis::default();
        let clean = rs.analyze(&cover, Channel::Red, true);
        let noisy = rs.analyze(&stego, Channel::Red, true);
        assert!(clean.message_length_percent < 0.1, "{clean:?}");
        assert!(noisy.message_length_percent > 0.4, "{noisy:?}");
        assert!(noisy.message_length_bytes > clean.message_length_bytes);
    }

    #[test]
    fn images_smaller_than_a_group()
    {
        let report = RsAnalysis::new(2, 2).analyze(
            &RgbImage::new(1, 5),
            Channel::Blue,
            false,
        );
        assert_eq!(report.total_groups, 0);
        assert!(report.to_array().iter().all(|&value| value == 0.0));
    }
}

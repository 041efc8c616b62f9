//! Batch processing over several carriers.
//!
//! `batch-embed` hides one message in every cover. For each cover it writes
//! `<stem>_modified.<ext>` and `<stem>_visual_attack.<ext>` into the output
//! directory, reads the message back and analyzes the pair. `batch-extract`
//! reads the message of every stego image. Both emit a JSON array with one
//! entry per input. A carrier that fails is reported in its entry and the
//! remaining carriers are still processed.
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

use super::image_io::{load_image, write_image};
use super::payload::{MessageArgs, emit_text, resolve_message};
use super::{AppError, ImageMethodArgs};
use crate::analysis::{self, AnalysisConfig, AnalysisReport, metrics};
use crate::stego::ImageMethod;

/// Lossless formats the batch outputs can be written in
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(super) enum LosslessFormat
{
    Png,
    Bmp,
}

impl LosslessFormat
{
    const fn extension(self) -> &'static str
    {
        match self
        {
            Self::Png => "png",
            Self::Bmp => "bmp",
        }
    }
}

/// Embed one message into several images and analyze every result.
#[derive(Args, Debug)]
pub(super) struct BatchEmbedArgs
{
    /// Directory receiving the stego and visual attack images.
    pub(super) output_dir: Box<Path>,
    /// Cover images.
    #[arg(required = true, num_args = 1..)]
    pub(super) covers: Vec<Box<Path>>,
    /// Format of the written images.
    #[arg(long, value_enum, default_value_t = LosslessFormat::Png)]
    pub(super) format: LosslessFormat,
    #[command(flatten)]
    pub(super) method: ImageMethodArgs,
    #[command(flatten)]
    pub(super) message: MessageArgs,
    /// Optional file for the JSON report. Prints to stdout when omitted.
    #[arg(long, value_name = "PATH")]
    pub(super) report: Option<Box<Path>>,
}

/// Extract the messages of several images.
#[derive(Args, Debug)]
pub(super) struct BatchExtractArgs
{
    /// Stego images.
    #[arg(required = true, num_args = 1..)]
    pub(super) inputs: Vec<Box<Path>>,
    #[command(flatten)]
    pub(super) method: ImageMethodArgs,
    /// Optional file for the JSON list of extracted texts. Prints to stdout
    /// when omitted.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub(super) output_text: Option<Box<Path>>,
}

/// Result of embedding into one cover
#[derive(Debug, Default, Serialize)]
pub(super) struct EmbedEntry
{
    cover: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    stego: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visual_attack: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extracted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Text read from one stego image
#[derive(Debug, Serialize)]
pub(super) struct SecretFile
{
    file_name: PathBuf,
    secret_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Handles the embedding of one message into several covers.
///
/// # Errors
///
/// Returns [`AppError`] when the message cannot be resolved, when the
/// output directory cannot be created, or when the report cannot be
/// written. Failures of single covers are recorded in the report.
pub(super) fn handle_batch_embed(
    args: &mut BatchEmbedArgs,
) -> Result<(), AppError>
{
    let message = resolve_message(&mut args.message)?;
    fs::create_dir_all(&args.output_dir).map_err(|source| {
        AppError::Write {
            path: args.output_dir.clone(),
            source,
        }
    })?;

    let method = args.method.method();
    let config = AnalysisConfig::default();
    let entries: Vec<EmbedEntry> = args
        .covers
        .iter()
        .map(|cover| {
            embed_one(
                cover,
                &args.output_dir,
                args.format,
                method,
                &message,
                &config,
            )
            .unwrap_or_else(|err| {
                warn!(cover = %cover.display(), %err, "cover skipped");
                EmbedEntry {
                    cover: cover.to_path_buf(),
                    error: Some(err.to_string()),
                    ..EmbedEntry::default()
                }
            })
        })
        .collect();

    let embedded =
        entries.iter().filter(|entry| entry.error.is_none()).count();
    info!(
        method = method.name(),
        covers = entries.len(),
        embedded,
        "batch embedded"
    );
    emit_text(&serde_json::to_string_pretty(&entries)?, args.report.as_deref())
}

fn embed_one(
    cover_path: &Path,
    output_dir: &Path,
    format: LosslessFormat,
    method: ImageMethod,
    message: &str,
    config: &AnalysisConfig,
) -> Result<EmbedEntry, AppError>
{
    let cover = load_image(cover_path)?;
    let stego = method.embed(&cover, message)?;

    let stem = file_stem(cover_path);
    let extension = format.extension();
    let stego_path = output_dir.join(format!("{stem}_modified.{extension}"));
    write_image(&stego, &stego_path)?;

    let attack = metrics::visual_attack(&cover, &stego)?;
    let attack_path =
        output_dir.join(format!("{stem}_visual_attack.{extension}"));
    write_image(&attack, &attack_path)?;

    Ok(EmbedEntry {
        cover: cover_path.to_path_buf(),
        stego: Some(stego_path),
        visual_attack: Some(attack_path),
        extracted: Some(method.extract(&stego)),
        analysis: Some(analysis::analyze(&cover, &stego, config)?),
        error: None,
    })
}

/// Handles the extraction of the messages of several stego images.
///
/// # Errors
///
/// Returns [`AppError`] when the JSON list cannot be written. Images that
/// cannot be read are recorded in the list.
pub(super) fn handle_batch_extract(
    args: &BatchExtractArgs,
) -> Result<(), AppError>
{
    let method = args.method.method();
    let secrets: Vec<SecretFile> = args
        .inputs
        .iter()
        .map(|input| match load_image(input)
        {
            Ok(stego) => SecretFile {
                file_name: input.to_path_buf(),
                secret_text: method.extract(&stego),
                error: None,
            },
            Err(err) =>
            {
                warn!(input = %input.display(), %err, "image skipped");
                SecretFile {
                    file_name: input.to_path_buf(),
                    secret_text: String::new(),
                    error: Some(err.to_string()),
                }
            },
        })
        .collect();

    info!(method = method.name(), images = secrets.len(), "batch extracted");
    emit_text(
        &serde_json::to_string_pretty(&secrets)?,
        args.output_text.as_deref(),
    )
}

fn file_stem(path: &Path) -> String
{
    path.file_stem()
        .map_or_else(|| "image".into(), |stem| stem.to_string_lossy().into())
}

#[cfg(test)]
mod tests
{
    use image::{Rgb, RgbImage};
    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::cli::ImageMethodArg;
    use crate::stego::kjb::{DEFAULT_LAMBDA, DEFAULT_SEED};

    fn lsbmr_args() -> ImageMethodArgs
    {
        ImageMethodArgs {
            method: ImageMethodArg::Lsbmr,
            lambda: DEFAULT_LAMBDA,
            seed: DEFAULT_SEED,
        }
    }

    fn write_cover(dir: &Path, name: &str, width: u32) -> Box<Path>
    {
        let path = dir.join(name);
        let cover = RgbImage::from_fn(width, 24, |x, y| {
            Rgb([(x * 9) as u8, (y * 4) as u8, ((x ^ y) * 3) as u8])
        });
        write_image(&cover, &path).expect("failed to write cover");
        path.into_boxed_path()
    }

    fn read_json(path: &Path) -> Value
    {
        let text = fs::read_to_string(path).expect("report written");
        serde_json::from_str(&text).expect("report is JSON")
    }

    #[test]
    fn every_cover_gets_a_stego_image_and_a_report_entry()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let out = dir.path().join("out");
        let report = dir.path().join("report.json");
        let covers = vec![
            write_cover(dir.path(), "first.png", 24),
            write_cover(dir.path(), "second.bmp", 32),
        ];

        let mut args = BatchEmbedArgs {
            output_dir: out.clone().into_boxed_path(),
            covers,
            format: LosslessFormat::Bmp,
            method: lsbmr_args(),
            message: MessageArgs {
                text: Some("batch".into()),
                text_file: None,
            },
            report: Some(report.clone().into_boxed_path()),
        };
        handle_batch_embed(&mut args).expect("batch embed failed");

        assert!(out.join("first_modified.bmp").is_file());
        assert!(out.join("first_visual_attack.bmp").is_file());
        assert!(out.join("second_modified.bmp").is_file());

        let stego = load_image(out.join("second_modified.bmp")).expect("load");
        assert_eq!(ImageMethod::Lsbmr.extract(&stego), "batch");

        let json = read_json(&report);
        let entries = json.as_array().expect("array of entries");
        assert_eq!(entries.len(), 2);
        for entry in entries
        {
            assert_eq!(entry["extracted"], "batch");
            assert!(entry["analysis"]["chi_square"].is_number());
            assert!(entry.get("error").is_none());
        }
    }

    #[test]
    fn a_failing_cover_does_not_stop_the_batch()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let out = dir.path().join("out");
        let report = dir.path().join("report.json");
        let tiny = dir.path().join("tiny.png");
        write_image(&RgbImage::new(2, 2), &tiny).expect("failed to write");

        let mut args = BatchEmbedArgs {
            output_dir: out.clone().into_boxed_path(),
            covers: vec![
                tiny.into_boxed_path(),
                dir.path().join("missing.png").into_boxed_path(),
                write_cover(dir.path(), "fine.png", 24),
            ],
            format: LosslessFormat::Png,
            method: lsbmr_args(),
            message: MessageArgs {
                text: Some("too long for two by two".into()),
                text_file: None,
            },
            report: Some(report.clone().into_boxed_path()),
        };
        handle_batch_embed(&mut args).expect("batch embed failed");

        let json = read_json(&report);
        let entries = json.as_array().expect("array of entries");
        assert_eq!(entries.len(), 3);
        let refused = entries[0]["error"].as_str().expect("error message");
        assert!(refused.contains("bits but the carrier only holds"));
        assert!(entries[1]["error"].is_string());
        assert_eq!(entries[2]["extracted"], "too long for two by two");
        assert!(!out.join("tiny_modified.png").exists());
        assert!(out.join("fine_modified.png").is_file());
    }

    #[test]
    fn extracted_texts_are_listed_per_file()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let listing = dir.path().join("texts.json");
        let cover = RgbImage::from_pixel(20, 20, Rgb([100, 150, 200]));
        let stego_path = dir.path().join("stego.png");
        let stego = ImageMethod::Lsbmr.embed(&cover, "first").expect("fits");
        write_image(&stego, &stego_path).expect("failed to write");
        let plain_path = dir.path().join("plain.png");
        write_image(&cover, &plain_path).expect("failed to write");

        let args = BatchExtractArgs {
            inputs: vec![
                stego_path.clone().into_boxed_path(),
                plain_path.into_boxed_path(),
            ],
            method: lsbmr_args(),
            output_text: Some(listing.clone().into_boxed_path()),
        };
        handle_batch_extract(&args).expect("batch extract failed");

        let json = read_json(&listing);
        assert_eq!(json[0]["secret_text"], "first");
        assert_eq!(
            json[0]["file_name"],
            stego_path.to_str().expect("utf-8 temp path")
        );
        assert_eq!(json[1]["secret_text"], "");
    }

    #[test]
    fn stems_fall_back_for_bare_paths()
    {
        assert_eq!(file_stem(Path::new("dir/cover.png")), "cover");
        assert_eq!(file_stem(Path::new("..")), "image");
    }
}

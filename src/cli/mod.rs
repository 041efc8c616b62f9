//! Command line interface for the application.
//!
//! Parses the CLI arguments, loads carriers from disk, runs the requested
//! library routine and writes or prints the result.
mod batch;
mod image_io;
mod payload;

use std::path::Path;

use clap::{Args, Parser, Subcommand, ValueEnum};
use const_format::formatcp;
use thiserror::Error;
use tracing::info;

use self::batch::{
    BatchEmbedArgs, BatchExtractArgs, handle_batch_embed, handle_batch_extract,
};
use self::image_io::{is_lossy, load_image, normalized_extension, write_image};
use self::payload::{MessageArgs, emit_text, read_text, resolve_message};
use crate::analysis::{self, AnalysisConfig, AnalysisError, AnalysisReport};
use crate::bitstream::MARKER_BITS;
use crate::pixels::Channel;
use crate::stego::kjb::{DEFAULT_LAMBDA, DEFAULT_SEED};
use crate::stego::{ImageMethod, KjbParams, StegoError, inmi};
use crate::text::TextMethod;

/// Errors that can be emitted while handling the CLI
#[derive(Debug, Error)]
pub enum AppError
{
    /// A file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read
    {
        path: Box<Path>,
        source: std::io::Error,
    },

    /// A file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write
    {
        path: Box<Path>,
        source: std::io::Error,
    },

    /// An image could not be opened or decoded
    #[error("failed to open image {}: {source}", path.display())]
    ImageOpen
    {
        path: Box<Path>,
        source: image::ImageError,
    },

    /// An image could not be encoded
    #[error("failed to encode {} as {target_format}: {source}", path.display())]
    ImageEncode
    {
        path: Box<Path>,
        target_format: Box<str>,
        source: image::ImageError,
    },

    /// The format is unsupported
    #[error("unsupported image format: {extension}")]
    UnsupportedFormat
    {
        extension: Box<str>,
    },

    /// Stego images must not be written in a lossy format
    #[error(
        "{extension} is lossy and would destroy the payload, use png or bmp"
    )]
    LossyOutput
    {
        extension: Box<str>,
    },

    /// A steganography error occurred
    #[error(transparent)]
    Stego(#[from] StegoError),

    /// An analysis error occurred
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The analysis report could not be serialized
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The message is missing
    #[error("provide a message")]
    MissingMessage,
}

/// The main CLI parser
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Hide text in images and plain text, and analyze stego images",
    after_help = formatcp!(
        "Image payloads end with a {}-bit marker. KJB paths use seed {} \
         unless --seed is given.",
        MARKER_BITS,
        DEFAULT_SEED
    )
)]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

/// The main command
#[derive(Debug, Subcommand)]
enum Command
{
    Embed(EmbedArgs),
    Extract(ExtractArgs),
    Recover(RecoverArgs),
    Cap(CapacityArgs),
    Analyze(AnalyzeArgs),
    VisualAttack(VisualAttackArgs),
    TextEmbed(TextEmbedArgs),
    TextExtract(TextExtractArgs),
    BatchEmbed(BatchEmbedArgs),
    BatchExtract(BatchExtractArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ImageMethodArg
{
    Kjb,
    Lsbmr,
    Inmi,
    Imnp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TextMethodArg
{
    Whitespace,
    ZeroWidth,
    Homoglyph,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ChannelArg
{
    Red,
    Green,
    Blue,
}

impl From<TextMethodArg> for TextMethod
{
    fn from(method: TextMethodArg) -> Self
    {
        match method
        {
            TextMethodArg::Whitespace => Self::Whitespace,
            TextMethodArg::ZeroWidth => Self::ZeroWidth,
            TextMethodArg::Homoglyph => Self::Homoglyph,
        }
    }
}

impl From<ChannelArg> for Channel
{
    fn from(channel: ChannelArg) -> Self
    {
        match channel
        {
            ChannelArg::Red => Self::Red,
            ChannelArg::Green => Self::Green,
            ChannelArg::Blue => Self::Blue,
        }
    }
}

/// Image method selection and its parameters.
#[derive(Args, Debug)]
struct ImageMethodArgs
{
    /// Embedding method.
    #[arg(short, long, value_enum, default_value_t = ImageMethodArg::Lsbmr)]
    method: ImageMethodArg,
    /// KJB embedding strength.
    #[arg(long, default_value_t = DEFAULT_LAMBDA)]
    lambda: f64,
    /// KJB path seed.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

impl ImageMethodArgs
{
    fn method(&self) -> ImageMethod
    {
        match self.method
        {
            ImageMethodArg::Kjb => ImageMethod::Kjb(KjbParams {
                lambda: self.lambda,
                seed: self.seed,
            }),
            ImageMethodArg::Lsbmr => ImageMethod::Lsbmr,
            ImageMethodArg::Inmi => ImageMethod::Inmi,
            ImageMethodArg::Imnp => ImageMethod::Imnp,
        }
    }
}

/// Embed a message into an image.
#[derive(Args, Debug)]
struct EmbedArgs
{
    /// Image that will receive the text.
    input: Box<Path>,
    /// Output path for the stego image (png or bmp).
    output: Box<Path>,
    #[command(flatten)]
    method: ImageMethodArgs,
    #[command(flatten)]
    message: MessageArgs,
}

/// Extract a message from an image.
#[derive(Args, Debug)]
struct ExtractArgs
{
    /// Image that contains the text.
    input: Box<Path>,
    #[command(flatten)]
    method: ImageMethodArgs,
    /// Optional file to write the extracted text. Prints to stdout when
    /// omitted.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    output_text: Option<Box<Path>>,
}

/// Approximate the half-resolution original of an INMI stego image.
#[derive(Args, Debug)]
struct RecoverArgs
{
    /// INMI stego image.
    input: Box<Path>,
    /// Output path for the recovered image.
    output: Box<Path>,
}

/// Calculate the maximum possible payload size of an image per method.
#[derive(Args, Debug)]
struct CapacityArgs
{
    /// Image to calculate the possible payload size for.
    input: Box<Path>,
}

/// Compare a cover with its stego image.
#[derive(Args, Debug)]
struct AnalyzeArgs
{
    /// Original image.
    cover: Box<Path>,
    /// Image suspected to carry a payload.
    stego: Box<Path>,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
    /// Tile edge of the chi-square test.
    #[arg(long, default_value_t = AnalysisConfig::default().chi_square_block)]
    chi_block: u32,
    /// Tile edge of the AUMP test.
    #[arg(long, default_value_t = AnalysisConfig::default().aump_block)]
    aump_block: u32,
    /// Degree of the AUMP predictor.
    #[arg(long, default_value_t = AnalysisConfig::default().aump_degree)]
    aump_degree: usize,
    /// Channel for RS analysis.
    #[arg(long, value_enum, default_value_t = ChannelArg::Red)]
    rs_channel: ChannelArg,
    /// Tile the image for RS analysis instead of overlapping groups.
    #[arg(long)]
    rs_tiled: bool,
}

impl AnalyzeArgs
{
    fn config(&self) -> AnalysisConfig
    {
        AnalysisConfig {
            chi_square_block: self.chi_block,
            aump_block: self.aump_block,
            aump_degree: self.aump_degree,
            rs_channel: self.rs_channel.into(),
            rs_overlap: !self.rs_tiled,
        }
    }
}

/// Render the amplified difference between a cover and its stego image.
#[derive(Args, Debug)]
struct VisualAttackArgs
{
    /// Original image.
    cover: Box<Path>,
    /// Stego image.
    stego: Box<Path>,
    /// Output path for the difference image.
    output: Box<Path>,
}

/// Embed a message into a UTF-8 text file.
#[derive(Args, Debug)]
struct TextEmbedArgs
{
    /// Cover text file.
    cover: Box<Path>,
    /// Output path for the stego text.
    output: Box<Path>,
    /// Embedding method.
    #[arg(short, long, value_enum)]
    method: TextMethodArg,
    #[command(flatten)]
    message: MessageArgs,
}

/// Extract a message from a UTF-8 text file.
#[derive(Args, Debug)]
struct TextExtractArgs
{
    /// Stego text file.
    input: Box<Path>,
    /// Embedding method.
    #[arg(short, long, value_enum)]
    method: TextMethodArg,
    /// Optional file to write the extracted text. Prints to stdout when
    /// omitted.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    output_text: Option<Box<Path>>,
}

/// Parses CLI arguments and executes the requested operation.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing files, decoding images, or
/// running steganography and analysis routines fails.
pub fn run() -> Result<(), AppError>
{
    let cli = Cli::parse();
    match cli.command
    {
        Command::Embed(mut args) => handle_embed(&mut args),
        Command::Extract(args) => handle_extract(&args),
        Command::Recover(args) => handle_recover(&args),
        Command::Cap(args) => handle_capacity(&args),
        Command::Analyze(args) => handle_analyze(&args),
        Command::VisualAttack(args) => handle_visual_attack(&args),
        Command::TextEmbed(mut args) => handle_text_embed(&mut args),
        Command::TextExtract(args) => handle_text_extract(&args),
        Command::BatchEmbed(mut args) => handle_batch_embed(&mut args),
        Command::BatchExtract(args) => handle_batch_extract(&args),
    }
}

/// Handles the embedding of a message into an image.
///
/// # Errors
///
/// Returns [`AppError`] when the output format is lossy, when reading or
/// writing files fails, or when the message does not fit.
fn handle_embed(args: &mut EmbedArgs) -> Result<(), AppError>
{
    let output_ext = normalized_extension(&args.output);
    if is_lossy(output_ext.as_deref())
    {
        return Err(AppError::LossyOutput {
            extension: output_ext.as_deref().unwrap_or("<unknown>").into(),
        });
    }

    let cover = load_image(&args.input)?;
    let message = resolve_message(&mut args.message)?;
    let method = args.method.method();

    // Embedding the message happens here
    let stego = method.embed(&cover, &message)?;
    write_image(&stego, &args.output)?;

    info!(
        method = method.name(),
        bytes = message.len(),
        output = %args.output.display(),
        "message embedded"
    );
    Ok(())
}

/// Handles the extraction of a message from an image.
///
/// # Errors
///
/// Returns [`AppError`] when reading the image or writing the text fails.
fn handle_extract(args: &ExtractArgs) -> Result<(), AppError>
{
    let image = load_image(&args.input)?;
    let message = args.method.method().extract(&image);
    if message.is_empty()
    {
        info!("no payload found");
    }
    emit_text(&message, args.output_text.as_deref())
}

/// Handles the recovery of an INMI stego image.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing the images fails.
fn handle_recover(args: &RecoverArgs) -> Result<(), AppError>
{
    let stego = load_image(&args.input)?;
    let recovered = inmi::recover_original(&stego);
    write_image(&recovered, &args.output)?;
    info!(
        width = recovered.width(),
        height = recovered.height(),
        "original approximated"
    );
    Ok(())
}

/// Handles the capacity calculation of an image.
///
/// # Errors
///
/// Returns [`AppError`] when reading the image.
fn handle_capacity(args: &CapacityArgs) -> Result<(), AppError>
{
    let image = load_image(&args.input)?;
    let methods = [
        ImageMethod::Kjb(KjbParams::default()),
        ImageMethod::Lsbmr,
        ImageMethod::Inmi,
        ImageMethod::Imnp,
    ];

    println!("Maximum possible payload size:");
    for method in methods
    {
        println!(
            "  {:<6} {} bytes",
            method.name(),
            method.max_message_size(&image)
        );
    }

    let estimate = analysis::metrics::capacity(&image);
    println!(
        "Capacity estimate: {estimate} bits ({:.2} bytes)",
        estimate as f64 / 8.0
    );
    Ok(())
}

/// Handles the analysis of a cover/stego pair.
///
/// # Errors
///
/// Returns [`AppError`] when reading the images fails, when their sizes
/// differ, or when the JSON report cannot be produced.
fn handle_analyze(args: &AnalyzeArgs) -> Result<(), AppError>
{
    let cover = load_image(&args.cover)?;
    let stego = load_image(&args.stego)?;
    let report = analysis::analyze(&cover, &stego, &args.config())?;

    if args.json
    {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    else
    {
        println!("{}", render_report(&report));
    }
    Ok(())
}

/// Human readable form of `report`, one metric per line.
///
/// `capacity_kb` holds `bits / 8`, so it is printed as bytes.
fn render_report(report: &AnalysisReport) -> String
{
    let psnr = &report.channel_psnr;
    let mut lines = vec![
        format!("Capacity:    {:.2} bytes", report.capacity_kb),
        format!("PSNR:        {:.2} dB", report.psnr_db),
        format!(
            "PSNR R/G/B:  {:.2} / {:.2} / {:.2} dB (average {:.2} dB)",
            psnr.red, psnr.green, psnr.blue, psnr.average
        ),
        format!("Chi-square:  {:.4}", report.chi_square),
        format!("AUMP:        {:.4}", report.aump),
        format!("Compression: {:.4}", report.compression),
        String::new(),
        "RS analysis".to_owned(),
    ];
    lines.extend(
        report
            .rs
            .named()
            .map(|(name, value)| format!("  {name}: {value:.4}")),
    );
    lines.join("\n")
}

/// Handles the visual attack of a cover/stego pair.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing the images fails or when
/// their sizes differ.
fn handle_visual_attack(args: &VisualAttackArgs) -> Result<(), AppError>
{
    let cover = load_image(&args.cover)?;
    let stego = load_image(&args.stego)?;
    let attack = analysis::metrics::visual_attack(&cover, &stego)?;
    write_image(&attack, &args.output)
}

/// Handles the embedding of a message into a text file.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing files fails, or when the
/// message does not fit.
fn handle_text_embed(args: &mut TextEmbedArgs) -> Result<(), AppError>
{
    let cover = read_text(&args.cover)?;
    let message = resolve_message(&mut args.message)?;
    let method = TextMethod::from(args.method);

    let stego = method.embed(&message, &cover)?;
    emit_text(&stego, Some(&args.output))?;

    info!(
        method = method.name(),
        bytes = message.len(),
        output = %args.output.display(),
        "message embedded"
    );
    Ok(())
}

/// Handles the extraction of a message from a text file.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing the files fails.
fn handle_text_extract(args: &TextExtractArgs) -> Result<(), AppError>
{
    let stego = read_text(&args.input)?;
    let message = TextMethod::from(args.method).extract(&stego);
    emit_text(&message, args.output_text.as_deref())
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use clap::CommandFactory;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    use super::*;
    use crate::analysis::RsReport;

    fn write_cover(dir: &TempDir, name: &str) -> Box<Path>
    {
        let path = dir.path().join(name);
        let cover = RgbImage::from_fn(48, 40, |x, y| {
            Rgb([(x * 5) as u8, (y * 6) as u8, ((x + y) * 3) as u8])
        });
        write_image(&cover, &path).expect("failed to write cover");
        path.into_boxed_path()
    }

    fn inline(text: &str) -> MessageArgs
    {
        MessageArgs {
            text: Some(text.into()),
            text_file: None,
        }
    }

    #[test]
    fn clap_configuration_is_sound()
    {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_embed_with_inline_text()
    {
        let cli = Cli::try_parse_from([
            "stegolab",
            "embed",
            "input.png",
            "output.png",
            "--input",
            "secret",
        ])
        .expect("expected embed command");

        match cli.command
        {
            Command::Embed(args) =>
            {
                assert_eq!(args.input.as_ref(), Path::new("input.png"));
                assert_eq!(args.output.as_ref(), Path::new("output.png"));
                assert_eq!(args.message.text.as_deref(), Some("secret"));
                assert!(args.message.text_file.is_none());
                assert_eq!(args.method.method(), ImageMethod::Lsbmr);
            },
            other => panic!("expected embed command, got {other:?}"),
        }
    }

    #[test]
    fn parses_embed_with_kjb_parameters()
    {
        let cli = Cli::try_parse_from([
            "stegolab",
            "embed",
            "input.png",
            "output.png",
            "--method",
            "kjb",
            "--lambda",
            "0.25",
            "--seed",
            "77",
            "--file",
            "message.txt",
        ])
        .expect("expected embed command");

        match cli.command
        {
            Command::Embed(args) =>
            {
                assert_eq!(
                    args.method.method(),
                    ImageMethod::Kjb(KjbParams {
                        lambda: 0.25,
                        seed: 77,
                    })
                );
                assert_eq!(
                    args.message.text_file.as_deref(),
                    Some(Path::new("message.txt"))
                );
            },
            other => panic!("expected embed command, got {other:?}"),
        }
    }

    #[test]
    fn embed_requires_exactly_one_message_source()
    {
        Cli::try_parse_from(["stegolab", "embed", "input.png", "output.png"])
            .expect_err("missing message source must error");

        Cli::try_parse_from([
            "stegolab",
            "embed",
            "input.png",
            "output.png",
            "--input",
            "secret",
            "--file",
            "message.txt",
        ])
        .expect_err("two message sources must error");
    }

    #[test]
    fn parses_extract_with_output_file()
    {
        let cli = Cli::try_parse_from([
            "stegolab",
            "extract",
            "payload.png",
            "-m",
            "imnp",
            "--output",
            "message.txt",
        ])
        .expect("expected extract command");

        match cli.command
        {
            Command::Extract(args) =>
            {
                assert_eq!(args.input.as_ref(), Path::new("payload.png"));
                assert_eq!(args.method.method(), ImageMethod::Imnp);
                assert_eq!(
                    args.output_text.as_deref(),
                    Some(Path::new("message.txt"))
                );
            },
            other => panic!("expected extract command, got {other:?}"),
        }
    }

    #[test]
    fn parses_analyze_options()
    {
        let cli = Cli::try_parse_from([
            "stegolab",
            "analyze",
            "cover.png",
            "stego.png",
            "--json",
            "--rs-channel",
            "blue",
            "--rs-tiled",
        ])
        .expect("expected analyze command");

        match cli.command
        {
            Command::Analyze(args) =>
            {
                assert!(args.json);
                let config = args.config();
                assert_eq!(config.rs_channel, Channel::Blue);
                assert!(!config.rs_overlap);
                assert_eq!(config.chi_square_block, 16);
                assert_eq!(config.aump_block, 4);
                assert_eq!(config.aump_degree, 2);
            },
            other => panic!("expected analyze command, got {other:?}"),
        }
    }

    #[test]
    fn parses_text_commands()
    {
        let cli = Cli::try_parse_from([
            "stegolab",
            "text-embed",
            "cover.txt",
            "stego.txt",
            "--method",
            "zero-width",
            "-i",
            "hi",
        ])
        .expect("expected text-embed command");
        assert!(matches!(
            cli.command,
            Command::TextEmbed(TextEmbedArgs {
                method: TextMethodArg::ZeroWidth,
                ..
            })
        ));

        Cli::try_parse_from(["stegolab", "text-extract", "stego.txt"])
            .expect_err("text method is required");
    }

    #[test]
    fn parses_batch_commands()
    {
        let cli = Cli::try_parse_from([
            "stegolab",
            "batch-embed",
            "out",
            "a.png",
            "b.bmp",
            "--method",
            "imnp",
            "--format",
            "bmp",
            "-i",
            "secret",
        ])
        .expect("expected batch-embed command");

        match cli.command
        {
            Command::BatchEmbed(args) =>
            {
                assert_eq!(args.output_dir.as_ref(), Path::new("out"));
                assert_eq!(args.covers.len(), 2);
                assert_eq!(args.method.method(), ImageMethod::Imnp);
                assert!(args.report.is_none());
            },
            other => panic!("expected batch-embed command, got {other:?}"),
        }

        Cli::try_parse_from(["stegolab", "batch-embed", "out", "-i", "x"])
            .expect_err("at least one cover is required");

        let cli = Cli::try_parse_from([
            "stegolab",
            "batch-extract",
            "a.png",
            "b.png",
            "c.png",
            "-o",
            "texts.json",
        ])
        .expect("expected batch-extract command");
        assert!(matches!(
            cli.command,
            Command::BatchExtract(BatchExtractArgs { ref inputs, .. })
                if inputs.len() == 3
        ));
    }

    #[test]
    fn parses_capacity_command()
    {
        let cli = Cli::try_parse_from(["stegolab", "cap", "image.png"])
            .expect("expected capacity command");

        match cli.command
        {
            Command::Cap(args) =>
            {
                assert_eq!(args.input.as_ref(), Path::new("image.png"));
            },
            other => panic!("expected capacity command, got {other:?}"),
        }
    }

    #[test]
    fn should_reject_lossy_stego_output()
    {
        let mut args = EmbedArgs {
            input: Path::new("input.png").into(),
            output: Path::new("output.JPG").into(),
            method: ImageMethodArgs {
                method: ImageMethodArg::Lsbmr,
                lambda: DEFAULT_LAMBDA,
                seed: DEFAULT_SEED,
            },
            message: inline("payload"),
        };

        let error =
            handle_embed(&mut args).expect_err("should reject lossy output");
        assert!(matches!(
            error,
            AppError::LossyOutput { extension } if extension.as_ref() == "jpg"
        ));
    }

    #[test]
    fn embed_then_extract_through_files()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let cover = write_cover(&dir, "cover.png");
        let stego_path = dir.path().join("stego.bmp");
        let text_path = dir.path().join("message.txt");

        let method = ImageMethodArgs {
            method: ImageMethodArg::Kjb,
            lambda: 0.3,
            seed: 5,
        };
        let mut embed = EmbedArgs {
            input: cover,
            output: stego_path.clone().into_boxed_path(),
            method,
            message: inline("file round trip"),
        };
        handle_embed(&mut embed).expect("failed to embed");

        let extract = ExtractArgs {
            input: stego_path.into_boxed_path(),
            method: ImageMethodArgs {
                method: ImageMethodArg::Kjb,
                lambda: 0.3,
                seed: 5,
            },
            output_text: Some(text_path.clone().into_boxed_path()),
        };
        handle_extract(&extract).expect("failed to extract");
        assert_eq!(
            fs::read_to_string(&text_path).expect("read back"),
            "file round trip"
        );
    }

    #[test]
    fn oversized_message_surfaces_the_capacity_error()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let mut args = EmbedArgs {
            input: write_cover(&dir, "cover.png"),
            output: dir.path().join("stego.png").into_boxed_path(),
            method: ImageMethodArgs {
                method: ImageMethodArg::Lsbmr,
                lambda: DEFAULT_LAMBDA,
                seed: DEFAULT_SEED,
            },
            message: inline(&"x".repeat(48 * 40)),
        };

        let error = handle_embed(&mut args).expect_err("must not fit");
        assert!(matches!(
            error,
            AppError::Stego(StegoError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn report_prints_capacity_in_bytes()
    {
        let image = RgbImage::from_fn(32, 32, |x, y| {
            Rgb([(x * 7 + y) as u8, (y * 5) as u8, 90])
        });
        let report =
            analysis::analyze(&image, &image, &AnalysisConfig::default())
                .expect("same dimensions");

        let text = render_report(&report);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Capacity:    96.00 bytes"));
        assert!(!text.contains("KB"));
        assert_eq!(
            text.lines().filter(|line| line.starts_with("  ")).count(),
            RsReport::LEN
        );
    }

    #[test]
    fn mismatched_analysis_inputs_are_rejected()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let cover = write_cover(&dir, "cover.png");
        let small = dir.path().join("small.png");
        write_image(&RgbImage::new(4, 4), &small).expect("failed to write");

        let args = VisualAttackArgs {
            cover,
            stego: small.into_boxed_path(),
            output: dir.path().join("attack.png").into_boxed_path(),
        };
        let error = handle_visual_attack(&args).expect_err("sizes differ");
        assert!(matches!(error, AppError::Analysis(_)));
    }

    #[test]
    fn text_embed_then_extract_through_files()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let cover_path = dir.path().join("cover.txt");
        let stego_path = dir.path().join("stego.txt");
        let text_path = dir.path().join("message.txt");
        let cover: String = (0..24).map(|i| format!("line {i}\n")).collect();
        fs::write(&cover_path, cover).expect("failed to write cover");

        let mut embed = TextEmbedArgs {
            cover: cover_path.into_boxed_path(),
            output: stego_path.clone().into_boxed_path(),
            method: TextMethodArg::Whitespace,
            message: inline("ok"),
        };
        handle_text_embed(&mut embed).expect("failed to embed");

        let extract = TextExtractArgs {
            input: stego_path.into_boxed_path(),
            method: TextMethodArg::Whitespace,
            output_text: Some(text_path.clone().into_boxed_path()),
        };
        handle_text_extract(&extract).expect("failed to extract");
        assert_eq!(fs::read_to_string(&text_path).expect("read back"), "ok");
    }
}

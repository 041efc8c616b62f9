//! CLI payload orchestration.
//!
//! Turns user input into the strings the steganography routines take and
//! hands extracted messages back to the user:
//! * resolves inline or file message sources
//! * reads cover texts
//! * writes extracted messages to a file or stdout
use std::fs;
use std::path::Path;

use clap::Args;

use super::AppError;

/// Message source shared by the embedding commands.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub(super) struct MessageArgs
{
    /// Text to embed.
    #[arg(short = 'i', long = "input", value_name = "TEXT")]
    pub(super) text: Option<String>,
    /// Path to an UTF-8 text file to embed.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub(super) text_file: Option<Box<Path>>,
}

/// Resolves the message to embed from the command line arguments.
///
/// # Errors
///
/// Returns [`AppError::Read`] when the message file cannot be read and
/// [`AppError::MissingMessage`] when no source was given.
pub(super) fn resolve_message(
    args: &mut MessageArgs,
) -> Result<String, AppError>
{
    match (args.text.take(), &args.text_file)
    {
        // take the ownership of the text
        (Some(text), None) => Ok(text),
        (None, Some(path)) => read_text(path),
        _ => Err(AppError::MissingMessage),
    }
}

/// Reads a UTF-8 text file.
///
/// # Errors
///
/// Returns [`AppError::Read`] when the file is missing or not UTF-8.
pub(super) fn read_text(path: impl AsRef<Path>) -> Result<String, AppError>
{
    fs::read_to_string(path.as_ref()).map_err(|source| AppError::Read {
        path: path.as_ref().into(),
        source,
    })
}

/// Writes `text` to `output`, or prints it to stdout when no path is given.
///
/// # Errors
///
/// Returns [`AppError::Write`] when the file cannot be written.
pub(super) fn emit_text(
    text: &str,
    output: Option<&Path>,
) -> Result<(), AppError>
{
    match output
    {
        Some(path) => fs::write(path, text).map_err(|source| AppError::Write {
            path: path.into(),
            source,
        }),
        None =>
        {
            println!("{text}");
            Ok(())
        },
    }
}

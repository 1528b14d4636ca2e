mod batch;
mod config;
mod cue;
mod errors;
mod filter;
mod mode;
mod orchestrator;
mod paths;
mod summary;
mod tools;
mod utils;

#[cfg(test)]
mod test_support;

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use log::{info, error, LevelFilter};
use env_logger::{Builder, Target};

use crate::config::ConverterConfig;
use crate::errors::ConverterError;
use crate::filter::ExtensionFilter;
use crate::mode::RunMode;
use crate::orchestrator::{AlbumContext, Converter};
use crate::tools::ffmpeg::FfmpegEncoder;
use crate::tools::shnsplit::ShnSplitter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Mirrors a lossless album tree as 320 kbps MP3", long_about = None)]
struct CliArgs {
    /// album directory, or with --batch a directory of albums
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// output root
    /// when given in single-album mode, the album lands in <OUTPUT>/<artist>/<album>
    /// defaults to "<INPUT> (mp3)"
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// file listing extensions to leave out of the output, one per line
    /// defaults to ignored-extensions.txt next to the executable
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// treat every subdirectory of the input as a separate album
    #[arg(short, long)]
    batch: bool,

    /// ffmpeg binary used for audio and artwork
    #[arg(long, value_name = "PATH", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// shnsplit binary used to split cue sheet albums
    #[arg(long, value_name = "PATH", default_value = "shnsplit")]
    shnsplit: PathBuf,

    /// increasing verbosity of logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

fn main() -> Result<(), ConverterError> {
    let cli = CliArgs::parse();

    // configuring logging based on level of verbosity
    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::new()
        .filter_level(log_level)
        .target(Target::Stdout)
        .init();

    info!("Album converter started");

    if !cli.input.is_dir() {
        error!("Input directory does not exist: {}", cli.input.display());
        return Err(ConverterError::InputMissing(cli.input));
    }
    // resolves "." and trailing slashes so the artist and album names are real directory names
    let input_root = fs::canonicalize(&cli.input)?;

    let run_mode = RunMode::from_flag(cli.batch);
    let output_root = mode::resolve_output_root(run_mode, &input_root, cli.output.as_deref());
    if output_root == input_root {
        return Err(ConverterError::Argument(format!(
            "Output directory must differ from the input: {}",
            output_root.display()
        )));
    }
    fs::create_dir_all(&output_root).map_err(|e| ConverterError::OutputCreate {
        path: output_root.clone(),
        source: e,
    })?;
    info!("Writing to {:?} ({:?} mode)", output_root, run_mode);

    let config = ConverterConfig::new(cli.ffmpeg, cli.shnsplit, cli.config);
    let filter = ExtensionFilter::load(&config.blacklist_path)?;
    let encoder = FfmpegEncoder::new(&config.ffmpeg_binary, config.audio.clone(), config.image.clone());
    let splitter = ShnSplitter::new(&config.shnsplit_binary);
    let converter = Converter::new(&encoder, &encoder, &splitter, &filter);

    match run_mode {
        RunMode::Single => {
            let album = AlbumContext::new(input_root, output_root);
            let summary = converter.convert_album(&album)?;
            info!("{} file(s) written", summary.total_written());
            if summary.total_failed() > 0 {
                error!("{} file(s) could not be converted", summary.total_failed());
            }
        }
        RunMode::Batch => {
            let summary = batch::run_batch(&converter, &input_root, &output_root)?;
            info!("{} file(s) written", summary.files.total_written());
            if summary.albums_failed > 0 {
                error!("{} of {} album(s) had failures", summary.albums_failed, summary.albums_found);
            }
        }
    }

    info!("Album converter finished");
    Ok(())
}

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::Level;

use crate::config::{Config, Shape};
use crate::util::json_to_argv;

#[derive(Parser, Debug)]
#[command(name = "prepkit")]
#[command(version)]
#[command(about = "Download, unzip and image checks for an image pipeline", long_about = None)]
#[command(args_override_self = true)]
#[command(after_help = "Examples:\n  \
  prepkit fetch https://example.com/models.zip models/models.zip\n  \
  prepkit unpack models/models.zip models/          extract with a progress bar\n  \
  prepkit --shape 256x256x3 check-shape input.png   verify image dimensions\n  \
  prepkit --config options.json convert in.jpg out.png")]
pub struct Cli {
    /// Default log level (RUST_LOG takes precedence)
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    pub log_level: Level,

    /// Hide progress bars
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Expected image shape, HxWxC
    #[arg(long, value_name = "HxWxC", default_value = "512x512x3", global = true)]
    pub shape: Shape,

    /// JSON object of option values, applied before command line options
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download a file over HTTP(S)
    Fetch {
        /// Source URL
        url: String,
        /// Destination file
        dest: PathBuf,
    },

    /// Extract every entry of a ZIP archive
    Unpack {
        /// ZIP file path
        archive: PathBuf,
        /// Directory to extract into (created if missing)
        dir: PathBuf,
    },

    /// List the entries of a ZIP archive
    List {
        /// ZIP file path
        archive: PathBuf,
        /// Show sizes, ratio and timestamps
        #[arg(short = 'v')]
        verbose: bool,
    },

    /// Check that an image has the expected shape
    CheckShape {
        /// Image file
        image: PathBuf,
    },

    /// Decode an image and write it in the format of the output extension
    Convert {
        input: PathBuf,
        output: PathBuf,
    },
}

impl Cli {
    /// Parse `args`, expanding `--config FILE` into options.
    ///
    /// The JSON pairs are inserted right after the program name, so anything
    /// given on the command line overrides them.
    pub fn parse_with_config<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let cli = Cli::try_parse_from(&args)?;

        let Some(path) = cli.config.as_ref() else {
            return Ok(cli);
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        let object = value
            .as_object()
            .ok_or_else(|| anyhow!("config {} must hold a JSON object", path.display()))?;

        let mut expanded: Vec<OsString> = Vec::with_capacity(args.len() + object.len() * 2);
        expanded.push(args.first().cloned().unwrap_or_else(|| "prepkit".into()));
        expanded.extend(json_to_argv(object).into_iter().map(OsString::from));
        expanded.extend(args.iter().skip(1).cloned());

        Ok(Cli::try_parse_from(expanded)?)
    }

    pub fn config(&self) -> Config {
        Config {
            desired_shape: self.shape,
            log_level: self.log_level,
        }
    }
}

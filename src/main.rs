//! Command-line entry point for prepkit.

use anyhow::Result;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use prepkit::cli::{Cli, Command};
use prepkit::config::Config;
use prepkit::imaging;
use prepkit::logging::setup_log;
use prepkit::zip::CompressionMethod;
use prepkit::{ConsoleBar, Fetcher, LocalFileReader, NoopReporter, Reporter, ZipExtractor, unpack};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::parse_with_config(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => match e.downcast::<clap::Error>() {
            Ok(clap_err) => clap_err.exit(),
            Err(e) => {
                eprintln!("[ERROR] {e:#}");
                return ExitCode::FAILURE;
            }
        },
    };

    let config = cli.config();
    if let Err(e) = setup_log(config.log_level) {
        eprintln!("[ERROR] failed to set up logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &Config) -> Result<()> {
    let mut reporter: Box<dyn Reporter> = if cli.quiet {
        Box::new(NoopReporter)
    } else {
        Box::new(ConsoleBar::stdout())
    };

    match cli.command {
        Command::Fetch { url, dest } => {
            let fetcher = Fetcher::new()?;
            fetcher.fetch(&url, &dest, reporter.as_mut()).await?;
        }
        Command::Unpack { archive, dir } => {
            unpack(&archive, &dir, reporter.as_mut()).await?;
        }
        Command::List { archive, verbose } => {
            list_files(&archive, verbose).await?;
        }
        Command::CheckShape { image } => {
            imaging::check_shape(&image, config.desired_shape)?;
            info!("{} has shape {}", image.display(), config.desired_shape);
        }
        Command::Convert { input, output } => {
            let grid = imaging::read_image(&input)?;
            imaging::write_image(&grid, &output)?;
            info!("{} written", output.display());
        }
    }

    Ok(())
}

/// Print the entries of an archive.
///
/// Plain mode prints one name per line; verbose mode prints a table with
/// sizes, compression ratio and timestamps followed by a totals line.
async fn list_files(archive: &Path, verbose: bool) -> Result<()> {
    let reader = Arc::new(LocalFileReader::new(archive)?);
    let extractor = ZipExtractor::new(reader);
    let entries = extractor.list_files().await?;

    if !verbose {
        for entry in &entries {
            println!("{}", entry.relative_path);
        }
        return Ok(());
    }

    println!(
        "{:>10}  {:<6}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
        "Length", "Method", "Size", "Cmpr", "Date", "Time"
    );
    println!("{}", "-".repeat(78));

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in &entries {
        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();

        println!(
            "{:>10}  {:<6}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size,
            method_label(entry.compression_method),
            entry.compressed_size,
            ratio(entry.compressed_size, entry.uncompressed_size),
            year,
            month,
            day,
            hour,
            minute,
            entry.relative_path
        );

        if !entry.is_directory {
            total_uncompressed = total_uncompressed.saturating_add(entry.uncompressed_size);
            total_compressed = total_compressed.saturating_add(entry.compressed_size);
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(78));
    println!(
        "{:>10}  {:<6}  {:>10}  {}  {:>18}  {} files",
        total_uncompressed,
        "",
        total_compressed,
        ratio(total_compressed, total_uncompressed),
        "",
        file_count
    );

    Ok(())
}

fn method_label(method: CompressionMethod) -> String {
    match method {
        CompressionMethod::Unknown(code) => format!("Unk:{code:03}"),
        known => known.name().to_string(),
    }
}

/// Space saved by compression, as a right-aligned percentage
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed == 0 || compressed >= uncompressed {
        return "  0%".to_string();
    }
    let saved = 100 - (compressed as u128 * 100 / uncompressed as u128);
    format!("{saved:>3}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_handles_huge_sizes() {
        assert_eq!(ratio(3 << 60, 3 << 62), " 75%");
        assert_eq!(ratio(1, 0), "  0%");
        assert_eq!(ratio(25, 100), " 75%");
    }

    #[test]
    fn test_method_label_shows_unknown_code() {
        assert_eq!(method_label(CompressionMethod::Deflate), "Defl:N");
        assert_eq!(method_label(CompressionMethod::Unknown(12)), "Unk:012");
    }
}

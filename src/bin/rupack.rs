mod progress;

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use console::style;
use progress::ProgressMonitor;
use rupack::format::{pack_file, unpack_file, ConverterType};
use tracing::{info, info_span, level_filters::LevelFilter, warn};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

const PACKED_EXTENSION: &str = "packed";

#[derive(Parser)]
#[command(version, about = "Pack and unpack files with Huffman coding")]
struct Cli {
    /// The file to pack, or a `.packed` file to unpack
    file: PathBuf,
    /// Where to write the result.
    ///
    /// Defaults to `<FILE>.packed` when packing, and to FILE without its
    /// `.packed` suffix when unpacking.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// How to split the input into elements when packing
    #[arg(short, long, value_enum, default_value_t = ConverterChoice::Auto)]
    converter: ConverterChoice,
    /// Overwrite the output if it already exists
    #[arg(short, long)]
    force: bool,
    /// Skip unpacking the freshly packed file to compare digests
    #[arg(long)]
    no_verify: bool,
    /// Log more, pass twice for per-leaf output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ConverterChoice {
    /// Text if the file is valid UTF-8, bytes otherwise
    Auto,
    Byte,
    Character,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.file.extension().map_or(false, |ext| ext == PACKED_EXTENSION) {
        unpack_command(&cli)
    } else {
        pack_command(&cli)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .with(level)
        .init();
}

fn pack_command(cli: &Cli) -> Result<()> {
    let output = match &cli.output {
        Some(path) => path.clone(),
        None => packed_name(&cli.file),
    };
    refuse_overwrite(&output, cli.force)?;

    let converter_type = match cli.converter {
        ConverterChoice::Byte => ConverterType::Byte,
        ConverterChoice::Character => ConverterType::Character,
        ConverterChoice::Auto => {
            let content = fs::read(&cli.file)
                .wrap_err_with(|| format!("failed to read {}", cli.file.display()))?;
            ConverterType::probe(&content)
        }
    };

    let file = File::open(&cli.file)
        .wrap_err_with(|| format!("failed to open {}", cli.file.display()))?;
    let size = file.metadata()?.len();
    info!(
        "packing {} as {} into {}",
        cli.file.display(),
        converter_type,
        output.display()
    );

    let span = info_span!("pack");
    let _guard = span.enter();
    // Read once to count, once to encode
    let mut source = ProgressMonitor::new(BufReader::new(file), size * 2, span.clone());
    let summary = with_cleanup(&output, || {
        let mut sink = BufWriter::new(File::create(&output)?);
        let summary = pack_file(converter_type, &mut source, &mut sink)?;
        sink.flush()?;
        Ok(summary)
    })?;
    source.finish();

    let packed_size = fs::metadata(&output)?.len();
    info!(
        elements = summary.total_elements,
        distinct = summary.distinct_elements,
        "{} -> {} bytes, {:.3} bits per element",
        size,
        packed_size,
        summary.average_bits_per_element().unwrap_or(0.0)
    );
    println!("{} {}", style("Original digest:").bold(), summary.digest);

    if cli.no_verify {
        return Ok(());
    }
    let packed = BufReader::new(File::open(&output)?);
    let (_, unpacked_digest) = unpack_file(packed, io::sink())
        .wrap_err_with(|| format!("failed to unpack {} again", output.display()))?;
    println!("{} {}", style("Unpacked digest:").bold(), unpacked_digest);
    if unpacked_digest != summary.digest {
        bail!(
            "digest mismatch, {} does not unpack to the original",
            output.display()
        );
    }
    println!("{}", style("Digests match").green());
    Ok(())
}

fn unpack_command(cli: &Cli) -> Result<()> {
    let output = match &cli.output {
        Some(path) => path.clone(),
        None => cli.file.with_extension(""),
    };
    if cli.converter != ConverterChoice::Auto {
        warn!("--converter is ignored when unpacking, the file names its own");
    }
    refuse_overwrite(&output, cli.force)?;

    let file = File::open(&cli.file)
        .wrap_err_with(|| format!("failed to open {}", cli.file.display()))?;
    let size = file.metadata()?.len();
    info!("unpacking {} into {}", cli.file.display(), output.display());

    let span = info_span!("unpack");
    let _guard = span.enter();
    let mut source = ProgressMonitor::new(BufReader::new(file), size, span.clone());
    let (converter_type, digest) = with_cleanup(&output, || {
        let mut sink = BufWriter::new(File::create(&output)?);
        let result = unpack_file(&mut source, &mut sink)?;
        sink.flush()?;
        Ok(result)
    })?;
    source.finish();

    info!("{} was packed as {}", cli.file.display(), converter_type);
    println!("{} {}", style("Unpacked digest:").bold(), digest);
    Ok(())
}

/// `<file>.packed`, keeping any extension the file already has.
fn packed_name(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".");
    name.push(PACKED_EXTENSION);
    PathBuf::from(name)
}

fn refuse_overwrite(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        return Err(eyre!(
            "{} already exists, pass --force to overwrite it",
            output.display()
        ));
    }
    Ok(())
}

/// Run `f`, removing the half written `output` if it fails.
fn with_cleanup<T>(output: &Path, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let result = f();
    if result.is_err() {
        if let Err(e) = fs::remove_file(output) {
            warn!("could not remove {}: {}", output.display(), e);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{packed_name, Cli, ConverterChoice};
    use clap::{CommandFactory, Parser};
    use std::path::{Path, PathBuf};

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from(["rupack", "-vv", "-c", "byte", "--no-verify", "notes.txt"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.converter, ConverterChoice::Byte);
        assert!(cli.no_verify);
        assert!(!cli.force);
        assert_eq!(cli.file, PathBuf::from("notes.txt"));
    }

    #[test]
    fn names() {
        assert_eq!(packed_name(Path::new("notes.txt")), PathBuf::from("notes.txt.packed"));
        assert_eq!(packed_name(Path::new("dir/blob")), PathBuf::from("dir/blob.packed"));
        assert_eq!(
            Path::new("notes.txt.packed").with_extension(""),
            PathBuf::from("notes.txt")
        );
    }
}

use clap::{Args, Parser, Subcommand, ValueEnum};
use icopack::{
    open_image, DirectoryLayout, FilterType, IcoDirectory, IcoEncoder,
    ImageRasterizer, DEFAULT_SIZES,
};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

//===========================================================================//

#[derive(Parser, Debug)]
#[command(name = "icopack", version, about = "Creates and inspects ICO files")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates an ICO file from an image
    Create {
        /// Image to rasterize (PNG, JPEG, GIF or BMP)
        image: PathBuf,

        /// Sets output path
        #[arg(short = 'o', long = "output", value_name = "PATH")]
        output: Option<PathBuf>,

        /// Comma-separated icon sizes, each between 1 and 256
        #[arg(
            short = 's',
            long = "sizes",
            value_delimiter = ',',
            default_values_t = DEFAULT_SIZES.to_vec()
        )]
        sizes: Vec<u32>,

        /// Resampling filter
        #[arg(long = "filter", value_enum, default_value_t = Filter::Triangle)]
        filter: Filter,

        /// Rasterize all sizes concurrently
        #[arg(long = "parallel")]
        parallel: bool,

        #[command(flatten)]
        layout: LayoutArg,
    },
    /// Lists icons in an ICO file
    List {
        ico: PathBuf,

        #[command(flatten)]
        layout: LayoutArg,
    },
    /// Extracts one icon's image data from an ICO file
    Extract {
        ico: PathBuf,

        index: usize,

        /// Sets output path
        #[arg(short = 'o', long = "output", value_name = "PATH")]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArg,
    },
}

#[derive(Args, Debug)]
struct LayoutArg {
    /// Use the legacy directory-entry packing (length at byte 6, offset at
    /// byte 10)
    #[arg(long = "legacy-layout")]
    legacy_layout: bool,
}

impl LayoutArg {
    fn layout(&self) -> DirectoryLayout {
        if self.legacy_layout {
            DirectoryLayout::Legacy
        } else {
            DirectoryLayout::Canonical
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Filter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<Filter> for FilterType {
    fn from(filter: Filter) -> FilterType {
        match filter {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

//===========================================================================//

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(error = ?error, "Command failed");
            eprintln!("icopack: {}", error);
            ExitCode::FAILURE
        }
    }
}

/// RUST_LOG takes priority over --debug; the default is "warn".
fn init_logging(debug: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Create { image, output, sizes, filter, parallel, layout } => {
            let out_path = output.unwrap_or_else(first_free_output_path);
            let source = open_image(&image)?;
            let encoder =
                IcoEncoder::new(ImageRasterizer::new(filter.into()))
                    .with_layout(layout.layout());
            let ico = if parallel {
                encoder.encode_parallel(&source, &sizes)?
            } else {
                encoder.encode(&source, &sizes)?
            };
            fs::write(&out_path, ico.as_bytes())?;
            println!(
                "Wrote {} icons ({} bytes) to {:?}",
                sizes.len(),
                ico.len(),
                out_path
            );
        }
        Command::List { ico, layout } => {
            let icondir = read_ico(&ico, layout.layout())?;
            for (index, entry) in icondir.entries().iter().enumerate() {
                let kind = if icondir.is_png(index) { "PNG" } else { "other" };
                println!(
                    "{:5}: {}x{} {}, {} bytes at offset {}",
                    index,
                    entry.width(),
                    entry.height(),
                    kind,
                    entry.data_size(),
                    entry.data_offset()
                );
            }
        }
        Command::Extract { ico, index, output, layout } => {
            let icondir = read_ico(&ico, layout.layout())?;
            let data = match icondir.payload(index) {
                Some(data) => data,
                None => {
                    return Err(format!(
                        "{:?} has only {} entries, but index is {}",
                        ico,
                        icondir.entries().len(),
                        index
                    )
                    .into());
                }
            };
            let out_path = output.unwrap_or_else(|| {
                PathBuf::from(format!("{}.{}.png", ico.display(), index))
            });
            fs::write(&out_path, data)?;
            println!("Extracted entry {} to {:?}", index, out_path);
        }
    }
    Ok(())
}

fn read_ico(
    path: &Path,
    layout: DirectoryLayout,
) -> Result<IcoDirectory, Box<dyn Error>> {
    let file = fs::File::open(path)?;
    Ok(IcoDirectory::read(std::io::BufReader::new(file), layout)?)
}

fn first_free_output_path() -> PathBuf {
    let mut path = PathBuf::from("out.ico");
    let mut index: i32 = 0;
    while path.exists() {
        index += 1;
        path = PathBuf::from(format!("out{}.ico", index));
    }
    path
}

//===========================================================================//

use chrono::Utc;
use clap::{Parser, ValueEnum};
use imgico::{
    DEFAULT_ICON_SIZES, IcoOptions, RasterImage, SvgOptions, decode, ico, ico_from_image,
    svg_from_image,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Ico,
    Svg,
}

impl Format {
    fn extension(&self) -> &'static str {
        match self {
            Format::Ico => "ico",
            Format::Svg => "svg",
        }
    }
}

#[derive(Parser)]
#[command(name = "imgico", about = "Convert images to ICO or SVG")]
struct Cli {
    /// Input image (PNG, JPEG, GIF, BMP or WebP)
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Ico)]
    format: Format,

    /// Comma-separated output sizes, each between 1 and 256
    #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_ICON_SIZES)]
    sizes: Vec<u32>,

    /// Output directory (default: imgico-<UTC timestamp>)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Also write icon.ico holding every size (ico format only)
    #[arg(long)]
    bundle: bool,
}

fn default_out_dir() -> PathBuf {
    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
    PathBuf::from(format!("imgico-{}", timestamp))
}

fn convert_ico(image: &RasterImage, sizes: &[u32]) -> imgico::Result<Vec<u8>> {
    ico_from_image(
        image,
        &IcoOptions {
            sizes: sizes.to_vec(),
        },
    )
}

fn convert_svg(image: &RasterImage, size: u32) -> imgico::Result<Vec<u8>> {
    svg_from_image(
        image,
        &SvgOptions {
            size,
            ..SvgOptions::default()
        },
    )
}

fn write_output(path: &Path, data: &[u8]) {
    if let Err(e) = fs::write(path, data) {
        eprintln!("Error writing output file '{}': {}", path.display(), e);
        process::exit(4);
    }
    log::info!("wrote {} ({} bytes)", path.display(), data.len());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(1);
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    let input_data = match fs::read(&cli.input) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error reading input file '{}': {}", cli.input.display(), e);
            process::exit(2);
        }
    };

    let image = match decode(&input_data) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error converting '{}': {}", cli.input.display(), e);
            process::exit(3);
        }
    };

    // Render everything before touching the filesystem
    let mut outputs = Vec::with_capacity(cli.sizes.len() + 1);
    for &size in &cli.sizes {
        let name = format!("{}.{}", size, cli.format.extension());
        let converted = match cli.format {
            Format::Ico => convert_ico(&image, &[size]),
            Format::Svg => convert_svg(&image, size),
        };
        match converted {
            Ok(data) => outputs.push((name, data)),
            Err(e) => {
                eprintln!("Error converting '{}': {}", cli.input.display(), e);
                process::exit(3);
            }
        }
    }

    if cli.bundle && cli.format == Format::Svg {
        log::warn!("--bundle only applies to ico output, ignoring");
    }

    if cli.bundle && cli.format == Format::Ico {
        match convert_ico(&image, &cli.sizes) {
            Ok(data) => {
                match ico::read_directory(&data) {
                    Ok(entries) => {
                        for entry in entries {
                            log::debug!(
                                "icon.ico entry {}x{}: {} bytes at offset {}",
                                entry.width,
                                entry.height,
                                entry.payload_size,
                                entry.payload_offset
                            );
                        }
                    }
                    Err(e) => log::warn!("icon.ico directory does not parse back: {}", e),
                }
                outputs.push(("icon.ico".to_string(), data));
            }
            Err(e) => {
                eprintln!("Error converting '{}': {}", cli.input.display(), e);
                process::exit(3);
            }
        }
    }

    let out_dir = cli.out_dir.unwrap_or_else(default_out_dir);
    if let Err(e) = fs::create_dir_all(&out_dir) {
        eprintln!(
            "Error creating output directory '{}': {}",
            out_dir.display(),
            e
        );
        process::exit(4);
    }

    for (name, data) in &outputs {
        write_output(&out_dir.join(name), data);
    }

    println!(
        "Wrote {} {} files to {}",
        outputs.len(),
        cli.format.extension().to_uppercase(),
        out_dir.display()
    );
}

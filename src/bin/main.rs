use std::path::PathBuf;

use clap::{
    Parser,
    Subcommand,
};
use nvs_image::{
    NvsData,
    PAGE_SIZE,
};

#[derive(Parser)]
#[command(name = "nvs-image")]
#[command(about = "ESP-IDF NVS partition image generator and parser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an NVS partition image from a CSV file
    Generate {
        /// Input CSV file path
        input: PathBuf,

        /// Output image file path
        output: PathBuf,

        /// Partition size in bytes (must be a multiple of 4096)
        #[arg(short, long, value_parser = parse_size)]
        size: usize,
    },
    /// Parse an NVS partition image to a CSV file
    Parse {
        /// Input image file path
        input: PathBuf,

        /// Output CSV file path
        output: PathBuf,

        /// Verify page-header and entry checksums while parsing
        #[arg(long)]
        verify: bool,
    },
}

fn parse_size(s: &str) -> Result<usize, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|e| e.to_string())
    } else {
        s.parse::<usize>().map_err(|e| e.to_string())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            size,
        } => {
            println!("Parsing CSV file: {}", input.display());
            let data = NvsData::from_csv_file(&input)?;
            println!("Found {} entries", data.len());

            println!("Generating partition image...");
            data.to_image_file(&output, size)?;

            println!("Successfully generated NVS partition: {}", output.display());
            println!("Size: {} bytes ({} pages)", size, size / PAGE_SIZE);

            Ok(())
        }
        Commands::Parse {
            input,
            output,
            verify,
        } => {
            println!("Parsing image file: {}", input.display());
            let bytes = std::fs::read(&input)?;

            let data = if verify {
                let (data, diagnostics) = nvs_image::decode_verified(&bytes)?;
                for diagnostic in &diagnostics {
                    eprintln!("warning: {diagnostic}");
                }
                data
            } else {
                nvs_image::decode(&bytes)?
            };
            println!("Found {} entries", data.len());

            println!("Writing CSV file...");
            data.to_csv_file(&output)?;

            println!("Successfully parsed NVS partition to: {}", output.display());

            Ok(())
        }
    }
}

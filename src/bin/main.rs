use std::path::PathBuf;

use clap::Parser;
use flash_crc::FlashRegion;

#[derive(Parser)]
#[command(name = "flash-crc")]
#[command(
    about = "Append a CRC-32/MPEG-2 checksum to a firmware binary and its Intel HEX file",
    long_about = None
)]
struct Cli {
    /// Flash region start address in hexadecimal (e.g. 08000000)
    #[arg(value_parser = parse_address)]
    flash_start: u32,

    /// Flash region size in bytes, including the 4-byte checksum
    #[arg(value_parser = parse_size)]
    flash_size: u32,

    /// Firmware binary, rewritten in place
    bin_file: PathBuf,

    /// Intel HEX file, rewritten in place
    hex_file: PathBuf,
}

fn parse_address(s: &str) -> Result<u32, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|e| e.to_string())
}

fn parse_size(s: &str) -> Result<u32, String> {
    s.parse::<u32>().map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let region = FlashRegion::new(cli.flash_start, cli.flash_size)?;

    let checksum = flash_crc::patch_firmware_files(&region, &cli.bin_file, &cli.hex_file)?;
    println!("CRC: 0x{checksum:X}");

    Ok(())
}

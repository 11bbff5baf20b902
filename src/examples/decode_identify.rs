// examples/decode_identify.rs

use anyhow::Context;
use clap::Parser;
use smart_identify::{DecodedIdentity, Decoder, Field, RawRecord};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Decode a raw 512-byte ATA IDENTIFY DEVICE dump
struct CommandLine {
    /// Dump file to read, or `-` for stdin
    path: PathBuf,

    /// Print the decoded identity as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Also print string fields before padding is trimmed
    #[arg(long, default_value_t = false)]
    raw_text: bool,
}

fn main() -> anyhow::Result<()> {
    let args = CommandLine::parse();

    let record = if args.path.as_os_str() == "-" {
        RawRecord::read_from(io::stdin().lock()).context("reading identify record from stdin")?
    } else {
        let file = File::open(&args.path)
            .with_context(|| format!("opening {}", args.path.display()))?;
        RawRecord::read_from(file).with_context(|| format!("reading {}", args.path.display()))?
    };

    let decoder = Decoder::standard();
    let identity = decoder.decode(&record);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&identity)?);
    } else {
        print_identity(&identity);
    }

    if args.raw_text {
        println!("  Untrimmed strings:");
        for field in [Field::SerialNumber, Field::FirmwareRevision, Field::ModelNumber] {
            if let Some(raw) = decoder.raw_text(&record, field) {
                println!("    - {:<22}: {:?}", format!("{:?}", field), raw);
            }
        }
    }
    Ok(())
}

fn print_identity(identity: &DecodedIdentity) {
    let print_opt = |name: &str, val: Option<&str>| {
        println!("    - {:<22}: {}", name, val.unwrap_or("N/A"));
    };

    println!("----------------------------------------");
    println!("  Model:        {}", identity.model_number);
    println!("  Serial:       {}", identity.serial_number);
    println!("  Firmware:     {}", identity.firmware_revision);
    println!("----------------------------------------");
    println!("  Identify Info:");
    print_opt("WWN", identity.wwn.map(|wwn| wwn.to_string()).as_deref());
    println!("    - {:<22}: {:?}", "Rotation Rate", identity.media_rotation());
    println!(
        "    - {:<22}: {} bytes ({} sectors)",
        "Capacity",
        identity.capacity_bytes(),
        identity.user_sectors
    );
    println!(
        "    - {:<22}: {} bytes logical, {} bytes physical",
        "Sector Size", identity.logical_sector_size, identity.physical_sector_size
    );
    print_opt("ATA Version", identity.ata_major_version);
    print_opt("SATA Version", identity.sata_version);
    print_opt("SATA Speed", identity.sata_speed);
    println!(
        "    - {:<22}: supported={} enabled={}",
        "SMART", identity.smart_supported, identity.smart_enabled
    );
    println!("    - {:<22}: {}", "TRIM", identity.trim_supported);
    println!("    - {:<22}: {:?}", "Checksum", identity.integrity);
    println!("----------------------------------------");
}

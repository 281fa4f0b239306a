use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use dbpf_rs::package::index::ResourceKey;
use dbpf_rs::{Package, PackageOpenOptions};

#[derive(Parser)]
#[command(name = "dbpf-rs", about = "Inspect and repack DBPF package files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every resource in a package.
    List { package: PathBuf },
    /// Extract a single resource's decompressed bytes to a file.
    Extract {
        package: PathBuf,
        #[arg(long)]
        type_id: String,
        #[arg(long)]
        group_id: String,
        #[arg(long)]
        instance_id: String,
        out: PathBuf,
    },
    /// Rewrite a package, recompressing every resource with this crate's QFS encoder.
    Recompress { package: PathBuf, out: PathBuf },
}

fn parse_hex(s: &str) -> Result<u32, std::num::ParseIntError> {
    u32::from_str_radix(s.trim_start_matches("0x").trim_start_matches("0X"), 16)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::List { package } => {
            let pkg = Package::open(&package, PackageOpenOptions::default())?;
            for entry in pkg.entries() {
                let name = dbpf_rs::registry::display_name(entry.key.type_id);
                let compressed = if pkg.is_compressed(&entry.key) { " (compressed)" } else { "" };
                println!("{name} {} {} bytes{}", entry.key, entry.file_size, compressed);
            }
        }
        Command::Extract { package, type_id, group_id, instance_id, out } => {
            let pkg = Package::open(&package, PackageOpenOptions::default())?;
            let key = ResourceKey::new(parse_hex(&type_id)?, parse_hex(&group_id)?, parse_hex(&instance_id)?);
            let bytes = pkg.resource_bytes(&key)?;
            std::fs::write(&out, &bytes)?;
            info!("wrote {} bytes to {}", bytes.len(), out.display());
        }
        Command::Recompress { package, out } => {
            let pkg = Package::open(&package, PackageOpenOptions::default())?;
            let mut builder = dbpf_rs::package::PackageBuilder::new();
            let options = dbpf_rs::PackageWriteOptions::default();
            for entry in pkg.entries() {
                let bytes = pkg.resource_bytes(&entry.key)?;
                builder.with_resource(entry.key, bytes, &options);
            }
            builder.write_to_file(&out)?;
            info!("wrote {}", out.display());
        }
    }

    Ok(())
}

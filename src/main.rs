use clap::{Parser, Subcommand};
use hexcrypt::cli::{
    cipher_hex_file, generate_key_file, show_info, verify_hex_file, CipherOptions, InfoOptions,
    KeygenOptions,
};
use hexcrypt::Layout;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Version info from build.rs
const VERSION: &str = env!("HEXCRYPT_VERSION");
const PROFILE: &str = env!("HEXCRYPT_PROFILE");
const GIT_HASH: &str = env!("HEXCRYPT_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} ({})", PROFILE, VERSION, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "hexcrypt")]
#[command(author, about = "Encrypt and decrypt the data in Intel HEX files", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt or decrypt the data records of a hex file.
    /// Addresses are unchanged, checksums are updated.
    #[command(aliases = ["c", "encrypt", "decrypt"])]
    Cipher {
        /// Input hex file
        input: PathBuf,

        /// Raw binary key file; the whole file is the key
        keyfile: PathBuf,

        /// Output hex file
        output: PathBuf,

        /// In-memory layout: merged (by address) or preserved (line for line)
        #[arg(long, default_value = "merged", value_parser = parse_layout)]
        layout: Layout,
    },

    /// Check that a hex file parses and every checksum is valid
    #[command(alias = "v")]
    Verify {
        /// Hex file to check
        file: PathBuf,

        /// In-memory layout: merged (by address) or preserved (line for line)
        #[arg(long, default_value = "merged", value_parser = parse_layout)]
        layout: Layout,
    },

    /// Show information about a hex file
    #[command(alias = "i")]
    Info {
        /// Hex file to inspect
        file: PathBuf,

        /// In-memory layout: merged (by address) or preserved (line for line)
        #[arg(long, default_value = "merged", value_parser = parse_layout)]
        layout: Layout,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a random key file
    #[command(alias = "k")]
    Keygen {
        /// Output key file
        output: PathBuf,

        /// Key length in bytes
        #[arg(long, default_value = "32")]
        length: usize,
    },
}

fn parse_layout(s: &str) -> Result<Layout, String> {
    s.parse()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.version {
        println!("hexcrypt {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if Cli::command().print_help().is_err() {
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result = match command {
        Commands::Cipher {
            input,
            keyfile,
            output,
            layout,
        } => {
            let options = CipherOptions { layout };
            cipher_hex_file(&input, &keyfile, &output, &options).map(|outcome| {
                println!(
                    "Ciphered {} records ({} bytes) into {}",
                    outcome.report.records,
                    outcome.report.bytes,
                    output.display()
                );
                println!("Key fingerprint: {}", outcome.fingerprint);
            })
        }

        Commands::Verify { file, layout } => verify_hex_file(&file, layout).map(|summary| {
            println!(
                "OK: {} records, {} data bytes",
                summary.records, summary.data_bytes
            );
        }),

        Commands::Info { file, layout, json } => {
            let options = InfoOptions { layout, json };
            show_info(&file, &options).map(|info| print!("{}", info))
        }

        Commands::Keygen { output, length } => {
            let options = KeygenOptions { length };
            generate_key_file(&output, &options).map(|key| {
                println!("Wrote {} byte key to {}", key.len(), output.display());
            })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.diagnostic());
            ExitCode::FAILURE
        }
    }
}

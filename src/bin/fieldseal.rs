//! Fieldseal CLI - seal and open stored field values
//!
//! Command-line interface for sealing values for an owner with
//! AES-128-CBC + HMAC-SHA256 and opening them again.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use fieldseal::file_ops;
use fieldseal::{FieldCipher, FieldsealError, KeyMode, OwnerId};

#[derive(Parser)]
#[command(name = "fieldseal")]
#[command(version)]
#[command(about = "Per-owner authenticated encryption of stored values.", long_about = None)]
struct Cli {
    /// How keys are derived from the owner id. "legacy" reads and writes
    /// existing stored data; "split" uses independent subkeys.
    #[arg(long, global = true, env = "FIELDSEAL_KEY_MODE", default_value = "legacy")]
    key_mode: KeyMode,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seal a file's contents for an owner
    #[command(alias = "e")]
    Encrypt {
        /// Id of the owner the value belongs to
        #[arg(long, value_name = "ID")]
        owner: OwnerId,

        /// Path to the file whose contents is to be sealed
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the blob to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Open a blob file for an owner
    #[command(alias = "d")]
    Decrypt {
        /// Id of the owner the value belongs to
        #[arg(long, value_name = "ID")]
        owner: OwnerId,

        /// Path to the blob file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the plaintext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Replace a blob file with new content, after checking that the
    /// existing blob belongs to the same owner.
    #[command(alias = "u")]
    Update {
        /// Id of the owner the value belongs to
        #[arg(long, value_name = "ID")]
        owner: OwnerId,

        /// Path to the file whose contents is to be sealed
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing blob file to replace
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Print the JSON view of a blob file. Unreadable data shows as null.
    View {
        /// Id of the owner the value belongs to
        #[arg(long, value_name = "ID")]
        owner: OwnerId,

        /// Item id to include in the view
        #[arg(long)]
        id: Option<u64>,

        /// Path to the blob file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cipher = FieldCipher::new(cli.key_mode);
    tracing::debug!(mode = %cipher.mode(), "key mode selected");

    let result = match cli.command {
        Commands::Encrypt {
            owner,
            input,
            output,
        } => file_ops::encrypt_file(&input, &output, &owner, &cipher),
        Commands::Decrypt {
            owner,
            input,
            output,
        } => file_ops::decrypt_file(&input, &output, &owner, &cipher),
        Commands::Update {
            owner,
            input,
            output,
        } => file_ops::update_file(&input, &output, &owner, &cipher),
        Commands::View { owner, id, input } => {
            file_ops::view_file(&input, id, &owner, &cipher).and_then(|view| print_json(&view))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json(view: &fieldseal::item::ItemView) -> Result<(), FieldsealError> {
    let json = serde_json::to_string(view).map_err(|e| {
        FieldsealError::with_kind_and_source(
            fieldseal::ErrorCategory::Internal,
            fieldseal::ErrorKind::InternalInvariant,
            "failed to serialize view",
            e,
        )
    })?;
    println!("{json}");
    Ok(())
}

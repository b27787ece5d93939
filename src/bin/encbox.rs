//! encbox CLI - password-based file encryption
//!
//! Command-line interface for encrypting and decrypting single files with
//! the encbox container format. Encryption writes
//! `<outdir>/<filename>.enc`; decryption requires a `*.enc` input and
//! strips the extension.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use encbox::file_ops::{self, PassSummary};
use encbox::passkey::{ConstantKeyReader, KeyReader, ReaderKeyReader, TerminalKeyReader};
use encbox::paths;

#[derive(Parser)]
#[command(name = "encbox")]
#[command(version)]
#[command(about = "Password-based file encryption.", long_about = None)]
struct Cli {
    /// Key as a string. Visible in process listings; prefer the terminal
    /// prompt or --key-stdin.
    #[arg(long, global = true, value_name = "KEY")]
    key: Option<String>,

    /// Read the key from stdin instead of from the terminal
    #[arg(long, global = true, conflicts_with = "key")]
    key_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file into an output directory
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        input: PathBuf,

        /// Directory to write the .enc file to
        outdir: PathBuf,
    },

    /// Decrypt a .enc file into an output directory
    #[command(alias = "d")]
    Decrypt {
        /// Path to the .enc file whose contents is to be decrypted
        input: PathBuf,

        /// Directory to write the decrypted file to
        outdir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let mut reader = get_key_reader(&cli);

    let result = match cli.command {
        Commands::Encrypt { input, outdir } => {
            paths::encrypt_output_path(&input, &outdir).and_then(|output| {
                let summary = file_ops::encrypt_file(&input, &output, &mut *reader)?;
                print_summary("Encryption success", &summary);
                Ok(())
            })
        }
        Commands::Decrypt { input, outdir } => {
            paths::decrypt_output_path(&input, &outdir).and_then(|output| {
                let summary = file_ops::decrypt_file(&input, &output, &mut *reader)?;
                print_summary("Decryption success", &summary);
                Ok(())
            })
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn get_key_reader(cli: &Cli) -> Box<dyn KeyReader> {
    if let Some(key) = &cli.key {
        Box::new(ConstantKeyReader::new(key.clone().into_bytes()))
    } else if cli.key_stdin {
        Box::new(ReaderKeyReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalKeyReader::new())
    }
}

fn print_summary(verb: &str, summary: &PassSummary) {
    println!(
        "{}:\n  Length: {}\n  Checksum: 0x{:08X}",
        verb, summary.length, summary.checksum
    );
}

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sigmatch::scan::{DEFAULT_DOC_PATTERN, DEFAULT_KEY_PATTERN};
use sigmatch::{Outcome, ScanFilter};

#[derive(Parser)]
#[command(name = "sigmatch")]
#[command(about = "Checks RSA/SHA-1 signatures of documents against public keys")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check if a document was signed by a key
    Check {
        /// DER encoded RSA public key
        #[arg(long, value_name = "FILE")]
        key: PathBuf,

        /// Raw signature bytes
        #[arg(long, value_name = "FILE", env = "SIGMATCH_SIGNATURE")]
        sig: PathBuf,

        /// Signed document
        #[arg(long, value_name = "FILE")]
        doc: PathBuf,
    },

    /// Try every key in a directory against every document in another
    Scan {
        /// Directory of candidate public keys
        #[arg(long, value_name = "DIR", env = "SIGMATCH_KEYS", default_value = "keys")]
        keys: PathBuf,

        /// Directory of candidate documents
        #[arg(long, value_name = "DIR", env = "SIGMATCH_DOCS", default_value = "pdfs")]
        docs: PathBuf,

        /// Signature shared by all the candidates
        #[arg(
            long,
            value_name = "FILE",
            env = "SIGMATCH_SIGNATURE",
            default_value = "signature.dat"
        )]
        sig: PathBuf,

        /// Regex selecting key files by name
        #[arg(long, value_name = "REGEX", default_value = DEFAULT_KEY_PATTERN)]
        key_pattern: String,

        /// Regex selecting document files by name
        #[arg(long, value_name = "REGEX", default_value = DEFAULT_DOC_PATTERN)]
        doc_pattern: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Check { key, sig, doc } => run_check(&key, &sig, &doc),
        Commands::Scan {
            keys,
            docs,
            sig,
            key_pattern,
            doc_pattern,
        } => run_scan(&keys, &docs, &sig, &key_pattern, &doc_pattern),
    };

    if let Err(err) = &result {
        eprintln!("error: {err:#}");
    }
    ExitCode::from(exit_status(&result))
}

/// 0 when the signature matched, 1 when it did not, 2 when it could not be
/// checked.
fn exit_status(result: &Result<bool>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

fn run_check(key: &Path, sig: &Path, doc: &Path) -> Result<bool> {
    let outcome = sigmatch::check(key, sig, doc).with_context(|| {
        format!(
            "could not check {} against {}",
            doc.display(),
            key.display()
        )
    })?;

    match outcome {
        Outcome::Valid => println!("Signature check verified!"),
        Outcome::Invalid => println!("Signature does not match."),
    }
    Ok(outcome.is_valid())
}

fn run_scan(
    keys: &Path,
    docs: &Path,
    sig: &Path,
    key_pattern: &str,
    doc_pattern: &str,
) -> Result<bool> {
    let filter = ScanFilter::new(key_pattern, doc_pattern).context("invalid file name pattern")?;
    let report = sigmatch::scan(keys, docs, sig, &filter)?;

    for failure in &report.failures {
        eprintln!("warning: {failure}");
    }

    for found in &report.matches {
        println!("Signature check verified!");
        println!("public key file : {}", file_name(&found.key));
        println!("pdf file : {}", file_name(&found.document));
    }

    if report.matches.is_empty() {
        eprintln!(
            "no match among {} checked key/document pairs",
            report.checked
        );
    }
    Ok(!report.matches.is_empty())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

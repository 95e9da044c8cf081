use clap::Parser;
use gensecret::cli::{commands::execute_command, Cli};
use gensecret::error::Error;
use tracing_subscriber::EnvFilter;

fn setup_logging(verbose: u8, quiet: bool) {
    // RUST_LOG wins over the -v/-q flags
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = execute_command(cli) {
        match &e {
            Error::DecryptionFailed => {
                eprintln!("Error: Incorrect master password or corrupted vault");
            }
            Error::SecretNotFound(name) => {
                eprintln!("Error: No secret found with name '{}'", name);
                eprintln!("Use 'gensecret list' to see all secrets");
            }
            Error::VaultNotFound(path) => {
                eprintln!("Error: Vault not found at {}", path);
                eprintln!("Use 'gensecret init' to create a new vault");
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(e.exit_code() as i32);
    }
}

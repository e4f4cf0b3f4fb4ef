use clap::Parser;

mod cli;
pub mod exit_codes;

use cli::args::Cli;
use depot_core::StoreError;

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
    let cli = Cli::parse();
    let code = match cli::commands::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            e.downcast_ref::<StoreError>()
                .map_or(exit_codes::SETUP_FAULT, StoreError::exit_code)
        }
    };
    std::process::exit(code);
}

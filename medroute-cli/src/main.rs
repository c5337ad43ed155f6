//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    env_logger::init();
    if let Err(err) = medroute_cli::run() {
        eprintln!("medroute: {err}");
        std::process::exit(1);
    }
}

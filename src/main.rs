use clap::Parser;
use log::warn;
use snafu::ErrorCompat;

mod args;
mod batch;

fn main() {
    let args = args::Args::parse();
    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    match batch::run_app(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            warn!("Error occured {:?}", e);
            eprintln!("An error occured {}", e);
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                eprintln!("trace: {}", bt);
            }
            std::process::exit(2);
        }
    }
}

use agriwatch::Cli;
use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();

    let result = agriwatch::run(cli);
    logging::flush();

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

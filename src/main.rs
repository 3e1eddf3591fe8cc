use clap::Parser;

mod commands;

fn main() {
    env_logger::init();

    let cli = commands::Cli::parse();
    if let Err(e) = commands::run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

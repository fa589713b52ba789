use std::env;

mod app;
mod config;
mod decoder;
mod engine;
mod error;
mod item;
mod library;
mod playlist;
mod runtime;
mod session;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--print-config") {
        let settings = runtime::load_settings();
        print!("{}", toml::to_string_pretty(&settings)?);
        return Ok(());
    }

    runtime::run(&args)
}

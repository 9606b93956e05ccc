mod app;
mod catalog;
mod config;
mod error;
mod library;
mod runtime;
mod session;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}

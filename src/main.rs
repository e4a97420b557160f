mod commands;
mod dispatch;
mod fallback;
mod parse;
mod registry;
mod services;
mod value;

use registry::Registry;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let mut registry = Registry::new();
    commands::register_all(&mut registry);

    std::process::exit(dispatch::run(&registry, &args));
}

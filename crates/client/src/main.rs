mod app;
mod input;
mod view;

use clap::Parser;
use duet::DEFAULT_PORT;

#[derive(Parser)]
#[command(name = "duet")]
#[command(about = "Duet maze game client")]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1", help = "Server host")]
    server: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT, help = "Server port")]
    port: u16,

    #[arg(long, help = "Start with autopilot input enabled")]
    autopilot: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut app = app::App::connect(&args.server, args.port, args.autopilot)?;
    app.run()
}

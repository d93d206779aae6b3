// cli.rs - Command-line interface configuration
use clap::Parser;

/// The binary takes no behavioural flags; this only provides --help and --version
#[derive(Parser, Debug, Clone)]
#[command(name = "split-loop", version)]
#[command(about = "Opens a window and presents frames from a dedicated display thread", long_about = None)]
pub struct Cli {}

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "winshift",
    version,
    about = "Moves windows between two monitors on a global hotkey"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the hotkeys and run in the foreground (default)
    Run,
    /// Write the default config.json to ~/.config/winshift/
    Init,
    /// Show the monitor geometry used for placement
    Monitors,
    /// List visible windows with their current and target monitor
    Windows,
}

fn main() {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::execute(),
        Commands::Init => commands::init::execute(),
        Commands::Monitors => commands::monitors::execute(),
        Commands::Windows => commands::windows::execute(),
    }
}

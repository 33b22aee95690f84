// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "tunnel-flight")]
#[command(about = "Wireframe tunnel flight along a closed spline", long_about = None)]
pub struct Cli {
    /// JSON configuration file; missing fields take defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seed for star and label placement (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable the status overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["tunnel-flight"]);
        assert!(cli.config.is_none());
        assert!(!cli.no_ui);
        assert_eq!((cli.width, cli.height), (1280, 720));
    }

    #[test]
    fn all_flags() {
        let cli = Cli::parse_from([
            "tunnel-flight",
            "--config",
            "tunnel.json",
            "--seed",
            "42",
            "--no-ui",
            "--width",
            "800",
            "--height",
            "600",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("tunnel.json")));
        assert_eq!(cli.seed, Some(42));
        assert!(cli.no_ui);
        assert_eq!((cli.width, cli.height), (800, 600));
    }
}

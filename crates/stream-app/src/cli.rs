use std::path::PathBuf;

use clap::Parser;

/// Stand-alone host container for the Stream flow widget.
#[derive(Parser, Debug)]
#[command(name = "stream-host", version, about)]
pub struct Args {
    /// Launch-data JSON file; the session state is written back on close.
    #[arg(long, default_value = "cmi.launch_data")]
    pub launch_data: PathBuf,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Load this flow file after the launch data.
    #[arg(long)]
    pub import_flow: Option<PathBuf>,

    /// Write the final flow to this file on close.
    #[arg(long)]
    pub export_flow: Option<PathBuf>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["stream-host"]).unwrap();
        assert_eq!(args.launch_data, PathBuf::from("cmi.launch_data"));
        assert!(args.config.is_none());
        assert!(args.log_level.is_none());
    }

    #[test]
    fn overrides() {
        let args = Args::try_parse_from([
            "stream-host",
            "--launch-data",
            "/tmp/state.json",
            "--log-level",
            "debug",
            "--export-flow",
            "out.json",
        ])
        .unwrap();
        assert_eq!(args.launch_data, PathBuf::from("/tmp/state.json"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.export_flow, Some(PathBuf::from("out.json")));
    }
}

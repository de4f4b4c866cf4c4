use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Headless AR mockup session arguments.
#[derive(Parser, Debug)]
#[command(
    name = "previz-ar",
    about = "Runs an AR mockup scene headless and prints the last composed frame as JSON",
    version
)]
struct CliArgs {
    /// Scene document to load before the first frame.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Number of frames to compose.
    #[arg(long, default_value = "120")]
    frames: u32,

    /// Simulated time between frames in milliseconds.
    #[arg(long, default_value = "16")]
    interval_ms: u64,

    /// Put the orientation sensor behind a permission gate.
    #[arg(long)]
    gate: bool,
}

/// Options for a session started from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub scene: Option<PathBuf>,
    pub frames: u32,
    pub frame_interval: Duration,
    /// Whether the orientation sensor sits behind a permission gate.
    pub motion_gate: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scene: None,
            frames: 120,
            frame_interval: Duration::from_millis(16),
            motion_gate: false,
        }
    }
}

impl From<CliArgs> for SessionConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            scene: args.scene,
            frames: args.frames,
            frame_interval: Duration::from_millis(args.interval_ms),
            motion_gate: args.gate,
        }
    }
}

impl SessionConfig {
    /// Parses the process arguments, printing help or usage errors and exiting as clap does.
    pub fn parse() -> Self {
        CliArgs::parse().into()
    }

    /// Parses an argument list that starts with the program name.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        CliArgs::try_parse_from(args).map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<SessionConfig, clap::Error> {
        SessionConfig::try_parse_from(std::iter::once("previz-ar").chain(args.iter().copied()))
    }

    #[test]
    fn no_arguments_gives_defaults() {
        assert_eq!(parse(&[]).unwrap(), SessionConfig::default());
    }

    #[test]
    fn all_flags_parse() {
        let config = parse(&["--scene", "demo.json", "--frames", "3", "--interval-ms", "0", "--gate"])
            .unwrap();
        assert_eq!(config.scene, Some(PathBuf::from("demo.json")));
        assert_eq!(config.frames, 3);
        assert_eq!(config.frame_interval, Duration::ZERO);
        assert!(config.motion_gate);
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(parse(&["--scene"]).is_err());
        assert_eq!(
            parse(&["--frames", "many"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["--fast"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}

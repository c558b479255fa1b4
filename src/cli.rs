use clap::Parser;
use std::path::PathBuf;

/// Timeline editor for voice story clips
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Story to open on startup (can also be entered in the window)
    #[arg(short = 's', long = "story", value_name = "ID")]
    pub story: Option<String>,

    /// Story backend base URL (overrides STORYLINE_BACKEND_URL and settings)
    #[arg(short = 'b', long = "backend", value_name = "URL")]
    pub backend: Option<String>,

    /// Enable debug logging to file (default: storyline.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from(["storyline", "--story", "s1", "-vv", "--log", "-b", "http://h:1"]);
        assert_eq!(args.story.as_deref(), Some("s1"));
        assert_eq!(args.verbosity, 2);
        assert_eq!(args.log_file, Some(None));
        assert_eq!(args.backend.as_deref(), Some("http://h:1"));
    }

    #[test]
    fn test_log_file_path() {
        let args = Args::parse_from(["storyline", "--log", "out.log"]);
        assert_eq!(args.log_file, Some(Some(PathBuf::from("out.log"))));
        assert!(args.story.is_none());
    }
}

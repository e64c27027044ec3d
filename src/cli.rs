use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use pagewin::scanner::ScanConfig;
use pagewin::BoundaryPolicy;

pub const HELP_COMMANDS: &str = "\
Commands (one per line on stdin):
  next / n        : Next image
  prev / p        : Previous image
  goto N          : Jump to image N (0-based)
  step D          : Move by D images (negative goes back)
  zoom S          : Set zoom scale of the current image
  reset           : Reset zoom of the current image
  back            : Unzoom if zoomed, otherwise close
  swipe           : Swipe-to-dismiss gesture
  retry           : Refetch the current image
  state           : Print the current status line
  wait            : Wait for the current image to finish loading
  quit / q        : Exit
";

#[derive(Parser)]
#[command(name = "pagewin", about = "Headless windowed image prefetcher", after_help = HELP_COMMANDS)]
pub struct Cli {
    /// Files or directories to page through
    #[arg(required_unless_present = "file_list")]
    pub paths: Vec<PathBuf>,

    /// Load file list from a text file (one path per line)
    #[arg(short = 'L', long, value_name = "FILE")]
    pub file_list: Option<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Deepest directory level visited with --recursive (0 = unlimited)
    #[arg(long, default_value = "0", value_name = "N")]
    pub max_depth: usize,

    /// Follow symbolic links while scanning directories
    #[arg(long)]
    pub follow_links: bool,

    /// Index of the first image shown
    #[arg(short, long, default_value = "0")]
    pub start: usize,

    /// Images kept loaded on each side of the cursor [env: PAGEWIN_RADIUS]
    #[arg(long)]
    pub radius: Option<usize>,

    /// Decode worker threads [env: PAGEWIN_WORKERS]
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// What stepping past the first or last image does: clamp, reject or wrap
    #[arg(long, default_value = "clamp")]
    pub boundary: BoundaryPolicy,

    /// Ignore zoom commands
    #[arg(long)]
    pub no_zoom: bool,

    /// Ignore the swipe command
    #[arg(long)]
    pub no_swipe_dismiss: bool,
}

impl Cli {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            recursive: self.recursive,
            max_depth: self.max_depth,
            follow_symlinks: self.follow_links,
        }
    }
}

/// A parsed stdin command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    Goto(usize),
    Step(isize),
    Zoom(f32),
    Reset,
    Back,
    Swipe,
    Retry,
    State,
    Wait,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or_else(|| "empty command".to_string())?;
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(format!("too many arguments to '{name}'"));
        }

        fn number<N: FromStr>(name: &str, arg: Option<&str>) -> Result<N, String> {
            let arg = arg.ok_or_else(|| format!("'{name}' needs an argument"))?;
            arg.parse()
                .map_err(|_| format!("'{arg}' is not a valid argument for '{name}'"))
        }

        let cmd = match name.to_ascii_lowercase().as_str() {
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "goto" | "g" => Self::Goto(number(name, arg)?),
            "step" => Self::Step(number(name, arg)?),
            "zoom" | "z" => Self::Zoom(number(name, arg)?),
            "reset" => Self::Reset,
            "back" | "b" => Self::Back,
            "swipe" => Self::Swipe,
            "retry" => Self::Retry,
            "state" | "s" => Self::State,
            "wait" | "w" => Self::Wait,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}'")),
        };

        let takes_arg = matches!(cmd, Self::Goto(_) | Self::Step(_) | Self::Zoom(_));
        if !takes_arg && arg.is_some() {
            return Err(format!("'{name}' takes no argument"));
        }
        Ok(cmd)
    }
}

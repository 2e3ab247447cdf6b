use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use itertools::Itertools;
use log::LevelFilter;
use which_path::{Locator, Platform, WhichError};

/// What to report for each program.
#[derive(Debug, Clone, Copy)]
enum Mode {
    First,
    All,
    Silent,
}

impl From<&ArgMatches> for Mode {
    fn from(matches: &ArgMatches) -> Self {
        if matches.get_flag("silent") {
            Self::Silent
        } else if matches.get_flag("all") {
            Self::All
        } else {
            Self::First
        }
    }
}

fn cli() -> Command {
    Command::new("which")
        .about("Locate programs on the search path")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("all")
                .short('a')
                .long("all")
                .action(ArgAction::SetTrue)
                .help("Print every match instead of the first"),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .action(ArgAction::SetTrue)
                .conflicts_with("all")
                .help("Print nothing, only set the exit status"),
        )
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .value_name("PATH")
                .value_parser(clap::value_parser!(OsString))
                .help("Search this path instead of $PATH"),
        )
        .arg(
            Arg::new("platform")
                .long("platform")
                .value_name("PLATFORM")
                .value_parser(Platform::parse)
                .help("Path conventions to use: posix or windows"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Log the search, repeat for more detail"),
        )
        .arg(
            Arg::new("programs")
                .value_name("PROGRAM")
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append),
        )
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    colog::default_builder().filter_level(level).init();
}

fn build_locator(matches: &ArgMatches) -> Locator {
    let mut builder = Locator::builder();
    if let Some(path) = matches.get_one::<OsString>("path") {
        builder = builder.search_path(path);
    }
    if let Some(platform) = matches.get_one::<Platform>("platform") {
        log::info!("using {platform} conventions");
        builder = builder.resolver(platform.resolver());
    }
    builder.build()
}

/// Writes one path per line, byte for byte, so non-Unicode names survive.
fn write_paths(out: &mut impl Write, paths: &[PathBuf]) -> io::Result<()> {
    let lines = paths.iter().map(|path| path.as_os_str().as_encoded_bytes());
    for chunk in Itertools::intersperse(lines, &b"\n"[..]) {
        out.write_all(chunk)?;
    }
    out.write_all(b"\n")
}

fn main() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let locator = build_locator(&matches);
    let mode = Mode::from(&matches);
    let programs = matches
        .get_many::<String>("programs")
        .into_iter()
        .flatten();

    let mut stdout = io::stdout().lock();
    let mut all_found = true;

    for program in programs {
        let found = match mode {
            Mode::Silent => locator.exists(program),
            Mode::First => match locator.find_required(program) {
                Ok(path) => {
                    write_paths(&mut stdout, &[path])?;
                    true
                }
                Err(err) => {
                    eprintln!("{err}");
                    false
                }
            },
            Mode::All => {
                let paths = locator.find_all(program);
                if paths.is_empty() {
                    eprintln!(
                        "{}",
                        WhichError::NotFound {
                            program: program.into()
                        }
                    );
                    false
                } else {
                    write_paths(&mut stdout, &paths)?;
                    true
                }
            }
        };
        all_found &= found;
    }

    stdout.flush().context("flushing stdout")?;

    Ok(if all_found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

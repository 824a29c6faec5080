use std::path::PathBuf;

use clap::Parser;

use ribbon_kconfig::{BuildError, project, workspace};

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// Delete and recreate the build, config and install directories
    #[clap(short = 'd', long, value_name = "PROJECT_PATH")]
    distclean: Option<PathBuf>,

    /// Assemble the configuration tree: "project_path;component1;component2;..."
    #[clap(short = 'i', long = "project_init", value_name = "PROJECT;COMPONENTS")]
    project_init: Option<String>,

    /// Edit the configuration interactively
    #[clap(short = 'm', long, value_name = "PROJECT_PATH")]
    menuconfig: Option<PathBuf>,
}

fn main() -> Result<(), BuildError> {
    init_logger();
    let args = Args::parse();
    if let Some(path) = args.distclean {
        workspace::distclean(&path)?;
    } else if let Some(init) = args.project_init {
        let mut parts = init.split(';');
        let project = PathBuf::from(parts.next().unwrap_or_default());
        let components: Vec<PathBuf> = parts.map(PathBuf::from).collect();
        project::project_init(&project, &components)?;
    } else if let Some(path) = args.menuconfig {
        project::menuconfig(&path)?;
    } else {
        println!("unknown command");
    }
    Ok(())
}

struct StdoutLogger;

static LOGGER: StdoutLogger = StdoutLogger;

impl log::Log for StdoutLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        println!("{} {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

fn init_logger() {
    let level = match std::env::var("RIBBON_LOG").as_deref() {
        Ok("trace") => log::LevelFilter::Trace,
        Ok("debug") => log::LevelFilter::Debug,
        _ => log::LevelFilter::Info,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

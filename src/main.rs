use crate::error::{PruneError, UsageError};
use crate::operation::{usage_text, SUPPORTED_METHODS};
use clap::Parser;
use std::io::Write;
use std::str::FromStr;

mod commands {
    pub mod prune;
}
mod error;
mod hub;
mod operation;
mod pruner;
mod thing;
mod version_info;

/// Delete things registered with a Ninja Sphere hub by type, name or
/// promoted flag, or list everything the hub knows about.
#[derive(clap::Parser, Debug)]
#[command(version = version_info::pruner_version())]
pub struct Args {
    #[command(flatten)]
    hub_args: hub::HubArguments,

    #[command(flatten)]
    prune: commands::prune::PruneCommand,
}

pub fn opt_env_var<T: FromStr>(name: &str) -> anyhow::Result<Option<T>>
where
    <T as FromStr>::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(p) => {
            Ok(Some(p.parse().map_err(|err| {
                anyhow::anyhow!("parsing ${name}: {err:#}")
            })?))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => anyhow::bail!("${name} is invalid: {err:#}"),
    }
}

/// Report the outcome of a run and return the process exit status.
/// Argument problems go to stdout alongside the usage text; everything
/// else goes to stderr.
fn finish<O: Write, E: Write>(
    result: anyhow::Result<()>,
    stdout: &mut O,
    stderr: &mut E,
) -> i32 {
    let Err(err) = result else {
        return 0;
    };

    let written = match err.downcast_ref::<UsageError>() {
        Some(UsageError::Arguments) => writeln!(stdout, "{}", usage_text(SUPPORTED_METHODS)),
        Some(UsageError::InvalidMethod { method, .. }) => {
            log::debug!("unknown method {method:?}");
            writeln!(stdout, "{err}")
        }
        Some(UsageError::InvalidBool { value }) => {
            log::debug!("cannot parse {value:?} as a boolean");
            writeln!(stdout, "{err}")
        }
        None => match err.downcast_ref::<PruneError>() {
            Some(prune) => writeln!(stderr, "{prune}"),
            None => writeln!(stderr, "{err:#}"),
        },
    };
    if let Err(write_err) = written {
        log::error!("while reporting {err:#}: {write_err:#}");
    }

    1
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    color_backtrace::install();
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("Loaded environment from {}", path.display());
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    log::debug!("sphere-pruner {}", version_info::pruner_version());

    let result = args.prune.run(&args).await;
    let status = finish(result, &mut std::io::stdout(), &mut std::io::stderr());
    if status != 0 {
        std::process::exit(status);
    }
}

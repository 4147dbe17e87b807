use std::path::PathBuf;

use sevlog::remote::RemoteConfig;

use crate::args::Args;

#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
    pub dsn: Option<String>,
    pub remote: RemoteConfig,
}

impl Config {
    pub fn from_args(args: &Args) -> eyre::Result<Self> {
        let log_file = match (&args.log_file, args.persist) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(default_log_path(&args.name)?),
            (None, false) => None,
        };

        Ok(Self {
            name: args.name.clone(),
            verbose: args.verbose,
            log_file,
            dsn: args.dsn.clone().filter(|dsn| !dsn.trim().is_empty()),
            remote: RemoteConfig {
                request_timeout: args.request_timeout,
                flush_timeout: args.flush_timeout,
            },
        })
    }
}

// NOTE: relies on HOME (USERPROFILE on Windows) when XDG_DATA_HOME is unset.
#[cfg(not(target_os = "windows"))]
const HOME_VAR: &str = "HOME";

#[cfg(target_os = "windows")]
const HOME_VAR: &str = "USERPROFILE";

fn data_dir_from(xdg_data_home: Option<String>, home: Option<String>) -> Option<PathBuf> {
    xdg_data_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|home| PathBuf::from(home).join(".local").join("share")))
}

pub fn data_dir() -> eyre::Result<PathBuf> {
    data_dir_from(
        std::env::var("XDG_DATA_HOME").ok(),
        std::env::var(HOME_VAR).ok(),
    )
    .ok_or_else(|| eyre::eyre!("Can't locate a data dir, ${} not found", HOME_VAR))
}

pub fn default_log_path(name: &str) -> eyre::Result<PathBuf> {
    Ok(data_dir()?.join(name).join(format!("{}.log", name)))
}

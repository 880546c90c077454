use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::cli::Settings;

/// Installs the global subscriber. In the TUI logs only go to a file,
/// since anything written to the terminal would tear the screen.
pub fn init(settings: &Settings) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let installed = match (&settings.log_file, settings.once) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        (None, true) => builder.with_writer(io::stderr).try_init(),
        (None, false) => return Ok(()),
    };

    installed.map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

//! Tracing setup. The real device has no log sink other than whatever the
//! debug probe captures; the host build logs to stdout through `tracing`
//! the same way the rest of the workspace does.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub fn init(verbose: bool) {
    let max_level = if verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("failed to install tracing subscriber");
}

use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Progress lines go to stderr as bare messages. `RUST_LOG` still
/// overrides the default `info` filter.
pub fn setup_logger() {
    let mut builder = Builder::new();
    builder.filter(None, LevelFilter::Info);
    builder.parse_default_env();

    builder.format(|buf, record| match record.level() {
        log::Level::Info => writeln!(buf, "{}", record.args()),
        level => writeln!(buf, "{} - {}", level, record.args()),
    });

    builder.init();
}

use log::Level;
use std::io::Write;

pub fn init(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();

    builder
        .filter(None, verbosity_level(verbosity).to_level_filter())
        .format(|f, record| {
            let style = f.default_level_style(record.level()).bold();
            write!(f, "{style}{:>6}{style:#} ", record.level())?;
            writeln!(f, "{}", record.args())
        })
        .init();
}

/// Maps repeated `--verbose` flags to a log level.
fn verbosity_level(num: u8) -> Level {
    match num {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        3.. => Level::Trace,
    }
}

//! Kernel Logger
//!
//! Routes the `log` facade to a console sink (serial port, VGA text buffer,
//! or a capture buffer under test). Records are written one per line as
//! `[LEVEL] target: message`.

use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Once;

/// A byte sink for log output.
pub trait Console: Send + Sync {
    fn write_str(&self, s: &str);
}

struct ConsoleWriter<'a>(&'a dyn Console);

impl Write for ConsoleWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

struct KernelLogger {
    console: Once<&'static dyn Console>,
}

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(console) = self.console.get() {
            let _ = writeln!(
                ConsoleWriter(*console),
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: KernelLogger = KernelLogger {
    console: Once::new(),
};

/// Install the kernel logger with `console` as its sink.
///
/// Only the first call takes effect; later calls return the `log` crate's
/// error and leave the original sink in place.
pub fn init(console: &'static dyn Console, level: LevelFilter) -> Result<(), SetLoggerError> {
    LOGGER.console.call_once(|| console);
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

use std::fmt;

/// The sink for protocol lines and warnings. Implementations should forward lines to wherever
/// the analytics pipeline collects logs from.
pub trait Logger {
    /// Emit a single protocol line (`YATZ_EVENT|...` or `YATZ_DUMP|...`).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use std::fmt;
    /// # use yatz::Logger;
    /// struct StderrLogger;
    ///
    /// impl Logger for StderrLogger {
    ///     fn info(&self, line: &str) {
    ///         eprintln!("{line}");
    ///     }
    ///
    ///     fn warn(&self, args: fmt::Arguments<'_>) {
    ///         eprintln!("warning: {args}");
    ///     }
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// This method should not return errors and should not panic. The line is not retried.
    fn info(&self, line: &str);

    /// Report a non-fatal problem, such as rolling an unknown experiment.
    fn warn(&self, args: fmt::Arguments<'_>);
}

/// Forwards everything to the [`log`] crate under the `yatz` target.
pub struct LogLogger;

impl Logger for LogLogger {
    fn info(&self, line: &str) {
        log::info!(target: "yatz", "{}", line);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        log::warn!(target: "yatz", "{}", args);
    }
}

pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _line: &str) {}
    fn warn(&self, _args: fmt::Arguments<'_>) {}
}

impl<T: Logger + ?Sized> Logger for &T {
    fn info(&self, line: &str) {
        (**self).info(line)
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        (**self).warn(args)
    }
}

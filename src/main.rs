mod console;

use std::path::PathBuf;

use tracklist::config::TrackConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TrackConfig::load();

    // CLI flags
    let args: Vec<String> = std::env::args().collect();
    if let Some(dir) = args
        .iter()
        .position(|a| a == "--data-dir")
        .and_then(|i| args.get(i + 1))
    {
        config.data_directory = PathBuf::from(dir);
    }
    let debug = config.debug_logging || args.iter().any(|a| a == "--debug");

    // Set up logging to the systemd user journal (`journalctl --user -t tracklist -f`).
    // Wrapper filters: tracklist crate at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                if metadata.target().starts_with("tracklist") {
                    let max = if tracklist::debug_logging() {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        tracklist::set_debug_logging(debug);

        // Keep running without journal logging outside systemd sessions.
        if let Ok(journal) = systemd_journal_logger::JournalLog::new() {
            let journal = journal.with_syslog_identifier("tracklist".to_string());
            if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
                // Global max must be Debug so crate debug logs can pass through when toggled
                log::set_max_level(log::LevelFilter::Debug);
            }
        }
    }

    config.ensure_dirs()?;

    // Single-threaded, cooperative: input, the reminder timer and the
    // overdue check all multiplex on one event loop.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(console::run(config))?;

    Ok(())
}

/// Runs winshift in the foreground until the exit hotkey or Ctrl+C.
///
/// Exits with status 1 if the configured hotkeys are invalid or the
/// first registration fails.
pub fn execute() {
    #[cfg(windows)]
    if let Err(e) = platform::run() {
        winshift_core::log_error!("{e}");
        std::process::exit(1);
    }

    #[cfg(not(windows))]
    super::unsupported();
}

#[cfg(windows)]
mod platform {
    use std::sync::Arc;
    use std::time::Instant;

    use winshift_core::driver::{self, ArrangementLoop};
    use winshift_core::{AppContext, Arranger, Result, config, log};
    use winshift_windows::{Desktop, dpi, hotkey, monitor};

    pub(super) fn run() -> Result<()> {
        dpi::enable_dpi_awareness();

        let config = config::load();
        log::init(&config.log_config());
        winshift_core::log_info!("winshift v{} starting", env!("CARGO_PKG_VERSION"));

        match monitor::metrics() {
            Ok(m) => winshift_core::log_info!(
                "Primary {}x{}, virtual screen starts at x={}, {} monitor(s)",
                m.primary_width,
                m.primary_height,
                m.virtual_left,
                m.monitor_count
            ),
            Err(e) => winshift_core::log_warn!("Could not read monitor metrics: {e}"),
        }

        let ctx = AppContext::new(config);
        if let Err(e) = winshift_windows::ctrl_c::set_handler(Arc::clone(&ctx)) {
            winshift_core::log_warn!("Ctrl+C will not exit cleanly: {e}");
        }

        let arranger = Arc::new(Arranger::new(Desktop));
        let callbacks = driver::hotkey_callbacks(&ctx, &arranger);
        let (hotkeys, raw_keys) = hotkey::start()?;

        let mut event_loop = ArrangementLoop::new(
            Arc::clone(&ctx),
            hotkeys,
            raw_keys,
            callbacks,
            Box::new(config::try_load),
        )?;
        event_loop.startup(Instant::now())?;
        event_loop.run();

        winshift_core::log_info!("winshift stopped");
        Ok(())
    }
}

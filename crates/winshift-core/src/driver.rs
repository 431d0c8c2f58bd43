//! The cooperative polling loop.
//!
//! Each tick handles a pending reload, the periodic hotkey health check
//! and any raw keys queued since the last tick. Hotkey activations do
//! not pass through here; they reach the [`Arranger`] and the
//! [`AppContext`] directly from the platform's hotkey callbacks.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::arrange::{Arranger, PassOutcome};
use crate::config::Config;
use crate::context::AppContext;
use crate::hotkey::{HotkeyAction, HotkeyCallbacks, HotkeyLifecycleManager, KeyCombo};
use crate::platform::{
    HotkeyCallback, HotkeyRegistrar, MonitorQuery, RawKeySource, WindowEnumerator, WindowMover,
};
use crate::recovery::RecoveryHeuristic;
use crate::{Error, Result};

/// Sleep between two ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Reads a fresh config for the reload hotkey.
pub type ConfigLoader = Box<dyn Fn() -> Result<Config>>;

/// Builds the callbacks bound to the arrange, exit and reload hotkeys.
///
/// Arrange runs a pass on the calling thread using the config snapshot
/// current at that moment. Exit and reload only raise flags for the
/// loop.
pub fn hotkey_callbacks<D>(ctx: &Arc<AppContext>, arranger: &Arc<Arranger<D>>) -> HotkeyCallbacks
where
    D: WindowEnumerator + MonitorQuery + WindowMover + Send + Sync + 'static,
{
    let arrange = {
        let ctx = Arc::clone(ctx);
        let arranger = Arc::clone(arranger);
        Arc::new(move || run_pass(&arranger, &ctx.config())) as HotkeyCallback
    };
    let exit = {
        let ctx = Arc::clone(ctx);
        Arc::new(move || {
            crate::log_info!("Exit hotkey pressed");
            ctx.request_exit();
        }) as HotkeyCallback
    };
    let reload = {
        let ctx = Arc::clone(ctx);
        Arc::new(move || {
            crate::log_info!("Reload hotkey pressed");
            ctx.request_reload();
        }) as HotkeyCallback
    };

    HotkeyCallbacks {
        arrange,
        exit,
        reload,
    }
}

fn run_pass<D>(arranger: &Arranger<D>, config: &Config)
where
    D: WindowEnumerator + MonitorQuery + WindowMover,
{
    match arranger.arrange(config) {
        Ok(PassOutcome::Completed(_) | PassOutcome::AlreadyRunning) => {}
        Err(e) => crate::log_error!("Window arrangement failed: {e}"),
    }
}

/// Drives health checks, recovery and reloads until exit is requested.
pub struct ArrangementLoop<R, K> {
    ctx: Arc<AppContext>,
    hotkeys: HotkeyLifecycleManager<R>,
    recovery: RecoveryHeuristic,
    raw_keys: Option<K>,
    self_test: HotkeyCallback,
    loader: ConfigLoader,
    tick_interval: Duration,
}

impl<R: HotkeyRegistrar, K: RawKeySource> ArrangementLoop<R, K> {
    /// Builds the loop from the context's current config.
    ///
    /// Fails if a configured hotkey string cannot be parsed or names a
    /// key the registrar cannot bind.
    pub fn new(
        ctx: Arc<AppContext>,
        registrar: R,
        raw_keys: K,
        callbacks: HotkeyCallbacks,
        loader: ConfigLoader,
    ) -> Result<Self> {
        let config = ctx.config();
        let combos = config.hotkeys()?;
        check_combos(&registrar, &combos)?;
        let self_test = Arc::clone(&callbacks.arrange);
        let hotkeys = HotkeyLifecycleManager::new(
            registrar,
            combos,
            callbacks,
            config.health_interval(),
            config.restart_policy(),
        );

        Ok(Self {
            recovery: RecoveryHeuristic::new(config.recovery_timeout()),
            ctx,
            hotkeys,
            raw_keys: Some(raw_keys),
            self_test,
            loader,
            tick_interval: TICK_INTERVAL,
        })
    }

    pub fn set_tick_interval(&mut self, interval: Duration) {
        self.tick_interval = interval;
    }

    pub fn hotkeys(&self) -> &HotkeyLifecycleManager<R> {
        &self.hotkeys
    }

    pub fn hotkeys_mut(&mut self) -> &mut HotkeyLifecycleManager<R> {
        &mut self.hotkeys
    }

    #[cfg(test)]
    pub(crate) fn recovery(&self) -> &RecoveryHeuristic {
        &self.recovery
    }

    /// First registration. A failure here is fatal for the process.
    pub fn startup(&mut self, now: Instant) -> Result<()> {
        self.hotkeys
            .register_all()
            .map_err(|e| Error::StartupRegistration(Box::new(e)))?;
        self.hotkeys.mark_checked(now);

        let config = self.ctx.config();
        crate::log_info!(
            "Press {} to arrange windows, {} to exit, {} to reload",
            config.hotkey,
            config.exit_hotkey,
            config.reload_hotkey
        );
        Ok(())
    }

    /// Runs ticks until exit is requested, then releases the hotkeys.
    pub fn run(&mut self) {
        while !self.ctx.exit_requested() {
            self.tick(Instant::now());
            if self.ctx.exit_requested() {
                break;
            }
            thread::sleep(self.tick_interval);
        }
        self.shutdown();
    }

    /// One iteration of the loop. Never fails; problems are logged.
    pub fn tick(&mut self, now: Instant) {
        if self.ctx.take_reload_request() {
            self.reload();
        }

        if self.hotkeys.is_check_due(now) {
            self.hotkeys.health_check(now);
        }

        let recovery_enabled = self.ctx.config().enable_auto_recovery;
        self.drain_raw_keys(now, recovery_enabled);
    }

    /// Best-effort release of all hotkeys.
    pub fn shutdown(&mut self) {
        crate::log_info!("Shutting down, releasing hotkeys");
        self.hotkeys.unregister_all();
    }

    fn reload(&mut self) {
        crate::log_info!("Reloading configuration");
        let config = match (self.loader)() {
            Ok(config) => config,
            Err(e) => {
                crate::log_error!("Reload failed, keeping current config: {e}");
                return;
            }
        };
        let combos = match config
            .hotkeys()
            .and_then(|combos| check_combos(self.hotkeys.registrar(), &combos).map(|()| combos))
        {
            Ok(combos) => combos,
            Err(e) => {
                crate::log_error!("Reload failed, keeping current config: {e}");
                return;
            }
        };

        self.hotkeys.set_combos(combos);
        self.hotkeys.set_interval(config.health_interval());
        self.hotkeys.set_policy(config.restart_policy());
        self.recovery.set_timeout(config.recovery_timeout());
        self.ctx.replace_config(config);

        if let Err(e) = self.hotkeys.register_all() {
            crate::log_error!("Hotkeys not registered after reload, will retry: {e}");
        }
    }

    /// Feeds every queued raw key to the heuristic.
    ///
    /// Keys are drained even when recovery is disabled so they do not
    /// pile up. A disconnected source is dropped for good.
    fn drain_raw_keys(&mut self, now: Instant, recovery_enabled: bool) {
        let Some(source) = self.raw_keys.as_mut() else {
            return;
        };

        let mut disconnected = false;
        loop {
            match source.poll_raw_key() {
                Ok(Some(key)) if recovery_enabled => {
                    let self_test = &self.self_test;
                    self.recovery
                        .on_raw_key(key, now, &mut self.hotkeys, || self_test());
                }
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => {
                    crate::log_error!("Raw key source failed, recovery heuristic disabled: {e}");
                    disconnected = true;
                    break;
                }
            }
        }

        if disconnected {
            self.raw_keys = None;
        }
    }
}

/// Rejects combos whose key the registrar cannot bind, before any
/// registration state changes.
fn check_combos<R: HotkeyRegistrar>(
    registrar: &R,
    combos: &[(HotkeyAction, KeyCombo); 3],
) -> Result<()> {
    combos
        .iter()
        .try_for_each(|(_, combo)| registrar.validate(combo))
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;

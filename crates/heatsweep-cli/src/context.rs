use anyhow::Result;
use heatsweep_core::{SweepConfig, resolve_path};
use heatsweep_driver::{Interrupt, SweepDriver};
use heatsweep_observe::Observer;
use std::path::PathBuf;

use crate::GlobalArgs;

/// Everything a command needs: the workspace, its merged configuration and
/// the run log.
pub(crate) struct SweepSession {
    pub workspace: PathBuf,
    pub config: SweepConfig,
    pub observer: Observer,
    interrupt: Interrupt,
}

impl SweepSession {
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let workspace = match &global.workspace {
            Some(dir) => resolve_path(&cwd, dir),
            None => cwd,
        };
        let config = SweepConfig::load(&workspace, global.config.as_deref())?;
        let mut observer = Observer::new(&workspace)?;
        observer.set_verbose(global.verbose);
        observer.set_quiet(global.json);
        observer.verbose_log(&format!(
            "workspace {} (run {})",
            workspace.display(),
            observer.run_id()
        ));
        Ok(Self {
            workspace,
            config,
            observer,
            interrupt: install_interrupt_handler()?,
        })
    }

    pub fn driver(&self) -> SweepDriver<'_> {
        SweepDriver::new(&self.workspace, &self.config, &self.observer)
            .with_interrupt(self.interrupt.clone())
    }
}

/// Routes SIGINT into a flag the driver polls, so an interrupted sweep stops
/// between runs instead of dying mid-write.
fn install_interrupt_handler() -> Result<Interrupt> {
    let interrupt = Interrupt::new();
    #[cfg(unix)]
    {
        signal_hook::flag::register(signal_hook::consts::SIGINT, interrupt.flag())?;
    }
    Ok(interrupt)
}

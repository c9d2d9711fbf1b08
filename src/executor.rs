use crate::command::Command;
use crate::error::Result;
use crate::framework::TaskRunner;

use tracing::{error, info};

/// Outcome of a completed queue run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub commands: usize,
    pub dry_run: bool,
}

/// Walks a command queue once, in order.
///
/// In dry-run mode each command is only reported. Otherwise the first failing
/// command stops the run; nothing already done is undone.
pub struct Executor<'a> {
    runner: &'a dyn TaskRunner,
    dry_run: bool,
}

impl<'a> Executor<'a> {
    pub fn new(runner: &'a dyn TaskRunner) -> Self {
        Self {
            runner,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn run(&self, queue: &[Command]) -> Result<Summary> {
        let total = queue.len();
        for (i, cmd) in queue.iter().enumerate() {
            let step = i + 1;
            if self.dry_run {
                info!(step, total, kind = cmd.kind(), "dry-run: {}", cmd);
                println!("{}", cmd);
                continue;
            }
            info!(step, total, kind = cmd.kind(), "{}", cmd);
            if let Err(e) = cmd.execute(self.runner) {
                error!(step, total, kind = cmd.kind(), "command failed: {}", e);
                return Err(e);
            }
        }
        Ok(Summary {
            commands: total,
            dry_run: self.dry_run,
        })
    }
}

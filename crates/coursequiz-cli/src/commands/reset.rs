//! The `coursequiz reset` command.

use anyhow::Result;

use super::DataPaths;

/// Which parts of the user data to clear.
#[derive(Debug, Clone, Copy)]
pub struct Scope {
    pub tests: bool,
    pub notes: bool,
    pub watched: bool,
    pub all: bool,
}

pub fn execute(paths: &DataPaths, scope: Scope, yes: bool) -> Result<()> {
    if !(scope.tests || scope.notes || scope.watched || scope.all) {
        anyhow::bail!("nothing to reset: pass --tests, --notes, --watched or --all");
    }
    if !yes {
        anyhow::bail!("refusing to reset without --yes");
    }

    let config = paths.load_config()?;
    let mut store = paths.open_store(&config);

    if scope.all {
        store.reset_all_data()?;
        println!("Cleared all user data (theme kept).");
        return Ok(());
    }
    if scope.tests {
        store.clear_all_tests()?;
        println!("Cleared exam histories.");
    }
    if scope.notes {
        store.clear_all_notes()?;
        println!("Cleared notes.");
    }
    if scope.watched {
        store.clear_all_history()?;
        println!("Cleared watched media.");
    }
    tracing::info!(path = %store.path().display(), "user data reset");
    Ok(())
}

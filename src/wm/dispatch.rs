//! Command Dispatch
//!
//! Translates a parsed command into resolver and mutator calls. Errors stay
//! typed here; the transport collapses them to a status code.

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::command::Command;
use crate::error::CommandError;
use crate::wm::directory::Directory;
use crate::wm::{mutate, resolver};

/// Execute one command against the directory.
pub fn dispatch(
    dir: &dyn Directory,
    home_dir: &str,
    command: &Command,
) -> Result<(), CommandError> {
    match command {
        Command::SetPosition { pid, x, y, width, height, frontmost_only } => {
            debug!("Handling setPosition for pid {}", pid);
            let windows = resolver::resolve(dir, home_dir, *pid, None, *frontmost_only)?;

            // Every resolved window gets the change, without short-
            // circuiting: earlier successes stay applied even when a later
            // window fails, and the overall outcome is the AND of all of
            // them. Not atomic.
            let total = windows.len();
            let mut failed = 0usize;
            for window in windows {
                if let Err(e) = mutate::set_geometry(dir, window, *x, *y, *width, *height) {
                    warn!("Geometry change failed for window {}: {:#}", window, e);
                    failed += 1;
                }
            }
            if failed > 0 {
                return Err(CommandError::MutationFailed(anyhow!(
                    "geometry change failed for {failed} of {total} windows"
                )));
            }
            Ok(())
        }

        Command::Focus { pid, title } => {
            debug!("Handling focus for pid {} title {:?}", pid, title);
            let windows = resolver::resolve(dir, home_dir, *pid, Some(title.as_str()), false)?;

            // Only the first resolved window receives focus.
            let Some(&first) = windows.first() else {
                return Err(CommandError::NotFound);
            };
            mutate::focus(dir, first).map_err(CommandError::MutationFailed)
        }
    }
}

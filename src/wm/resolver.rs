//! Window Resolution
//!
//! Maps a (pid, optional title, frontmost-only) query to the set of live
//! window handles it denotes, using the directory's client list, the pid
//! property with a process-table fallback keyed on the application class,
//! and the global stacking order for disambiguation.

use std::collections::HashSet;

use tracing::debug;

use crate::error::CommandError;
use crate::wm::directory::Directory;
use crate::wm::title;
use crate::wm::WindowId;

/// Find the window(s) belonging to `pid`, optionally narrowed by title and
/// reduced to the frontmost window.
///
/// Fails with [`CommandError::NotFound`] when no window survives a stage.
pub fn resolve(
    dir: &dyn Directory,
    home_dir: &str,
    pid: u32,
    title_query: Option<&str>,
    frontmost_only: bool,
) -> Result<Vec<WindowId>, CommandError> {
    debug!("Looking for windows with pid {}", pid);

    let mut seen: HashSet<WindowId> = HashSet::new();
    let mut matched: Vec<WindowId> = Vec::new();

    for window in dir.client_windows()? {
        if !seen.insert(window) {
            continue;
        }
        // Withdrawn and iconified windows never participate, even when
        // their pid matches.
        if !matches!(dir.is_viewable(window), Ok(true)) {
            continue;
        }
        if resolve_pid(dir, window) == Some(pid) {
            matched.push(window);
        }
    }

    debug!("Found {} unique windows for pid {}", matched.len(), pid);
    if matched.is_empty() {
        return Err(CommandError::NotFound);
    }

    if let Some(query) = title_query {
        let candidates = title::normalize(query, home_dir);
        debug!("Matching against title variants: {:?}", candidates);
        matched.retain(|&window| {
            let window_title = dir
                .window_title(window)
                .map(|t| title::strip_suffix(&t).to_string())
                .unwrap_or_default();
            candidates.contains(&window_title)
        });
        if matched.is_empty() {
            debug!("No windows match title: {}", query);
            return Err(CommandError::NotFound);
        }
    }

    if frontmost_only {
        return match frontmost_of(dir, &matched)? {
            Some(window) => Ok(vec![window]),
            None => Err(CommandError::NotFound),
        };
    }

    Ok(matched)
}

/// Owning pid of a window: the pid property when present, otherwise a
/// best-effort process-table lookup by application class name.
fn resolve_pid(dir: &dyn Directory, window: WindowId) -> Option<u32> {
    if let Ok(Some(pid)) = dir.window_pid(window) {
        return Some(pid);
    }
    let class = dir.window_class(window).ok().flatten()?;
    dir.pid_by_executable(&class)
}

/// Among `windows`, the one nearest the top of the global stacking order.
fn frontmost_of(
    dir: &dyn Directory,
    windows: &[WindowId],
) -> Result<Option<WindowId>, CommandError> {
    let stacking = dir.stacking_order()?;
    Ok(stacking.iter().rev().find(|w| windows.contains(w)).copied())
}

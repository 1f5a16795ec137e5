//! Geometry and Focus Mutation
//!
//! Geometry changes are read-then-patch: omitted fields keep their current
//! value, so a move without resize is safe and idempotent. Window managers
//! ignore configure requests on maximized windows, so the mutator first
//! asks the window manager to drop both maximize flags and waits on a sync
//! barrier before configuring. The sequence is not transactional: a failure
//! after the unmaximize leaves the window unmaximized at its prior size.

use anyhow::Result;
use tracing::debug;

use crate::wm::directory::Directory;
use crate::wm::{Geometry, WindowId};

/// Apply a (possibly partial) geometry change to one window.
pub fn set_geometry(
    dir: &dyn Directory,
    window: WindowId,
    x: Option<i32>,
    y: Option<i32>,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<()> {
    let current = dir.geometry(window)?;
    let target = Geometry {
        x: x.unwrap_or(current.x),
        y: y.unwrap_or(current.y),
        width: width.unwrap_or(current.width),
        height: height.unwrap_or(current.height),
    };
    debug!(
        "Setting window {} geometry: x={}, y={}, width={}, height={}",
        window, target.x, target.y, target.width, target.height
    );

    let state = dir.maximize_state(window)?;
    if state.any() {
        debug!("Window {} is maximized, unmaximizing first", window);
        dir.unmaximize(window)?;
        dir.sync()?;
    }

    dir.configure(window, &target)?;
    dir.sync()?;
    Ok(())
}

/// Assign input focus to a window and raise it to the top of the stack.
pub fn focus(dir: &dyn Directory, window: WindowId) -> Result<()> {
    debug!("Focusing window {}", window);
    dir.set_input_focus(window)?;
    dir.raise(window)?;
    dir.sync()?;
    Ok(())
}

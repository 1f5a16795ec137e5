//! EWMH (Extended Window Manager Hints) atoms
//!
//! Interns the subset of EWMH/ICCCM atoms the directory needs for window
//! enumeration, pid and title lookup, and maximize-state control.

use anyhow::Result;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, ConnectionExt as _};

/// `_NET_WM_STATE` client message action: remove the listed properties.
pub const NET_WM_STATE_REMOVE: u32 = 0;

/// Source indication for client messages sent by a normal application.
pub const SOURCE_NORMAL_APPLICATION: u32 = 1;

/// Holds all interned atoms
#[derive(Debug)]
pub struct Atoms {
    pub net_client_list: Atom,
    pub net_client_list_stacking: Atom,
    pub net_wm_pid: Atom,
    pub net_wm_name: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_maximized_vert: Atom,
    pub net_wm_state_maximized_horz: Atom,
    pub utf8_string: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        // Helper to intern a single atom
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            net_client_list: intern("_NET_CLIENT_LIST")?,
            net_client_list_stacking: intern("_NET_CLIENT_LIST_STACKING")?,
            net_wm_pid: intern("_NET_WM_PID")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            net_wm_state: intern("_NET_WM_STATE")?,
            net_wm_state_maximized_vert: intern("_NET_WM_STATE_MAXIMIZED_VERT")?,
            net_wm_state_maximized_horz: intern("_NET_WM_STATE_MAXIMIZED_HORZ")?,
            utf8_string: intern("UTF8_STRING")?,
        })
    }
}

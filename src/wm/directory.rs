//! Window Directory
//!
//! The seam between the resolution/mutation engine and the windowing
//! system. [`X11Directory`] is the real implementation over a
//! `RustConnection`; tests inject a recording stub instead.

use std::ffi::OsStr;
use std::sync::Mutex;

use anyhow::{Context, Result};
use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::wm::ewmh::{self, Atoms};
use crate::wm::{Geometry, MaximizeState, WindowId};

/// Abstract window directory service.
///
/// Mirrors the X11/EWMH primitives the engine consumes: enumeration,
/// per-window property lookup, geometry get/configure, maximize-state
/// client messages, focus and stacking control, and a sync barrier. A
/// process-table lookup rides along as the secondary pid source.
pub trait Directory: Send {
    /// Enumerate candidate top-level windows in directory order.
    fn client_windows(&self) -> Result<Vec<WindowId>>;

    /// Global stacking order, bottom to top.
    fn stacking_order(&self) -> Result<Vec<WindowId>>;

    /// Whether the window is currently mapped and viewable.
    fn is_viewable(&self, window: WindowId) -> Result<bool>;

    /// Owning process id from the window's pid property, if present.
    fn window_pid(&self, window: WindowId) -> Result<Option<u32>>;

    /// Application class (instance name) of the window, if present.
    fn window_class(&self, window: WindowId) -> Result<Option<String>>;

    /// Raw window title. Empty string when no title source is readable;
    /// callers treat that as "no match", not as an error.
    fn window_title(&self, window: WindowId) -> Result<String>;

    /// First pid in the process table whose executable matches `name`.
    /// Best-effort secondary source; multiple instances sharing an
    /// executable name can mismatch.
    fn pid_by_executable(&self, name: &str) -> Option<u32>;

    /// Current window geometry.
    fn geometry(&self, window: WindowId) -> Result<Geometry>;

    /// Apply a full geometry to the window.
    fn configure(&self, window: WindowId, geometry: &Geometry) -> Result<()>;

    /// Maximization flags from the window manager state property.
    fn maximize_state(&self, window: WindowId) -> Result<MaximizeState>;

    /// Ask the window manager to drop both maximize flags. The payload is
    /// fixed regardless of which flag was observed set.
    fn unmaximize(&self, window: WindowId) -> Result<()>;

    /// Assign input focus to the window (revert-to-parent policy).
    fn set_input_focus(&self, window: WindowId) -> Result<()>;

    /// Raise the window to the top of the stacking order.
    fn raise(&self, window: WindowId) -> Result<()>;

    /// Barrier: block until all previously issued requests are applied.
    fn sync(&self) -> Result<()>;
}

/// Window directory backed by a live X11 connection.
pub struct X11Directory {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
    procs: Mutex<System>,
}

impl X11Directory {
    /// Connect to the X server and intern the atoms we need.
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
        let root = conn.setup().roots[screen_num].root;
        let atoms = Atoms::new(&conn).context("Failed to intern atoms")?;
        debug!("Connected to X server, screen {}, root window {}", screen_num, root);

        Ok(Self {
            conn,
            root,
            atoms,
            procs: Mutex::new(System::new()),
        })
    }

    /// Read a WINDOW[] property off the root window.
    fn root_window_list(&self, property: Atom) -> Result<Vec<WindowId>> {
        let reply = self
            .conn
            .get_property(false, self.root, property, AtomEnum::WINDOW, 0, 1024)?
            .reply()?;
        Ok(reply.value32().map(|v| v.collect()).unwrap_or_default())
    }
}

impl Directory for X11Directory {
    fn client_windows(&self) -> Result<Vec<WindowId>> {
        // _NET_CLIENT_LIST first, _NET_CLIENT_LIST_STACKING as fallback for
        // window managers that only maintain the latter.
        let windows = self.root_window_list(self.atoms.net_client_list)?;
        if !windows.is_empty() {
            return Ok(windows);
        }
        self.root_window_list(self.atoms.net_client_list_stacking)
    }

    fn stacking_order(&self) -> Result<Vec<WindowId>> {
        self.root_window_list(self.atoms.net_client_list_stacking)
    }

    fn is_viewable(&self, window: WindowId) -> Result<bool> {
        let attrs = self.conn.get_window_attributes(window)?.reply()?;
        Ok(attrs.map_state == MapState::VIEWABLE)
    }

    fn window_pid(&self, window: WindowId) -> Result<Option<u32>> {
        let reply = self
            .conn
            .get_property(false, window, self.atoms.net_wm_pid, AtomEnum::CARDINAL, 0, 1)?
            .reply()?;
        Ok(reply.value32().and_then(|mut v| v.next()))
    }

    fn window_class(&self, window: WindowId) -> Result<Option<String>> {
        let reply = self
            .conn
            .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 1024)?
            .reply()?;
        if reply.value.is_empty() {
            return Ok(None);
        }
        // WM_CLASS is two NUL-terminated strings; the first is the instance
        // name, which is what process executables are matched against.
        let instance = reply
            .value
            .split(|&b| b == 0)
            .next()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .filter(|s| !s.is_empty());
        Ok(instance)
    }

    fn window_title(&self, window: WindowId) -> Result<String> {
        // _NET_WM_NAME (UTF-8) first
        if let Ok(reply) = self
            .conn
            .get_property(false, window, self.atoms.net_wm_name, self.atoms.utf8_string, 0, 1024)?
            .reply()
        {
            if !reply.value.is_empty() {
                return Ok(String::from_utf8_lossy(&reply.value).into_owned());
            }
        }

        // Legacy WM_NAME as STRING
        if let Ok(reply) = self
            .conn
            .get_property(false, window, AtomEnum::WM_NAME, AtomEnum::STRING, 0, 1024)?
            .reply()
        {
            if !reply.value.is_empty() {
                return Ok(String::from_utf8_lossy(&reply.value).into_owned());
            }
        }

        // Last resort: WM_NAME of whatever type the client set
        if let Ok(reply) = self
            .conn
            .get_property(false, window, AtomEnum::WM_NAME, AtomEnum::ANY, 0, 1024)?
            .reply()
        {
            if !reply.value.is_empty() {
                return Ok(String::from_utf8_lossy(&reply.value).into_owned());
            }
        }

        Ok(String::new())
    }

    fn pid_by_executable(&self, name: &str) -> Option<u32> {
        let mut system = self.procs.lock().ok()?;
        system.refresh_processes(ProcessesToUpdate::All, true);
        system
            .processes()
            .iter()
            .filter(|(_, process)| process.name() == OsStr::new(name))
            .map(|(pid, _)| pid.as_u32())
            .min()
    }

    fn geometry(&self, window: WindowId) -> Result<Geometry> {
        let geom = self.conn.get_geometry(window)?.reply()?;
        Ok(Geometry {
            x: i32::from(geom.x),
            y: i32::from(geom.y),
            width: u32::from(geom.width),
            height: u32::from(geom.height),
        })
    }

    fn configure(&self, window: WindowId, geometry: &Geometry) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(geometry.x)
                .y(geometry.y)
                .width(geometry.width)
                .height(geometry.height),
        )?;
        Ok(())
    }

    fn maximize_state(&self, window: WindowId) -> Result<MaximizeState> {
        let reply = self
            .conn
            .get_property(false, window, self.atoms.net_wm_state, AtomEnum::ATOM, 0, 1024)?
            .reply()?;
        let states: Vec<u32> = reply.value32().map(|v| v.collect()).unwrap_or_default();
        Ok(MaximizeState {
            vert: states.contains(&self.atoms.net_wm_state_maximized_vert),
            horz: states.contains(&self.atoms.net_wm_state_maximized_horz),
        })
    }

    fn unmaximize(&self, window: WindowId) -> Result<()> {
        let event = ClientMessageEvent::new(
            32,
            window,
            self.atoms.net_wm_state,
            [
                ewmh::NET_WM_STATE_REMOVE,
                self.atoms.net_wm_state_maximized_vert,
                self.atoms.net_wm_state_maximized_horz,
                ewmh::SOURCE_NORMAL_APPLICATION,
                0,
            ],
        );

        // State changes go to the root window so the window manager sees
        // and applies them.
        self.conn.send_event(
            false,
            self.root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )?;
        Ok(())
    }

    fn set_input_focus(&self, window: WindowId) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::PARENT, window, x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn raise(&self, window: WindowId) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        // A GetInputFocus round-trip forces the server to process
        // everything issued before it.
        self.conn.get_input_focus()?.reply()?;
        Ok(())
    }
}

//! Recording window directory stub for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::wm::directory::Directory;
use crate::wm::{Geometry, MaximizeState, WindowId};

/// One fake window in the stub directory.
#[derive(Debug, Clone)]
pub(crate) struct StubWindow {
    pub id: WindowId,
    pub pid: Option<u32>,
    pub class: Option<&'static str>,
    pub title: &'static str,
    pub viewable: bool,
    pub geometry: Geometry,
    pub maximized: MaximizeState,
}

impl StubWindow {
    pub fn new(id: WindowId, pid: u32, title: &'static str) -> Self {
        Self {
            id,
            pid: Some(pid),
            class: None,
            title,
            viewable: true,
            geometry: Geometry { x: 10, y: 20, width: 300, height: 200 },
            maximized: MaximizeState::default(),
        }
    }
}

/// Directory calls with side effects, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Unmaximize(WindowId),
    Configure(WindowId, Geometry),
    SetInputFocus(WindowId),
    Raise(WindowId),
    Sync,
}

/// In-memory directory that records every mutation.
#[derive(Default)]
pub(crate) struct StubDirectory {
    pub windows: Vec<StubWindow>,
    /// Global stacking order, bottom to top.
    pub stacking: Vec<WindowId>,
    /// When set, every window appears twice in the client list.
    pub duplicate_client_entries: bool,
    /// Windows whose configure calls fail.
    pub fail_configure: Vec<WindowId>,
    /// (executable name, pid) pairs for the fallback lookup.
    pub process_table: Vec<(&'static str, u32)>,
    /// When set, every client list read blocks for this long first.
    pub stall: Option<Duration>,
    calls: Mutex<Vec<Call>>,
    enumerations: AtomicUsize,
}

impl StubDirectory {
    pub fn with_windows(windows: Vec<StubWindow>) -> Self {
        let stacking = windows.iter().map(|w| w.id).collect();
        Self { windows, stacking, ..Self::default() }
    }

    fn window(&self, id: WindowId) -> Result<&StubWindow> {
        self.windows
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| anyhow!("bad window {id}"))
    }

    fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(call);
    }

    /// All recorded mutation calls in issue order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// How many times the client list was enumerated.
    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    /// The last geometry successfully configured on `id`, if any.
    pub fn applied_geometry(&self, id: WindowId) -> Option<Geometry> {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|call| match call {
                Call::Configure(window, geometry) if window == id => Some(geometry),
                _ => None,
            })
    }
}

impl Directory for StubDirectory {
    fn client_windows(&self) -> Result<Vec<WindowId>> {
        if let Some(stall) = self.stall {
            std::thread::sleep(stall);
        }
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        let ids: Vec<WindowId> = self.windows.iter().map(|w| w.id).collect();
        if self.duplicate_client_entries {
            Ok(ids.iter().chain(ids.iter()).copied().collect())
        } else {
            Ok(ids)
        }
    }

    fn stacking_order(&self) -> Result<Vec<WindowId>> {
        Ok(self.stacking.clone())
    }

    fn is_viewable(&self, window: WindowId) -> Result<bool> {
        Ok(self.window(window)?.viewable)
    }

    fn window_pid(&self, window: WindowId) -> Result<Option<u32>> {
        Ok(self.window(window)?.pid)
    }

    fn window_class(&self, window: WindowId) -> Result<Option<String>> {
        Ok(self.window(window)?.class.map(str::to_string))
    }

    fn window_title(&self, window: WindowId) -> Result<String> {
        Ok(self.window(window)?.title.to_string())
    }

    fn pid_by_executable(&self, name: &str) -> Option<u32> {
        self.process_table
            .iter()
            .find(|(exe, _)| *exe == name)
            .map(|&(_, pid)| pid)
    }

    fn geometry(&self, window: WindowId) -> Result<Geometry> {
        Ok(self.window(window)?.geometry)
    }

    fn configure(&self, window: WindowId, geometry: &Geometry) -> Result<()> {
        if self.fail_configure.contains(&window) {
            return Err(anyhow!("configure rejected for window {window}"));
        }
        self.window(window)?;
        self.record(Call::Configure(window, *geometry));
        Ok(())
    }

    fn maximize_state(&self, window: WindowId) -> Result<MaximizeState> {
        Ok(self.window(window)?.maximized)
    }

    fn unmaximize(&self, window: WindowId) -> Result<()> {
        self.window(window)?;
        self.record(Call::Unmaximize(window));
        Ok(())
    }

    fn set_input_focus(&self, window: WindowId) -> Result<()> {
        self.window(window)?;
        self.record(Call::SetInputFocus(window));
        Ok(())
    }

    fn raise(&self, window: WindowId) -> Result<()> {
        self.window(window)?;
        self.record(Call::Raise(window));
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.record(Call::Sync);
        Ok(())
    }
}

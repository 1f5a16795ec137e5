//! Window Resolution and Mutation Engine
//!
//! Finds the on-screen windows owned by a process and applies geometry or
//! focus changes to them through the window directory. Nothing in here
//! outlives a single command: handles are re-resolved from the live client
//! list on every request.

pub mod directory;
pub mod dispatch;
pub mod ewmh;
pub mod mutate;
pub mod resolver;
pub mod title;

#[cfg(test)]
pub(crate) mod stub;

/// X11 window identifier, borrowed from the directory for one command.
pub type WindowId = u32;

/// Window geometry in root coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Maximization flags read from the window manager state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaximizeState {
    pub vert: bool,
    pub horz: bool,
}

impl MaximizeState {
    /// True if either flag is set.
    pub fn any(self) -> bool {
        self.vert || self.horz
    }
}

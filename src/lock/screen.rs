//! Screen Module
//!
//! Monitor discovery (RandR) and selection of the monitor the unlock
//! indicator is centered on.

use anyhow::Result;
use tracing::debug;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::xproto::Window;
use x11rb::rust_connection::RustConnection;

/// One physical output's placement within the root window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitor {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Absolute root-window coordinates the indicator is centered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub center_x: i32,
    pub center_y: i32,
}

/// Query the active RandR monitors for the root window.
///
/// An empty list is a valid result; the caller then falls back to centering
/// on the root window as a whole.
pub fn discover_monitors(conn: &RustConnection, root: Window) -> Result<Vec<Monitor>> {
    let reply = conn.randr_get_monitors(root, true)?.reply()?;
    let monitors: Vec<Monitor> = reply
        .monitors
        .iter()
        .map(|m| Monitor {
            x: m.x as i32,
            y: m.y as i32,
            width: m.width as u32,
            height: m.height as u32,
        })
        .collect();
    debug!("found {} monitor(s)", monitors.len());
    Ok(monitors)
}

/// Pick the monitor to center the indicator on.
///
/// Out-of-range and negative indices are not errors: both fall back to
/// monitor 0 with a diagnostic. With no monitor information at all, the
/// midpoint of the root window is the best we can do.
pub fn resolve_placement(
    monitors: &[Monitor],
    requested: i32,
    root_resolution: (u32, u32),
) -> Placement {
    if monitors.is_empty() {
        return Placement {
            center_x: (root_resolution.0 / 2) as i32,
            center_y: (root_resolution.1 / 2) as i32,
        };
    }

    let mut selected = 0usize;
    if requested >= 0 && (requested as usize) < monitors.len() {
        selected = requested as usize;
    } else if requested >= 0 {
        debug!(
            "monitor index {} out of bounds, found {} monitors, drawing on 0",
            requested,
            monitors.len()
        );
    } else {
        debug!("no monitor index given, drawing on 0");
    }

    let monitor = &monitors[selected];
    Placement {
        center_x: monitor.x + (monitor.width / 2) as i32,
        center_y: monitor.y + (monitor.height / 2) as i32,
    }
}

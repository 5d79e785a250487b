//! Lock Module
//!
//! Owns everything one lock session needs to draw: connection handles, the
//! parsed background configuration, monitor layout, session state, and the
//! cached background pixmap. The event loop mutates state through this
//! context and asks it to commit frames; no state hides in globals.

pub mod dpi;
pub mod keyboard;
pub mod pixmap;
pub mod screen;
pub mod state;
pub mod window;

use anyhow::{Context, Result};
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConfigureWindowAux, ConnectionExt as _, Pixmap};
use x11rb::rust_connection::RustConnection;

use crate::config::{parse_hex_color, Config, Rgb};
use crate::render::canvas::Canvas;
use crate::render::indicator::{render_frame, FrameParams};
use pixmap::BufferSlot;
use screen::Monitor;
use state::{StateTracker, UnlockState};
use window::LockWindow;

/// All mutable state for one lock session, owned by the event loop
pub struct LockContext {
    conn: Arc<RustConnection>,
    window: LockWindow,

    /// Parsed background fill color
    color: Rgb,
    /// Optional decoded background image
    background: Option<RgbaImage>,
    tile: bool,
    indicator_enabled: bool,
    /// Requested monitor index; negative = no preference
    show_on_screen: i32,
    /// DPI scaling factor applied to glyph geometry
    scale: f64,

    monitors: Vec<Monitor>,
    /// Current root window resolution; frames and the cached pixmap are
    /// sized to this
    resolution: (u32, u32),

    pub tracker: StateTracker,
    bg_pixmap: BufferSlot<Pixmap>,
}

impl LockContext {
    pub fn new(
        conn: Arc<RustConnection>,
        window: LockWindow,
        config: &Config,
        background: Option<RgbaImage>,
        monitors: Vec<Monitor>,
        resolution: (u32, u32),
        scale: f64,
    ) -> Self {
        Self {
            color: parse_hex_color(&config.background.color),
            tile: config.background.tile,
            indicator_enabled: config.indicator.enabled,
            show_on_screen: config.indicator.show_on_screen,
            conn,
            window,
            background,
            monitors,
            resolution,
            scale,
            tracker: StateTracker::new(),
            bg_pixmap: BufferSlot::empty(),
        }
    }

    pub fn grab_keyboard(&self) -> Result<()> {
        self.window.grab_keyboard(&self.conn)
    }

    /// Render and present one frame at the current resolution.
    ///
    /// The background pixmap is allocated on first need and reused for
    /// every following frame; a resolution change must invalidate it
    /// through [`LockContext::handle_resolution_change`] first.
    pub fn commit(&mut self) -> Result<()> {
        let (width, height) = self.resolution;
        debug!(
            "redrawing (unlock_state = {:?}, auth_state = {:?})",
            self.tracker.unlock, self.tracker.auth
        );

        let conn = &self.conn;
        let window = &self.window;
        let pixmap = *self.bg_pixmap.ensure(|| -> Result<Pixmap> {
            debug!("allocating background pixmap for {}x{} px", width, height);
            let id = conn.generate_id()?;
            conn.create_pixmap(window.depth, id, window.win, width as u16, height as u16)?
                .check()
                .context("Background pixmap allocation failed")?;
            Ok(id)
        })?;

        // Compose the whole frame in memory, then present it in one pass
        let mut canvas = Canvas::new(width, height);
        let placement =
            screen::resolve_placement(&self.monitors, self.show_on_screen, self.resolution);
        let params = FrameParams {
            color: self.color,
            image: self.background.as_ref(),
            tile: self.tile,
            indicator_enabled: self.indicator_enabled,
            scale: self.scale,
            placement,
            state: self.tracker.snapshot(),
        };
        render_frame(&mut canvas, &params);

        self.window.present(&self.conn, pixmap, &canvas)
    }

    /// Hide the indicator when the password buffer is empty, show it
    /// otherwise, and repaint.
    pub fn clear_indicator(&mut self) -> Result<()> {
        if self.tracker.input_len() == 0 {
            self.tracker.unlock = UnlockState::Started;
        } else {
            self.tracker.unlock = UnlockState::KeyPressed;
        }
        self.commit()
    }

    /// Release the cached background pixmap so the next commit allocates
    /// one at the current resolution. Safe to call when nothing is cached.
    pub fn invalidate_bg(&mut self) {
        let conn = &self.conn;
        self.bg_pixmap.invalidate(|pixmap| {
            debug!("releasing background pixmap 0x{:x}", pixmap);
            if let Err(e) = conn.free_pixmap(pixmap) {
                warn!("failed to free background pixmap: {}", e);
            }
        });
    }

    /// React to a root-window resolution change: drop the stale pixmap,
    /// resize the lock window, re-discover monitors, and repaint.
    pub fn handle_resolution_change(&mut self, width: u32, height: u32) -> Result<()> {
        info!("root resolution changed to {}x{}", width, height);
        self.invalidate_bg();
        self.resolution = (width, height);

        self.conn.configure_window(
            self.window.win,
            &ConfigureWindowAux::new().x(0).y(0).width(width).height(height),
        )?;

        self.monitors = screen::discover_monitors(&self.conn, self.window.root).unwrap_or_else(|e| {
            warn!("monitor discovery failed: {}; centering on the root window", e);
            Vec::new()
        });

        self.commit()
    }
}

impl Drop for LockContext {
    fn drop(&mut self) {
        self.invalidate_bg();
        let _ = self.conn.flush();
    }
}

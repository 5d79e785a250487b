//! Lock Window Module
//!
//! Creates the fullscreen override-redirect window that covers the desktop,
//! grabs the keyboard, and pushes composed frames onto the cached background
//! pixmap and out to the display.

use anyhow::{bail, Context, Result};
use std::time::Duration;
use tracing::debug;
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::xproto::{
    ChangeWindowAttributesAux, ConnectionExt as _, CreateGCAux, CreateWindowAux, Cursor, EventMask,
    Gcontext, GrabMode, GrabStatus, ImageFormat, Pixmap, Screen, Window, WindowClass,
};
use x11rb::rust_connection::RustConnection;

use crate::render::canvas::Canvas;

const GRAB_ATTEMPTS: u32 = 10;
const GRAB_RETRY_DELAY: Duration = Duration::from_millis(50);

/// The visible lock window and the drawing handles tied to it
#[derive(Debug)]
pub struct LockWindow {
    pub win: Window,
    pub gc: Gcontext,
    pub depth: u8,
    pub root: Window,
}

impl LockWindow {
    /// Create and map a fullscreen override-redirect window on the root,
    /// with the pointer hidden.
    pub fn create(conn: &RustConnection, screen: &Screen) -> Result<Self> {
        let win = conn.generate_id()?;
        let cursor = invisible_cursor(conn, screen.root)?;

        conn.create_window(
            screen.root_depth,
            win,
            screen.root,
            0,
            0,
            screen.width_in_pixels,
            screen.height_in_pixels,
            0,
            WindowClass::INPUT_OUTPUT,
            screen.root_visual,
            &CreateWindowAux::new()
                .background_pixel(screen.black_pixel)
                .override_redirect(1)
                .event_mask(
                    EventMask::KEY_PRESS | EventMask::EXPOSURE | EventMask::STRUCTURE_NOTIFY,
                )
                .cursor(cursor),
        )?
        .check()
        .context("Failed to create lock window")?;

        conn.map_window(win)?;

        let gc = conn.generate_id()?;
        conn.create_gc(gc, win, &CreateGCAux::new().graphics_exposures(0))?;
        conn.flush()?;

        debug!("created lock window 0x{:x}", win);
        Ok(Self {
            win,
            gc,
            depth: screen.root_depth,
            root: screen.root,
        })
    }

    /// Grab the keyboard so no other client sees the password. Another
    /// client may hold the grab briefly (screensavers, menus), so retry a
    /// few times before giving up.
    pub fn grab_keyboard(&self, conn: &RustConnection) -> Result<()> {
        for attempt in 1..=GRAB_ATTEMPTS {
            let reply = conn
                .grab_keyboard(
                    false,
                    self.win,
                    x11rb::CURRENT_TIME,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                )?
                .reply()?;
            if reply.status == GrabStatus::SUCCESS {
                debug!("keyboard grabbed on attempt {}", attempt);
                return Ok(());
            }
            debug!("keyboard grab attempt {} failed, retrying", attempt);
            std::thread::sleep(GRAB_RETRY_DELAY);
        }
        bail!("could not grab the keyboard after {} attempts", GRAB_ATTEMPTS);
    }

    /// Present a composed frame: upload the canvas onto the background
    /// pixmap, install the pixmap as the window background, and repaint.
    pub fn present(&self, conn: &RustConnection, pixmap: Pixmap, canvas: &Canvas) -> Result<()> {
        self.upload(conn, pixmap, canvas)?;

        conn.change_window_attributes(
            self.win,
            &ChangeWindowAttributesAux::new().background_pixmap(pixmap),
        )?;
        conn.clear_area(
            false,
            self.win,
            0,
            0,
            canvas.width() as u16,
            canvas.height() as u16,
        )?;
        conn.flush()?;
        Ok(())
    }

    /// Upload the whole canvas with PutImage, split into bands of scanlines
    /// that fit within the server's maximum request size.
    fn upload(&self, conn: &RustConnection, pixmap: Pixmap, canvas: &Canvas) -> Result<()> {
        let stride = canvas.width() as usize * 4;
        if stride == 0 {
            return Ok(());
        }
        // Fixed PutImage request part plus padding headroom
        let max_bytes = conn.maximum_request_bytes().saturating_sub(28);
        let rows_per_band = ((max_bytes / stride).max(1) as u32).min(u16::MAX as u32);
        let bytes = canvas.as_bytes();

        let mut y = 0u32;
        while y < canvas.height() {
            let rows = rows_per_band.min(canvas.height() - y);
            let start = y as usize * stride;
            let end = start + rows as usize * stride;
            conn.put_image(
                ImageFormat::Z_PIXMAP,
                pixmap,
                self.gc,
                canvas.width() as u16,
                rows as u16,
                0,
                y as i16,
                0,
                self.depth,
                &bytes[start..end],
            )?;
            y += rows;
        }
        Ok(())
    }
}

/// A 1x1 transparent cursor so the pointer disappears over the lock window
fn invisible_cursor(conn: &RustConnection, root: Window) -> Result<Cursor> {
    let cursor = conn.generate_id()?;
    let pixmap = conn.generate_id()?;

    conn.create_pixmap(1, pixmap, root, 1, 1)?;
    conn.create_cursor(cursor, pixmap, pixmap, 0, 0, 0, 0, 0, 0, 0, 0)?;
    conn.free_pixmap(pixmap)?;

    Ok(cursor)
}

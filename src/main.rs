//! Shade - X11 Screen Locker
//!
//! Covers the desktop with a fullscreen window, grabs the keyboard, and
//! renders an unlock indicator while a password is entered and verified.

mod auth;
mod config;
mod lock;
mod render;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use x11rb::connection::Connection;
use x11rb::protocol::randr::{ConnectionExt as _, NotifyMask};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use auth::{Authenticator, DevAuthenticator};
use config::Config;
use lock::keyboard::{KeyAction, KeyboardMap};
use lock::state::{AuthState, UnlockState};
use lock::window::LockWindow;
use lock::{dpi, screen, LockContext};

/// Password input beyond this many characters is dropped
const MAX_INPUT_LEN: usize = 512;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "shade=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shade screen locker");

    let config = Config::load()?;

    let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to the X server")?;
    let conn = Arc::new(conn);
    let root_screen = conn.setup().roots[screen_num].clone();

    let resolution = (
        root_screen.width_in_pixels as u32,
        root_screen.height_in_pixels as u32,
    );
    let scale = dpi::scaling_factor(&root_screen, config.indicator.dpi);
    debug!("DPI scaling factor: {:.2}", scale);

    // A missing or unreadable image degrades to the plain fill color; the
    // lock must come up regardless.
    let background = match &config.background.image {
        Some(path) => match image::open(path) {
            Ok(img) => Some(img.to_rgba8()),
            Err(e) => {
                warn!("could not load background image {:?}: {}", path, e);
                None
            }
        },
        None => None,
    };

    let monitors = screen::discover_monitors(&conn, root_screen.root).unwrap_or_else(|e| {
        warn!("monitor discovery failed: {}; centering on the root window", e);
        Vec::new()
    });

    conn.randr_select_input(root_screen.root, NotifyMask::SCREEN_CHANGE)
        .context("Failed to subscribe to screen change notifications")?;

    let window = LockWindow::create(&conn, &root_screen)?;
    let mut ctx = LockContext::new(
        Arc::clone(&conn),
        window,
        &config,
        background,
        monitors,
        resolution,
        scale,
    );

    // The first frame goes up before the grab so the desktop is already
    // covered while the keyboard is still being acquired.
    ctx.tracker.auth = AuthState::Locking;
    ctx.commit()?;

    if let Err(e) = ctx.grab_keyboard() {
        ctx.tracker.auth = AuthState::LockFailed;
        ctx.commit()?;
        return Err(e);
    }
    ctx.tracker.auth = AuthState::Idle;
    ctx.commit()?;

    let mut keymap = KeyboardMap::query(&conn)?;
    let mut authenticator = DevAuthenticator::from_env();
    run_event_loop(&conn, &mut ctx, &mut keymap, &mut authenticator)?;

    info!("unlocked, shutting down");
    Ok(())
}

/// Blocking event dispatch; returns once authentication succeeds
fn run_event_loop(
    conn: &RustConnection,
    ctx: &mut LockContext,
    keymap: &mut KeyboardMap,
    authenticator: &mut dyn Authenticator,
) -> Result<()> {
    let mut password = String::new();

    loop {
        let event = conn.wait_for_event().context("X connection lost")?;
        match event {
            Event::KeyPress(e) => {
                let action = keymap.resolve(e.detail, e.state);
                if handle_key(ctx, action, &mut password, authenticator)? {
                    return Ok(());
                }
            }
            Event::Expose(e) if e.count == 0 => {
                ctx.commit()?;
            }
            Event::RandrScreenChangeNotify(e) => {
                ctx.handle_resolution_change(e.width as u32, e.height as u32)?;
            }
            Event::MappingNotify(_) => {
                *keymap = KeyboardMap::query(conn)?;
            }
            Event::Error(e) => {
                warn!("X11 error: {:?}", e);
            }
            _ => {}
        }
    }
}

/// Apply one key action to the session; returns true once the submitted
/// password was accepted.
fn handle_key(
    ctx: &mut LockContext,
    action: KeyAction,
    password: &mut String,
    authenticator: &mut dyn Authenticator,
) -> Result<bool> {
    match action {
        KeyAction::Char(c) => {
            if password.chars().count() < MAX_INPUT_LEN {
                password.push(c);
            }
            ctx.tracker.unlock = UnlockState::KeyPressed;
            ctx.tracker.note_input(password.chars().count());
            ctx.commit()?;
        }
        KeyAction::Erase => {
            ctx.tracker.unlock = if password.pop().is_some() {
                UnlockState::BackspacePressed
            } else {
                UnlockState::NothingToDelete
            };
            ctx.tracker.note_input(password.chars().count());
            ctx.commit()?;
        }
        KeyAction::Submit => {
            ctx.tracker.auth = AuthState::Verifying;
            ctx.commit()?;

            if authenticator.authenticate(password)? {
                info!("authentication succeeded");
                return Ok(true);
            }

            warn!("authentication failed");
            ctx.tracker.auth = AuthState::Wrong;
            ctx.tracker.unlock = UnlockState::Started;
            password.clear();
            ctx.tracker.note_input(0);
            ctx.commit()?;
        }
        KeyAction::Cancel => {
            password.clear();
            ctx.tracker.auth = AuthState::Idle;
            ctx.tracker.note_input(0);
            ctx.clear_indicator()?;
        }
        KeyAction::Ignored => {}
    }
    Ok(false)
}

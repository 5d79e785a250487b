//! Keyboard Module
//!
//! Translates raw keycodes from KeyPress events into password-entry
//! actions using the server's keyboard mapping. Only Latin-1 keysyms and
//! the handful of editing keys the lock screen cares about are resolved;
//! everything else is ignored.

use anyhow::Result;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt as _, KeyButMask};
use x11rb::rust_connection::RustConnection;

const XK_BACKSPACE: u32 = 0xff08;
const XK_RETURN: u32 = 0xff0d;
const XK_ESCAPE: u32 = 0xff1b;
const XK_KP_ENTER: u32 = 0xff8d;
const XK_DELETE: u32 = 0xffff;

/// What a key press means for the password buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Append a character
    Char(char),
    /// Remove the last character (BackSpace and Delete are equivalent here)
    Erase,
    /// Submit the buffer for authentication
    Submit,
    /// Discard the buffer
    Cancel,
    /// Not relevant to password entry
    Ignored,
}

/// Snapshot of the server's keycode-to-keysym table
#[derive(Debug)]
pub struct KeyboardMap {
    first_keycode: u8,
    keysyms_per_keycode: usize,
    keysyms: Vec<u32>,
}

impl KeyboardMap {
    /// Fetch the mapping for the server's full keycode range
    pub fn query(conn: &RustConnection) -> Result<Self> {
        let setup = conn.setup();
        let first_keycode = setup.min_keycode;
        let count = setup.max_keycode - setup.min_keycode + 1;
        let reply = conn.get_keyboard_mapping(first_keycode, count)?.reply()?;
        Ok(Self::from_mapping(
            first_keycode,
            reply.keysyms_per_keycode,
            reply.keysyms,
        ))
    }

    fn from_mapping(first_keycode: u8, keysyms_per_keycode: u8, keysyms: Vec<u32>) -> Self {
        Self {
            first_keycode,
            keysyms_per_keycode: keysyms_per_keycode as usize,
            keysyms,
        }
    }

    /// Keysym for a keycode at the given shift level, falling back to the
    /// unshifted column when the shifted one is empty.
    fn keysym(&self, keycode: u8, shifted: bool) -> u32 {
        let index = keycode.wrapping_sub(self.first_keycode) as usize * self.keysyms_per_keycode;
        let column = |level: usize| -> u32 {
            self.keysyms.get(index + level).copied().unwrap_or(0)
        };
        if shifted && self.keysyms_per_keycode > 1 && column(1) != 0 {
            column(1)
        } else {
            column(0)
        }
    }

    /// Resolve a KeyPress into a password-entry action
    pub fn resolve(&self, keycode: u8, state: KeyButMask) -> KeyAction {
        let shifted = (u16::from(state) & u16::from(KeyButMask::SHIFT)) != 0;
        match self.keysym(keycode, shifted) {
            XK_BACKSPACE | XK_DELETE => KeyAction::Erase,
            XK_RETURN | XK_KP_ENTER => KeyAction::Submit,
            XK_ESCAPE => KeyAction::Cancel,
            // Latin-1 printable ranges; no locale-aware case mapping
            sym @ (0x20..=0x7e | 0xa0..=0xff) => match char::from_u32(sym) {
                Some(c) => KeyAction::Char(c),
                None => KeyAction::Ignored,
            },
            _ => KeyAction::Ignored,
        }
    }
}

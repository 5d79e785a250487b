//! Indicator Module
//!
//! Pure composition of one lock-screen frame: background fill, optional
//! image, and the centered password-dot run colored by the authentication
//! phase. Only the canvas is mutated; presentation happens elsewhere.

use image::RgbaImage;

use crate::config::Rgb;
use crate::lock::screen::Placement;
use crate::lock::state::{AuthState, StateSnapshot, UnlockState};
use crate::render::canvas::Canvas;
use crate::render::glyph::{centered_origin, DotFont, FONT_SIZE};

/// Upper bound on rendered password dots. Longer passwords keep counting
/// internally but the frame never shows more than this many glyphs.
pub const MAX_GLYPHS: usize = 64;

/// Fixed indicator palette
const COLOR_PROCESSING: Rgb = Rgb::new(84, 110, 122); // Teal, verify/lock in progress
const COLOR_ERROR: Rgb = Rgb::new(255, 83, 112); // Coral, attempt rejected
const COLOR_INPUT: Rgb = Rgb::new(255, 255, 255); // White, accepting input

/// Whether the dot run is drawn or suppressed for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPolicy {
    /// Draw the (possibly empty) dot run
    Dots,
    /// Draw nothing regardless of the glyph count
    Hidden,
}

/// Resolved presentation for one frame's dot run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorStyle {
    pub color: Rgb,
    pub text: TextPolicy,
}

/// Everything one frame depends on
#[derive(Debug)]
pub struct FrameParams<'a> {
    pub color: Rgb,
    pub image: Option<&'a RgbaImage>,
    pub tile: bool,
    pub indicator_enabled: bool,
    pub scale: f64,
    pub placement: Placement,
    pub state: StateSnapshot,
}

/// Map the combined state to dot color and visibility.
///
/// The match is total over both enums so a new state forces a decision
/// here instead of silently inheriting a default.
pub fn indicator_style(auth: AuthState, unlock: UnlockState) -> IndicatorStyle {
    match (auth, unlock) {
        (AuthState::Verifying | AuthState::Locking, _) => IndicatorStyle {
            color: COLOR_PROCESSING,
            text: TextPolicy::Dots,
        },
        (AuthState::Wrong, UnlockState::Started) => IndicatorStyle {
            color: COLOR_ERROR,
            text: TextPolicy::Dots,
        },
        // Typing again after a rejection switches back to the input color
        (
            AuthState::Wrong,
            UnlockState::KeyPressed | UnlockState::BackspacePressed | UnlockState::NothingToDelete,
        ) => IndicatorStyle {
            color: COLOR_INPUT,
            text: TextPolicy::Dots,
        },
        (AuthState::LockFailed, _) => IndicatorStyle {
            color: COLOR_ERROR,
            text: TextPolicy::Dots,
        },
        // Deleting past an empty buffer means there is nothing left to show
        (AuthState::Idle, UnlockState::NothingToDelete) => IndicatorStyle {
            color: COLOR_INPUT,
            text: TextPolicy::Hidden,
        },
        (
            AuthState::Idle,
            UnlockState::Started | UnlockState::KeyPressed | UnlockState::BackspacePressed,
        ) => IndicatorStyle {
            color: COLOR_INPUT,
            text: TextPolicy::Dots,
        },
    }
}

/// Whether any indicator content is drawn at all: the indicator must be
/// enabled and either a key press has been recorded or authentication has
/// left the idle state.
fn indicator_visible(params: &FrameParams) -> bool {
    params.indicator_enabled
        && (params.state.unlock != UnlockState::Started || params.state.auth != AuthState::Idle)
}

/// Dots actually rendered for a snapshot, after the text policy and the
/// `MAX_GLYPHS` cap are applied.
pub fn rendered_glyph_count(state: &StateSnapshot) -> usize {
    match indicator_style(state.auth, state.unlock).text {
        TextPolicy::Hidden => 0,
        TextPolicy::Dots => state.glyph_count.min(MAX_GLYPHS),
    }
}

/// Compose one frame onto `canvas`.
///
/// The surface persists stale content between draws, so the fill happens
/// unconditionally every frame before anything else is painted.
pub fn render_frame(canvas: &mut Canvas, params: &FrameParams) {
    canvas.fill(params.color);

    if let Some(img) = params.image {
        if params.tile {
            canvas.blit_tiled(img);
        } else {
            canvas.blit(img);
        }
    }

    if !indicator_visible(params) {
        return;
    }

    let style = indicator_style(params.state.auth, params.state.unlock);
    let count = rendered_glyph_count(&params.state);
    if count == 0 {
        return;
    }

    let font = DotFont::new(FONT_SIZE * params.scale);
    let extents = font.extents(count);
    let (x, y) = centered_origin(
        &extents,
        params.placement.center_x as f64,
        params.placement.center_y as f64,
    );
    font.draw(canvas, x, y, count, style.color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn snapshot(unlock: UnlockState, auth: AuthState, glyph_count: usize) -> StateSnapshot {
        StateSnapshot { unlock, auth, glyph_count }
    }

    fn params<'a>(state: StateSnapshot) -> FrameParams<'a> {
        FrameParams {
            color: Rgb::new(0x1f, 0x1f, 0x28),
            image: None,
            tile: false,
            indicator_enabled: true,
            scale: 1.0,
            placement: Placement { center_x: 100, center_y: 60 },
            state,
        }
    }

    #[test]
    fn test_processing_states_are_teal() {
        for auth in [AuthState::Verifying, AuthState::Locking] {
            let style = indicator_style(auth, UnlockState::KeyPressed);
            assert_eq!(style.color, COLOR_PROCESSING);
            assert_eq!(style.text, TextPolicy::Dots);
        }
    }

    #[test]
    fn test_rejection_is_coral_until_typing_resumes() {
        let style = indicator_style(AuthState::Wrong, UnlockState::Started);
        assert_eq!(style.color, COLOR_ERROR);

        let style = indicator_style(AuthState::Wrong, UnlockState::KeyPressed);
        assert_eq!(style.color, COLOR_INPUT);
    }

    #[test]
    fn test_lock_failure_is_coral_unconditionally() {
        for unlock in [
            UnlockState::Started,
            UnlockState::KeyPressed,
            UnlockState::BackspacePressed,
            UnlockState::NothingToDelete,
        ] {
            assert_eq!(indicator_style(AuthState::LockFailed, unlock).color, COLOR_ERROR);
        }
    }

    #[test]
    fn test_nothing_to_delete_forces_empty_text() {
        let style = indicator_style(AuthState::Idle, UnlockState::NothingToDelete);
        assert_eq!(style.text, TextPolicy::Hidden);

        // The override wins even when a stale glyph count is nonzero
        let state = snapshot(UnlockState::NothingToDelete, AuthState::Idle, 12);
        assert_eq!(rendered_glyph_count(&state), 0);
    }

    #[test]
    fn test_glyph_count_is_capped() {
        let state = snapshot(UnlockState::KeyPressed, AuthState::Idle, 200);
        assert_eq!(rendered_glyph_count(&state), MAX_GLYPHS);

        let state = snapshot(UnlockState::KeyPressed, AuthState::Idle, 3);
        assert_eq!(rendered_glyph_count(&state), 3);
    }

    #[test]
    fn test_idle_frame_is_background_only() {
        let state = snapshot(UnlockState::Started, AuthState::Idle, 4);
        let mut frame = Canvas::new(200, 120);
        render_frame(&mut frame, &params(state));

        let mut background_only = Canvas::new(200, 120);
        background_only.fill(Rgb::new(0x1f, 0x1f, 0x28));
        assert_eq!(frame, background_only);
    }

    #[test]
    fn test_disabled_indicator_never_draws_dots() {
        let state = snapshot(UnlockState::KeyPressed, AuthState::Idle, 4);
        let mut p = params(state);
        p.indicator_enabled = false;
        let mut frame = Canvas::new(200, 120);
        render_frame(&mut frame, &p);

        let mut background_only = Canvas::new(200, 120);
        background_only.fill(Rgb::new(0x1f, 0x1f, 0x28));
        assert_eq!(frame, background_only);
    }

    #[test]
    fn test_dots_drawn_when_input_recorded() {
        let state = snapshot(UnlockState::KeyPressed, AuthState::Idle, 2);
        let mut frame = Canvas::new(200, 120);
        render_frame(&mut frame, &params(state));

        let white = COLOR_INPUT.argb();
        assert!(frame.pixels().iter().any(|&p| p == white));
    }

    #[test]
    fn test_identical_inputs_render_identical_frames() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([40, 40, 60, 255]));
        let state = snapshot(UnlockState::KeyPressed, AuthState::Verifying, 5);
        let mut p = params(state);
        p.image = Some(&img);
        p.tile = true;

        let mut first = Canvas::new(200, 120);
        render_frame(&mut first, &p);
        let mut second = Canvas::new(200, 120);
        render_frame(&mut second, &p);
        assert_eq!(first, second);

        // Re-rendering over a dirty surface converges to the same frame
        render_frame(&mut second, &p);
        assert_eq!(first, second);
    }
}

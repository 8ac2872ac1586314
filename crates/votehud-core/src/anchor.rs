//! Anchor resolution

use votehud_config::HudAnchor;
use votehud_host_api::Viewport;

/// Screen margin kept around the overlay, in GUI units
pub const HUD_PADDING: i32 = 6;

/// Top-left drawing position for content of `width` x `height` (pre-scale).
///
/// The returned coordinates are in pre-scale units: the caller draws at
/// them after applying `scale`. The scaled content keeps `padding` screen
/// units from the anchored edges and never extends past the viewport,
/// unless it is larger than the viewport itself, in which case it is
/// pinned to the top-left.
pub fn resolve_anchor(
    viewport: Viewport,
    scale: f32,
    width: i32,
    height: i32,
    padding: i32,
    anchor: HudAnchor,
) -> (i32, i32) {
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    };

    let near = (padding as f32 / scale) as i32;
    let far = |extent: i32, size: i32| {
        let scaled = (size as f32 * scale).ceil() as i32;
        (((extent - scaled - padding) as f32 / scale) as i32).max(0)
    };

    let x = if anchor.is_right() {
        far(viewport.width, width)
    } else {
        near
    };
    let y = if anchor.is_bottom() {
        far(viewport.height, height)
    } else {
        near
    };
    (x, y)
}

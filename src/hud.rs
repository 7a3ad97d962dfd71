//! Presentation helpers
//!
//! Pure functions the drawing layer uses to color entities and format the
//! survival clock.

/// RGBA color for a fusion stage (green, yellow, orange, red, purple, blue)
pub fn stage_color(stage: u8) -> [f32; 4] {
    let (r, g, b) = match stage {
        0 => (0, 255, 0),
        1 => (255, 255, 0),
        2 => (255, 165, 0),
        3 => (255, 0, 0),
        4 => (180, 0, 255),
        5 => (0, 150, 255),
        _ => (255, 255, 255),
    };
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// Fill color for an entity in the debug view (red while overlapping)
pub fn debug_color(colliding: bool) -> [f32; 4] {
    if colliding {
        [1.0, 0.0, 0.0, 1.0]
    } else {
        [1.0, 1.0, 1.0, 1.0]
    }
}

/// Format seconds as `MM:SS:CC` (centiseconds truncated, negatives clamp to zero)
pub fn format_time(seconds: f32) -> String {
    let seconds = seconds.max(0.0);
    let whole = seconds as u32;
    let centis = ((seconds - whole as f32) * 100.0) as u32;
    format!("{:02}:{:02}:{:02}", whole / 60, whole % 60, centis)
}

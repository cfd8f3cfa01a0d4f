use glam::Vec2;
use serde::Deserialize;

use crate::ring::SampleRing;

/// Brightness range for the filled bulk in the flat style.
pub const FLAT_BULK: (i64, i64) = (0, 255);
/// Brightness range for the filled bulk in the projected style.
pub const PROJECTED_BULK: (i64, i64) = (0, 200);
/// Brightness range for the projected shadow lines.
pub const PROJECTED_SHADOW: (i64, i64) = (25, 200);

const TRACE_WHITE: [u8; 3] = [255, 255, 255];

fn default_vanish_x() -> f32 {
    0.5
}

fn default_vanish_y() -> f32 {
    0.1
}

/// How the top edge of the waveform is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceStyle {
    /// White trace joining neighbouring column tops.
    #[default]
    Flat,
    /// Shadow lines from every column top to a vanishing point placed at
    /// fractions of the surface width and height.
    Projected {
        #[serde(default = "default_vanish_x")]
        vanish_x: f32,
        #[serde(default = "default_vanish_y")]
        vanish_y: f32,
    },
}

/// One line primitive in surface pixel coordinates (origin top-left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
    pub rgb: [u8; 3],
}

impl Segment {
    fn grey(from: Vec2, to: Vec2, level: i64) -> Self {
        let level = level.clamp(0, 255) as u8;
        Self {
            from,
            to,
            rgb: [level; 3],
        }
    }
}

/// Linear remap of `num` from `[min, max]` into `[min_scale, max_scale]`,
/// clamped to the target range.
///
/// Returns 0 when `num` or `max` is 0; that also covers the empty-range case
/// that would otherwise divide by zero.
pub fn remap(num: i64, min_scale: i64, max_scale: i64, min: i64, max: i64) -> i64 {
    if num == 0 || max == 0 || max == min {
        return 0;
    }
    let [num, min_scale, max_scale, min, max] =
        [num, min_scale, max_scale, min, max].map(i128::from);
    let mapped = (max_scale - min_scale) * (num - min) / (max - min) + min_scale;
    mapped.clamp(min_scale.min(max_scale), min_scale.max(max_scale)) as i64
}

/// Per-frame inputs to [`map_columns`].
#[derive(Clone, Copy, Debug)]
pub struct FrameGeometry {
    pub height: u32,
    pub factor: f64,
    pub window_max: i64,
    pub style: TraceStyle,
}

impl FrameGeometry {
    fn top(&self, value: i64) -> f32 {
        (f64::from(self.height) - value as f64 * self.factor) as f32
    }
}

/// Build the ordered draw list for one frame. Pure: reads the ring and the
/// frame geometry, mutates nothing.
///
/// Covers columns `0..width - 1`; the last column only serves as the right
/// end of the trace from its neighbour.
pub fn map_columns(ring: &SampleRing, geometry: &FrameGeometry) -> Vec<Segment> {
    let width = ring.width();
    if width < 2 {
        return Vec::new();
    }
    let bottom = geometry.height as f32;
    let values: Vec<i64> = ring.iter().collect();
    let mut segments = Vec::with_capacity((width - 1) * 2);

    match geometry.style {
        TraceStyle::Flat => {
            for (i, pair) in values.windows(2).enumerate() {
                let x = i as f32;
                let top = geometry.top(pair[0]);
                let next_top = geometry.top(pair[1]);
                let shade = remap(pair[0], FLAT_BULK.0, FLAT_BULK.1, 0, geometry.window_max);

                segments.push(Segment::grey(Vec2::new(x, top), Vec2::new(x, bottom), shade));
                segments.push(Segment {
                    from: Vec2::new(x, top - 1.0),
                    to: Vec2::new(x + 1.0, next_top - 1.0),
                    rgb: TRACE_WHITE,
                });
            }
        }
        TraceStyle::Projected { vanish_x, vanish_y } => {
            let vanish = Vec2::new(width as f32 * vanish_x, bottom * vanish_y);
            let columns = &values[..width - 1];

            // Shadows first so the bulk paints over them.
            for (i, &v) in columns.iter().enumerate() {
                let top = Vec2::new(i as f32, geometry.top(v));
                let shade = remap(
                    v,
                    PROJECTED_SHADOW.0,
                    PROJECTED_SHADOW.1,
                    0,
                    geometry.window_max,
                );
                segments.push(Segment::grey(top, vanish, shade));
            }
            for (i, &v) in columns.iter().enumerate() {
                let x = i as f32;
                let shade = remap(
                    v,
                    PROJECTED_BULK.0,
                    PROJECTED_BULK.1,
                    0,
                    geometry.window_max,
                );
                segments.push(Segment::grey(
                    Vec2::new(x, geometry.top(v)),
                    Vec2::new(x, bottom),
                    shade,
                ));
            }
        }
    }

    segments
}

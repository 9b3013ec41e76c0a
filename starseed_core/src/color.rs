// HSL color helpers shared by the texture paths.
//
// Planet attributes are expressed in HSL (hue degrees, saturation and
// lightness in [0, 1]); pixel buffers are RGBA8. `hsl_to_rgb` is the single
// conversion point. Hue wraps, saturation and lightness clamp, so callers can
// feed drifted values (biome hue drift, latitude lightening) without
// pre-clamping.

/// An RGB triple, 0–255 per channel.
pub type Rgb = [u8; 3];

/// Convert HSL to RGB. `h` in degrees (any value, wrapped into [0, 360)),
/// `s` and `l` clamped to [0, 1]. Channels are rounded to nearest.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [to_channel(r + m), to_channel(g + m), to_channel(b + m)]
}

/// Map a [0, 1] intensity to a rounded, clamped byte.
pub fn to_channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Add a signed delta to a channel, clamping to the byte range.
pub fn offset_channel(base: u8, delta: f64) -> u8 {
    (base as f64 + delta).round().clamp(0.0, 255.0) as u8
}

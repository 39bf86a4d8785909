// Float helpers usable without `std` (core has no `abs`/`round` on older toolchains).

#[inline]
pub fn fabs(x: f32) -> f32 {
    if x < 0.0 {
        -x
    } else {
        x
    }
}

/// Rounds half away from zero.
#[inline]
pub fn round_i32(x: f32) -> i32 {
    if x >= 0.0 {
        (x + 0.5) as i32
    } else {
        (x - 0.5) as i32
    }
}

/// Neutral plus a signed offset, saturated to the servo range.
#[inline]
pub fn servo_offset(neutral: u8, offset: i32, max: u8) -> u8 {
    (neutral as i32).saturating_add(offset).clamp(0, max as i32) as u8
}

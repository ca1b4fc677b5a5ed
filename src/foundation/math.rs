pub(crate) fn mul_div255_u8(x: u8, y: u8) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

/// Scale every channel of a premultiplied pixel by `coverage / 255`.
pub(crate) fn scale_premul_px(px: &mut [u8], coverage: u8) {
    match coverage {
        255 => {}
        0 => px.fill(0),
        c => {
            for ch in px.iter_mut() {
                *ch = mul_div255_u8(*ch, c);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

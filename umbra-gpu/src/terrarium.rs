use spirv_std::glam::Vec4;

/// Offset subtracted from the packed value so that the encoding can represent
/// ocean floors.
pub const TERRARIUM_OFFSET: f32 = 32768.0;

/// Decodes an elevation (in meters) from a Terrarium-encoded texel, as read
/// from an `Rgba8Unorm` texture (i.e. with channels normalized to `<0, 1>`).
///
/// `value = R * 256 + G + B / 256 - 32768`
pub fn decode_terrarium(texel: Vec4) -> f32 {
    let r = texel.x * 255.0;
    let g = texel.y * 255.0;
    let b = texel.z * 255.0;

    r * 256.0 + g + b / 256.0 - TERRARIUM_OFFSET
}

/// Decodes an elevation from raw Terrarium bytes.
pub fn decode_terrarium_bytes([r, g, b]: [u8; 3]) -> f32 {
    (r as f32) * 256.0 + (g as f32) + (b as f32) / 256.0 - TERRARIUM_OFFSET
}

/// Encodes an elevation into Terrarium bytes (RGBA, with alpha set to 255).
///
/// Values outside of the representable range are saturated.
pub fn encode_terrarium(meters: f32) -> [u8; 4] {
    let value = (meters + TERRARIUM_OFFSET).clamp(0.0, 65535.99);
    let int = value as u32;
    let fract = value - (int as f32);

    [
        (int >> 8) as u8,
        (int & 0xff) as u8,
        ((fract * 256.0) as u32).min(255) as u8,
        255,
    ]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use spirv_std::glam::vec4;

    use super::*;

    #[test]
    fn decode() {
        assert_relative_eq!(0.0, decode_terrarium_bytes([128, 0, 0]));
        assert_relative_eq!(-32768.0, decode_terrarium_bytes([0, 0, 0]));
        assert_relative_eq!(1.5, decode_terrarium_bytes([128, 1, 128]));

        assert_relative_eq!(
            1.5,
            decode_terrarium(vec4(128.0 / 255.0, 1.0 / 255.0, 128.0 / 255.0, 1.0)),
            epsilon = 1e-3
        );
    }

    #[test]
    fn encode() {
        for meters in [-412.25, 0.0, 8848.5, 1234.75] {
            let [r, g, b, a] = encode_terrarium(meters);

            assert_eq!(255, a);
            assert_relative_eq!(meters, decode_terrarium_bytes([r, g, b]));
        }

        assert_eq!([0, 0, 0, 255], encode_terrarium(-40000.0));
    }
}

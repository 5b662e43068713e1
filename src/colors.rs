use palette::{IntoColor, Lab, Srgb};

pub type RGBTuple = (u8, u8, u8);

/// Parses `#rrggbb`, `#rgb` or a dye colour name into an RGB triple.
pub fn color_text_to_rgb_tuple(text: &str) -> Option<RGBTuple> {
    let text: &str = text.trim();

    if let Some(rgb) = full_hex_color_to_rgb_tuple(text) {
        return Some(rgb);
    }

    if let Some(rgb) = short_hex_color_to_rgb_tuple(text) {
        return Some(rgb);
    }

    dye_name_to_rgb_tuple(&text.to_ascii_lowercase().replace(' ', "_"))
}

fn hex_digits(text: &str, len: usize) -> Option<&str> {
    let digits: &str = text.strip_prefix('#')?;
    if digits.len() != len || !digits.chars().all(|c: char| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(digits)
}

fn full_hex_color_to_rgb_tuple(text: &str) -> Option<RGBTuple> {
    let digits: &str = hex_digits(text, 6)?;
    let r: u8 = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g: u8 = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b: u8 = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

fn short_hex_color_to_rgb_tuple(text: &str) -> Option<RGBTuple> {
    let digits: &str = hex_digits(text, 3)?;
    let expand = |range: std::ops::Range<usize>| -> Option<u8> {
        let v: u8 = u8::from_str_radix(&digits[range], 16).ok()?;
        Some(v | (v << 4))
    };
    Some((expand(0..1)?, expand(1..2)?, expand(2..3)?))
}

/// The sixteen dye colours, as used in names like `light_blue_wool`.
fn dye_name_to_rgb_tuple(text: &str) -> Option<RGBTuple> {
    Some(match text {
        "white" => (249, 255, 254),
        "orange" => (249, 128, 29),
        "magenta" => (199, 78, 189),
        "light_blue" => (58, 179, 218),
        "yellow" => (254, 216, 61),
        "lime" => (128, 199, 31),
        "pink" => (243, 139, 170),
        "gray" | "grey" => (71, 79, 82),
        "light_gray" | "light_grey" => (157, 157, 151),
        "cyan" => (22, 156, 156),
        "purple" => (137, 50, 184),
        "blue" => (60, 68, 170),
        "brown" => (131, 84, 50),
        "green" => (94, 124, 22),
        "red" => (176, 46, 38),
        "black" => (29, 29, 33),
        _ => return None,
    })
}

/// Converts an sRGB triple to CIE L*a*b* (D65).
///
/// The same conversion is used for block swatches and image palette entries, so
/// distances between the two are comparable.
pub fn rgb_to_lab(rgb: RGBTuple) -> Lab {
    Srgb::new(rgb.0, rgb.1, rgb.2)
        .into_format::<f32>()
        .into_color()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(color_text_to_rgb_tuple("#ff8000"), Some((255, 128, 0)));
        assert_eq!(color_text_to_rgb_tuple("#FfA"), Some((255, 255, 170)));
        assert_eq!(color_text_to_rgb_tuple("  #000000 "), Some((0, 0, 0)));

        assert_eq!(color_text_to_rgb_tuple("#ff800"), None);
        assert_eq!(color_text_to_rgb_tuple("ff8000"), None);
        assert_eq!(color_text_to_rgb_tuple("#gg0000"), None);
    }

    #[test]
    fn test_dye_names() {
        assert_eq!(color_text_to_rgb_tuple("White"), Some((249, 255, 254)));
        assert_eq!(color_text_to_rgb_tuple("light blue"), Some((58, 179, 218)));
        assert_eq!(color_text_to_rgb_tuple("grey"), color_text_to_rgb_tuple("gray"));
        assert_eq!(color_text_to_rgb_tuple("chartreuse"), None);
        assert_eq!(color_text_to_rgb_tuple("teal"), None);
    }

    #[test]
    fn test_lab_extremes() {
        let black: Lab = rgb_to_lab((0, 0, 0));
        assert!(black.l.abs() < 0.01);

        let white: Lab = rgb_to_lab((255, 255, 255));
        assert!((white.l - 100.0).abs() < 0.1);
        assert!(white.a.abs() < 0.1);
        assert!(white.b.abs() < 0.1);
    }
}

use crate::qrcode::QrCode;

use image::{ImageBuffer, Luma};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/*---- Utilities ----*/

// Renderers only use the read-only query contract of QrCode. Positions outside the symbol
// (the quiet zone) read as light, then `invert` swaps the polarity of everything.

fn is_dark(qr: &QrCode, x: i32, y: i32) -> bool {
    qr.get_module(x, y).unwrap_or(false) != qr.invert()
}

fn quiet(qr: &QrCode) -> i32 {
    i32::from(qr.quiet())
}

/// Two characters per module, one line per row. Dark data modules use `data` when given, so they
/// can be told apart from function patterns.
pub fn to_text_large(qr: &QrCode, light: &str, dark: &str, data: Option<&str>) -> String {
    let border = quiet(qr);
    let mut lines: Vec<String> = Vec::new();
    for y in -border..qr.dimension() + border {
        let mut line = String::new();
        for x in -border..qr.dimension() + border {
            let bit = is_dark(qr, x, y);
            line += match data {
                Some(data) if bit && qr.identify_module(x, y).is_none() => data,
                _ if bit => dark,
                _ => light,
            };
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Half-block characters, two module rows per line.
pub fn to_text_medium(qr: &QrCode) -> String {
    const GLYPHS: [char; 4] = [' ', '\u{2580}', '\u{2584}', '\u{2588}'];
    let border = quiet(qr);
    let mut lines: Vec<String> = Vec::new();
    for y in (-border..qr.dimension() + border).step_by(2) {
        let line: String = (-border..qr.dimension() + border)
            .map(|x| {
                let upper = usize::from(is_dark(qr, x, y));
                let lower = usize::from(is_dark(qr, x, y + 1));
                GLYPHS[upper | (lower << 1)]
            })
            .collect();
        lines.push(line);
    }
    lines.join("\n")
}

/// Quadrant characters, 2x2 modules per character.
pub fn to_text_compact(qr: &QrCode) -> String {
    const GLYPHS: [char; 16] = [
        ' ', '\u{2598}', '\u{259d}', '\u{2580}', '\u{2596}', '\u{258c}', '\u{259e}',
        '\u{259b}', '\u{2597}', '\u{259a}', '\u{2590}', '\u{259c}', '\u{2584}', '\u{2599}',
        '\u{259f}', '\u{2588}',
    ];
    let border = quiet(qr);
    let mut lines: Vec<String> = Vec::new();
    for y in (-border..qr.dimension() + border).step_by(2) {
        let line: String = (-border..qr.dimension() + border)
            .step_by(2)
            .map(|x| {
                let value = usize::from(is_dark(qr, x, y))
                    | usize::from(is_dark(qr, x + 1, y)) << 1
                    | usize::from(is_dark(qr, x, y + 1)) << 2
                    | usize::from(is_dark(qr, x + 1, y + 1)) << 3;
                GLYPHS[value]
            })
            .collect();
        lines.push(line);
    }
    lines.join("\n")
}

/// Like [`to_text_large`], but function-pattern modules show their two-letter tag.
pub fn to_debug_string(qr: &QrCode) -> String {
    let border = quiet(qr);
    let mut lines: Vec<String> = Vec::new();
    for y in -border..qr.dimension() + border {
        let mut line = String::new();
        for x in -border..qr.dimension() + border {
            line += match qr.identify_module(x, y) {
                Some(pattern) => pattern.code(),
                None if is_dark(qr, x, y) => "\u{2588}\u{2588}",
                None => "  ",
            };
        }
        lines.push(line);
    }
    lines.join("\n")
}

// Returns a string of SVG code for an image depicting
// the given QR Code, including its quiet zone.
// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(qr: &QrCode) -> String {
    let border = quiet(qr);
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    let dimension = qr.dimension() + 2 * border;
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"{0} {0} {1} {1}\" stroke=\"none\" shape-rendering=\"crispEdges\">\n",
        -border, dimension
    );
    result += &format!(
        "\t<rect x=\"{0}\" y=\"{0}\" width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n",
        -border
    );
    let mut path: Vec<String> = Vec::new();
    for y in -border..qr.dimension() + border {
        for x in -border..qr.dimension() + border {
            if is_dark(qr, x, y) {
                path.push(format!("M{},{}h1v1h-1z", x, y));
            }
        }
    }
    result += &format!("\t<path d=\"{}\" fill=\"#000000\"/>\n", path.join(" "));
    result += "</svg>\n";
    result
}

/// Prints the given QrCode object to the console.
pub fn print_qr(qr: &QrCode) {
    println!("{}", to_text_medium(qr));
}

/// Renders the QR Code, quiet zone included, as a grayscale image with `scale` pixels per module.
///
/// # Example
///
/// ```
/// use qrmatrix::helper::to_image_buffer;
/// use qrmatrix::qrcode::{QrCode, QrOptions};
///
/// let qr = QrCode::encode_text("Hello, World!", &QrOptions::default()).unwrap();
/// let img = to_image_buffer(&qr, 2);
/// assert_eq!(img.width(), 2 * (qr.dimension() as u32 + 8));
/// ```
pub fn to_image_buffer(qr: &QrCode, scale: u32) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let scale = scale.max(1);
    let border = quiet(qr);
    let size = (qr.dimension() + 2 * border) as u32 * scale;
    let mut img = ImageBuffer::new(size, size);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let qr_x = (x / scale) as i32 - border;
        let qr_y = (y / scale) as i32 - border;
        *pixel = if is_dark(qr, qr_x, qr_y) {
            Luma([0u8]) // Black
        } else {
            Luma([255u8]) // White
        };
    }

    img
}

/// Converts a QR Code object to an image and saves it to a file.
///
/// # Arguments
///
/// * `qr` - The QR Code object to convert.
/// * `directory_path` - Optional. The directory path where the image will be saved. If not provided, the default directory is "generated".
/// * `filename` - Optional. The file name; the extension picks the format (`.png`, `.bmp`, ...). If not provided, a timestamp-based PNG name is used.
///
/// # Errors
///
/// Returns an `image::ImageError` if the directory cannot be created or the image cannot be saved.
pub fn qr_to_image_and_save(
    qr: &QrCode,
    directory_path: Option<&str>,
    filename: Option<&str>,
) -> Result<(), image::ImageError> {
    let img = to_image_buffer(qr, 1);

    let directory_path = directory_path.unwrap_or("generated");
    let filename = match filename {
        Some(name) => name.to_string(),
        None => {
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            format!("{}.png", since_the_epoch.as_millis())
        }
    };

    // Check if the directory exists, create it if it doesn't
    if !Path::new(directory_path).exists() {
        fs::create_dir_all(directory_path)?;
    }

    img.save(Path::new(directory_path).join(filename))
}

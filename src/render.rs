use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use log::debug;

use crate::builder::qr::QrCode;
use crate::common::error::{QRError, QRResult};

// Render config
//------------------------------------------------------------------------------

/// Raster and vector output settings. `scale` is pixels (or SVG units)
/// per module, `border` the quiet zone width in modules.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    scale: i32,
    border: i32,
    light: Rgba<u8>,
    dark: Rgba<u8>,
    svg_xml_header: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 10,
            border: 4,
            light: Rgba([255, 255, 255, 255]),
            dark: Rgba([0, 0, 0, 255]),
            svg_xml_header: false,
        }
    }
}

impl RenderConfig {
    pub fn new(scale: i32, border: i32) -> Self {
        Self { scale, border, ..Self::default() }
    }

    pub fn light(mut self, light: Rgba<u8>) -> Self {
        self.light = light;
        self
    }

    pub fn dark(mut self, dark: Rgba<u8>) -> Self {
        self.dark = dark;
        self
    }

    pub fn svg_xml_header(mut self, svg_xml_header: bool) -> Self {
        self.svg_xml_header = svg_xml_header;
        self
    }

    fn validate(&self, qr: &QrCode) -> QRResult<i64> {
        if self.scale <= 0 {
            return Err(QRError::InvalidConfig("scale must be positive"));
        }
        if self.border < 0 {
            return Err(QRError::InvalidConfig("border must be non-negative"));
        }
        let dim =
            (qr.size() as i64 + 2 * self.border as i64) * self.scale as i64;
        if dim > i32::MAX as i64 {
            return Err(QRError::InvalidConfig("scale or border too large"));
        }
        Ok(dim)
    }
}

// PNG
//------------------------------------------------------------------------------

/// Renders `qr` as a raster image, `config.scale` pixels per module.
pub fn to_image(qr: &QrCode, config: &RenderConfig) -> QRResult<RgbaImage> {
    let dim = config.validate(qr)? as u32;
    let scale = config.scale as u32;
    let border = config.border as u32;
    let qr_px = qr.size() as u32 * scale;

    let mut canvas = RgbaImage::from_pixel(dim, dim, config.light);
    for y in 0..qr_px {
        for x in 0..qr_px {
            if qr.get_module((x / scale) as i32, (y / scale) as i32) {
                canvas.put_pixel(border * scale + x, border * scale + y, config.dark);
            }
        }
    }
    Ok(canvas)
}

/// Encodes `qr` as PNG into `writer`.
pub fn write_png<W: Write>(qr: &QrCode, config: &RenderConfig, writer: W) -> QRResult<()> {
    let canvas = to_image(qr, config)?;
    let encoder = PngEncoder::new(writer);
    encoder.write_image(
        canvas.as_raw(),
        canvas.width(),
        canvas.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

pub fn save_png<P: AsRef<Path>>(qr: &QrCode, config: &RenderConfig, path: P) -> QRResult<()> {
    debug!("Writing PNG to {:?}...", path.as_ref());
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_png(qr, config, &mut writer)?;
    writer.flush()?;
    Ok(())
}

// SVG
//------------------------------------------------------------------------------

/// Renders `qr` as SVG markup. Each dark module becomes one square in
/// a single path element, colors in #RRGGBB hex.
pub fn to_svg_string(qr: &QrCode, config: &RenderConfig) -> QRResult<String> {
    config.validate(qr)?;
    let dim = qr.size() as i64 + 2 * config.border as i64;
    let border = config.border as i64;

    let mut svg = String::new();
    if config.svg_xml_header {
        svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        svg.push_str(
            "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
             \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n",
        );
    }
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {dim} {dim}\" stroke=\"none\">"
    );
    let _ = writeln!(
        svg,
        "\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        hex_color(config.light)
    );
    svg.push_str("\t<path d=\"");
    let mut first = true;
    for y in 0..qr.size() as i32 {
        for x in 0..qr.size() as i32 {
            if qr.get_module(x, y) {
                if !first {
                    svg.push(' ');
                }
                first = false;
                let _ = write!(svg, "M{},{}h1v1h-1z", x as i64 + border, y as i64 + border);
            }
        }
    }
    let _ = writeln!(svg, "\" fill=\"{}\"/>", hex_color(config.dark));
    svg.push_str("</svg>\n");
    Ok(svg)
}

pub fn write_svg<W: Write>(qr: &QrCode, config: &RenderConfig, mut writer: W) -> QRResult<()> {
    let svg = to_svg_string(qr, config)?;
    writer.write_all(svg.as_bytes())?;
    Ok(())
}

/// Writes SVG markup to `path`, which must carry an `svg` extension.
pub fn save_svg<P: AsRef<Path>>(qr: &QrCode, config: &RenderConfig, path: P) -> QRResult<()> {
    let path = path.as_ref();
    if path.extension().and_then(|e| e.to_str()) != Some("svg") {
        return Err(QRError::InvalidConfig("output file must have an svg extension"));
    }
    debug!("Writing SVG to {path:?}...");
    let svg = to_svg_string(qr, config)?;
    std::fs::write(path, svg)?;
    Ok(())
}

fn hex_color(color: Rgba<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

#[cfg(test)]
mod render_tests {
    use super::*;
    use crate::builder::encode_text;
    use crate::common::metadata::ECLevel;

    #[test]
    fn test_rejects_bad_scale_and_border() {
        let qr = encode_text("Hello, world!", ECLevel::L).unwrap();
        assert!(matches!(
            to_image(&qr, &RenderConfig::new(0, 4)),
            Err(QRError::InvalidConfig(_))
        ));
        assert!(matches!(
            to_image(&qr, &RenderConfig::new(10, -1)),
            Err(QRError::InvalidConfig(_))
        ));
        assert!(matches!(
            to_image(&qr, &RenderConfig::new(10, i32::MAX)),
            Err(QRError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_image_dimensions_and_colors() {
        let qr = encode_text("Hello, world!", ECLevel::L).unwrap();
        let img = to_image(&qr, &RenderConfig::new(2, 3)).unwrap();
        let expected = (21 + 2 * 3) * 2;
        assert_eq!(img.width(), expected as u32);
        assert_eq!(img.height(), expected as u32);
        // Quiet zone corner is light, finder corner is dark.
        assert_eq!(*img.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(6, 6), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_svg_structure() {
        let qr = encode_text("Hello, world!", ECLevel::L).unwrap();
        let svg = to_svg_string(&qr, &RenderConfig::new(10, 4)).unwrap();
        assert!(!svg.starts_with("<?xml"));
        assert!(svg.contains("viewBox=\"0 0 29 29\""));
        assert!(svg.contains("fill=\"#000000\""));
        assert!(svg.contains("M4,4h1v1h-1z"));

        let with_header =
            to_svg_string(&qr, &RenderConfig::new(10, 4).svg_xml_header(true)).unwrap();
        assert!(with_header.starts_with("<?xml version=\"1.0\""));
    }

    #[test]
    fn test_save_svg_rejects_other_extension() {
        let qr = encode_text("Hello, world!", ECLevel::L).unwrap();
        let res = save_svg(&qr, &RenderConfig::default(), "test.other");
        assert!(matches!(res, Err(QRError::InvalidConfig(_))));
    }

    #[test]
    fn test_write_png_to_buffer() {
        let qr = encode_text("Hello, world!", ECLevel::L).unwrap();
        let mut buf = Vec::new();
        write_png(&qr, &RenderConfig::new(4, 4), &mut buf).unwrap();
        assert_eq!(&buf[1..4], b"PNG");
    }

    #[test]
    fn test_write_failure_surfaces_as_io() {
        struct BadWriter;
        impl std::io::Write for BadWriter {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("broken pipe"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Err(std::io::Error::other("broken pipe"))
            }
        }
        let qr = encode_text("Hello, world!", ECLevel::L).unwrap();
        let res = write_svg(&qr, &RenderConfig::default(), BadWriter);
        assert!(matches!(res, Err(QRError::Io(_))));
    }
}

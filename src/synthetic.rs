// THEORY:
// The `synthetic` module paints stand-in images for demos and tests: cartoon faces
// whose palette leans happy or sad, and simplified club crests built from each club's
// colours. They are rasters first and PNG bytes second, so tests can either feed the
// raster straight to the feature functions or push encoded bytes through the full
// decode path.
//
// Key principles:
// 1) Palette carries the signal. Happy faces sit on a warm, bright background with a
//    light complexion; sad faces sit on a muted blue background with a shadowed one. The
//    smile or frown is drawn too but is far too small to move the statistics.
// 2) Crests are laid out so their channel ratios land inside the decision-tree
//    rule for the club they depict (where the club has one).
// 3) Shapes are evaluated per pixel centre, so output depends only on the requested
//    size (and, for faces, the RNG).

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::raster::raster::Raster;
use crate::core_modules::team::Club;
use crate::error::{Result, VisionError};
use crate::payload::NamedImage;
use image::ImageEncoder;
use rand::Rng;
use std::path::Path;

pub const DEFAULT_SIZE: u32 = 200;

/// Clubs the generated crest set covers, two crests each.
pub const CREST_ROSTER: [Club; 8] = [
    Club::Flamengo,
    Club::Palmeiras,
    Club::Corinthians,
    Club::Santos,
    Club::SaoPaulo,
    Club::Gremio,
    Club::Vasco,
    Club::Internacional,
];

pub const HAPPY_FACE_NAMES: [&str; 4] = ["pessoa_feliz_1", "rosto_sorrindo", "happy_face", "alegre_jovem"];
pub const SAD_FACE_NAMES: [&str; 4] = ["pessoa_triste_1", "rosto_chorando", "sad_face", "melancolia"];

const BLACK: Pixel = Pixel::new(0, 0, 0);
const WHITE: Pixel = Pixel::new(255, 255, 255);
const RED: Pixel = Pixel::new(255, 0, 0);
const GREEN: Pixel = Pixel::new(0, 128, 0);
const BLUE: Pixel = Pixel::new(0, 0, 255);
const GRAY: Pixel = Pixel::new(128, 128, 128);
const MAROON: Pixel = Pixel::new(128, 0, 32);

const LIGHT_SKIN: Pixel = Pixel::new(240, 200, 160);
const SHADOWED_SKIN: Pixel = Pixel::new(170, 140, 120);

/// A cartoon face on a background whose palette follows the mood.
pub fn face<R: Rng + ?Sized>(happy: bool, width: u32, height: u32, rng: &mut R) -> Raster {
    let (background, skin) = if happy {
        (
            Pixel::new(rng.gen_range(200..=255), rng.gen_range(180..=255), rng.gen_range(100..=200)),
            LIGHT_SKIN,
        )
    } else {
        (
            Pixel::new(rng.gen_range(90..=130), rng.gen_range(90..=130), rng.gen_range(140..=170)),
            SHADOWED_SKIN,
        )
    };

    let mut raster = Raster::filled(width, height, background);
    let (w, h) = (width as f64, height as f64);
    let (cx, cy) = (w / 2.0, h / 2.0);

    // Head with a thin dark outline.
    let (head_rx, head_ry) = (w * 0.35, h * 0.35);
    fill_ellipse(&mut raster, cx, cy, head_rx, head_ry, skin);
    ring(&mut raster, cx, cy, head_rx, head_ry, 2.0, BLACK);

    let eye_r = (w.min(h) * 0.0375).max(1.0);
    fill_ellipse(&mut raster, w / 3.0, h / 3.0, eye_r, eye_r, BLACK);
    fill_ellipse(&mut raster, 2.0 * w / 3.0, h / 3.0, eye_r, eye_r, BLACK);

    let (mouth_rx, mouth_ry) = (w * 0.15, h * 0.075);
    let mouth_y = 2.0 * h / 3.0;
    if happy {
        arc(&mut raster, cx, mouth_y, mouth_rx, mouth_ry, 3.0, ArcHalf::Lower, BLACK);
    } else {
        arc(&mut raster, cx, mouth_y + mouth_ry, mouth_rx, mouth_ry, 3.0, ArcHalf::Upper, BLACK);
    }

    raster
}

/// A simplified crest in the club's colours.
pub fn crest(club: Club, width: u32, height: u32) -> Raster {
    match club {
        Club::Flamengo => {
            // Red field, every third horizontal band black.
            let mut raster = Raster::filled(width, height, RED);
            let band = (height / 20).max(1);
            for y in 0..height {
                if (y / band) % 3 == 1 {
                    fill_rect(&mut raster, 0, y, width, y + 1, BLACK);
                }
            }
            raster
        }
        Club::Palmeiras => {
            let mut raster = Raster::filled(width, height, GREEN);
            let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
            let outer = width.min(height) as f64 * 0.25;
            ring(&mut raster, cx, cy, outer, outer, 5.0, WHITE);
            let inner = width.min(height) as f64 * 0.1;
            fill_ellipse(&mut raster, cx, cy, inner, inner, WHITE);
            raster
        }
        Club::Corinthians => {
            // One-pixel black and white pinstripes keep the left-neighbour deltas high.
            let mut raster = Raster::filled(width, height, WHITE);
            for x in (0..width).step_by(2) {
                fill_rect(&mut raster, x, 0, x + 1, height, BLACK);
            }
            let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
            let radius = width.min(height) as f64 * 0.25;
            ring(&mut raster, cx, cy, radius, radius, 3.0, GRAY);
            raster
        }
        Club::Santos => {
            let mut raster = Raster::filled(width, height, WHITE);
            fill_rect(&mut raster, 0, 0, width, height / 3, BLACK);
            fill_rect(&mut raster, 0, 2 * height / 3, width, height, BLACK);
            raster
        }
        Club::SaoPaulo => {
            // Red, white and black bands; red takes 45% so black + white stay under 60%.
            let mut raster = Raster::filled(width, height, BLACK);
            let red_rows = height * 9 / 20;
            let white_rows = (height - red_rows) / 2;
            fill_rect(&mut raster, 0, 0, width, red_rows, RED);
            fill_rect(&mut raster, 0, red_rows, width, red_rows + white_rows, WHITE);
            raster
        }
        Club::Gremio => {
            // Blue field, every third vertical stripe white.
            let mut raster = Raster::filled(width, height, BLUE);
            let stripe = (width / 8).max(1);
            for x in 0..width {
                if (x / stripe) % 3 == 1 {
                    fill_rect(&mut raster, x, 0, x + 1, height, WHITE);
                }
            }
            raster
        }
        Club::Internacional => framed(width, height, RED, WHITE),
        Club::Vasco | Club::Botafogo => framed(width, height, BLACK, WHITE),
        Club::Fluminense => framed(width, height, MAROON, GREEN),
    }
}

/// A `frame`-coloured border around a centred `inner` rectangle covering a quarter of the area.
fn framed(width: u32, height: u32, frame: Pixel, inner: Pixel) -> Raster {
    let mut raster = Raster::filled(width, height, frame);
    fill_rect(&mut raster, width / 4, height / 4, width - width / 4, height - height / 4, inner);
    raster
}

/// PNG-encodes a raster as 8-bit RGB.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
    encoder.write_image(
        &raster.to_rgb_bytes(),
        raster.width,
        raster.height,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buffer)
}

pub fn save_png(path: &Path, raster: &Raster) -> Result<()> {
    let bytes = encode_png(raster)?;
    std::fs::write(path, bytes).map_err(|e| VisionError::io(format!("writing {}", path.display()), e))
}

/// Four happy and four sad faces, PNG-encoded, named after their mood.
pub fn face_set<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> Result<Vec<NamedImage>> {
    let happy = HAPPY_FACE_NAMES.iter().map(|name| (*name, true));
    let sad = SAD_FACE_NAMES.iter().map(|name| (*name, false));

    happy
        .chain(sad)
        .map(|(name, is_happy)| {
            Ok(NamedImage {
                filename: format!("{name}.png"),
                bytes: encode_png(&face(is_happy, width, height, &mut *rng))?,
            })
        })
        .collect()
}

/// Two PNG crests per club of `CREST_ROSTER`.
pub fn crest_set(width: u32, height: u32) -> Result<Vec<NamedImage>> {
    let mut images = Vec::with_capacity(CREST_ROSTER.len() * 2);
    for club in CREST_ROSTER {
        let bytes = encode_png(&crest(club, width, height))?;
        for index in 1..=2 {
            images.push(NamedImage {
                filename: format!("logo_{}_{index}.png", club.code()),
                bytes: bytes.clone(),
            });
        }
    }
    Ok(images)
}

/// Writes `faces/` and `teams/` under `dir`; returns how many of each were written.
pub fn write_test_set<R: Rng + ?Sized>(dir: &Path, rng: &mut R) -> Result<(usize, usize)> {
    let faces = face_set(DEFAULT_SIZE, DEFAULT_SIZE, rng)?;
    let crests = crest_set(DEFAULT_SIZE, DEFAULT_SIZE)?;

    for (subdir, images) in [("faces", &faces), ("teams", &crests)] {
        let target = dir.join(subdir);
        std::fs::create_dir_all(&target)
            .map_err(|e| VisionError::io(format!("creating {}", target.display()), e))?;
        for image in images {
            let path = target.join(&image.filename);
            std::fs::write(&path, &image.bytes)
                .map_err(|e| VisionError::io(format!("writing {}", path.display()), e))?;
        }
    }

    Ok((faces.len(), crests.len()))
}

/// ====Drawing====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArcHalf {
    Upper,
    Lower,
}

/// Fills `[x0, x1) x [y0, y1)`, clipped to the raster.
fn fill_rect(raster: &mut Raster, x0: u32, y0: u32, x1: u32, y1: u32, color: Pixel) {
    for y in y0..y1.min(raster.height) {
        for x in x0..x1.min(raster.width) {
            raster.set_pixel(x, y, color);
        }
    }
}

/// Calls `paint` with every pixel whose centre lies in the ellipse's bounding box
/// (grown by `margin`), plus the normalized radial distance of that centre.
fn for_each_near_ellipse(
    raster: &mut Raster,
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    margin: f64,
    mut paint: impl FnMut(&mut Raster, u32, u32, f64, f64),
) {
    if raster.is_empty() || rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let x_start = (cx - rx - margin).floor().max(0.0) as u32;
    let y_start = (cy - ry - margin).floor().max(0.0) as u32;
    let x_end = ((cx + rx + margin).ceil().max(0.0) as u32).min(raster.width);
    let y_end = ((cy + ry + margin).ceil().max(0.0) as u32).min(raster.height);

    for y in y_start..y_end {
        for x in x_start..x_end {
            let dx = (x as f64 + 0.5 - cx) / rx;
            let dy = y as f64 + 0.5 - cy;
            let distance = (dx * dx + (dy / ry) * (dy / ry)).sqrt();
            paint(raster, x, y, distance, dy);
        }
    }
}

fn fill_ellipse(raster: &mut Raster, cx: f64, cy: f64, rx: f64, ry: f64, color: Pixel) {
    for_each_near_ellipse(raster, cx, cy, rx, ry, 0.0, |raster, x, y, distance, _| {
        if distance <= 1.0 {
            raster.set_pixel(x, y, color);
        }
    });
}

fn ring(raster: &mut Raster, cx: f64, cy: f64, rx: f64, ry: f64, thickness: f64, color: Pixel) {
    let scale = rx.min(ry);
    for_each_near_ellipse(raster, cx, cy, rx, ry, thickness, |raster, x, y, distance, _| {
        if ((distance - 1.0) * scale).abs() <= thickness / 2.0 {
            raster.set_pixel(x, y, color);
        }
    });
}

fn arc(raster: &mut Raster, cx: f64, cy: f64, rx: f64, ry: f64, thickness: f64, half: ArcHalf, color: Pixel) {
    let scale = rx.min(ry);
    for_each_near_ellipse(raster, cx, cy, rx, ry, thickness, |raster, x, y, distance, dy| {
        let in_half = match half {
            ArcHalf::Lower => dy >= 0.0,
            ArcHalf::Upper => dy <= 0.0,
        };
        if in_half && ((distance - 1.0) * scale).abs() <= thickness / 2.0 {
            raster.set_pixel(x, y, color);
        }
    });
}

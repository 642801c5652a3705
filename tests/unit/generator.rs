use super::*;

use std::io::Cursor;

use image::{Rgba, RgbaImage};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "epigram_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn system_font() -> Option<PathBuf> {
    let roots = [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ];
    fn walk(dir: &Path, found: &mut Option<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            if found.is_some() {
                return;
            }
            let path = entry.path();
            if path.is_dir() {
                walk(&path, found);
            } else {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_ascii_lowercase());
                if matches!(ext.as_deref(), Some("ttf" | "otf"))
                    && FontData::load(&path).is_ok()
                {
                    *found = Some(path);
                }
            }
        }
    }
    let mut found = None;
    for root in roots {
        walk(Path::new(root), &mut found);
        if found.is_some() {
            break;
        }
    }
    found
}

fn write_fixture_background(dir: &Path, name: &str) {
    let img = RgbaImage::from_fn(64, 48, |x, y| {
        Rgba([(x * 4) as u8, (y * 5) as u8, 160, 255])
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join(name), &buf).unwrap();
}

/// Asset fixture: one background always, plus a copy of a system font when
/// one exists.
struct Fixture {
    fonts_dir: PathBuf,
    backgrounds_dir: PathBuf,
    has_font: bool,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let fonts_dir = temp_dir(&format!("{name}_fonts"));
        let backgrounds_dir = temp_dir(&format!("{name}_bgs"));
        write_fixture_background(&backgrounds_dir, "bg.png");
        let has_font = match system_font() {
            Some(path) => {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("ttf");
                std::fs::copy(&path, fonts_dir.join(format!("fixture.{ext}"))).is_ok()
            }
            None => false,
        };
        Self {
            fonts_dir,
            backgrounds_dir,
            has_font,
        }
    }

    fn generator(&self) -> Generator {
        Generator::new(GeneratorOptions::new(&self.fonts_dir, &self.backgrounds_dir)).unwrap()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.fonts_dir).ok();
        std::fs::remove_dir_all(&self.backgrounds_dir).ok();
    }
}

#[test]
fn create_returns_exactly_the_requested_size() {
    let fixture = Fixture::new("create_size");
    if !fixture.has_font {
        eprintln!("skipping: no system font found");
        return;
    }
    let generator = fixture.generator();
    let request = QuoteRequest::new("Hello world").author("Ada").size(800, 400);
    let image = generator.create(&request).unwrap();
    assert_eq!(image.dimensions(), (800, 400));
}

#[test]
fn modern_style_masks_corners_and_bold_does_not() {
    let fixture = Fixture::new("corners");
    if !fixture.has_font {
        eprintln!("skipping: no system font found");
        return;
    }
    let generator = fixture.generator();

    let rounded = generator
        .create(&QuoteRequest::new("Corners").size(400, 200))
        .unwrap();
    assert_eq!(rounded.get_pixel(0, 0).0[3], 0);
    assert_eq!(rounded.get_pixel(200, 100).0[3], 255);

    let square = generator
        .create(&QuoteRequest::new("Corners").size(400, 200).style("bold"))
        .unwrap();
    assert_eq!(square.get_pixel(0, 0).0[3], 255);
}

#[test]
fn empty_background_directory_fails_with_asset_not_found() {
    let fixture = Fixture::new("no_bgs");
    if !fixture.has_font {
        eprintln!("skipping: no system font found");
        return;
    }
    std::fs::remove_file(fixture.backgrounds_dir.join("bg.png")).unwrap();
    let generator = fixture.generator();
    let err = generator
        .create(&QuoteRequest::new("No backgrounds").size(320, 240))
        .unwrap_err();
    assert!(matches!(err, EpigramError::AssetNotFound(_)));
}

#[test]
fn empty_font_directory_fails_with_asset_not_found() {
    let fixture = Fixture::new("no_fonts");
    // Deliberately no font in the fixture's font dir.
    std::fs::remove_dir_all(&fixture.fonts_dir).ok();
    std::fs::create_dir_all(&fixture.fonts_dir).ok();
    let generator = fixture.generator();
    let err = generator
        .create(&QuoteRequest::new("No fonts").size(320, 240))
        .unwrap_err();
    assert!(matches!(err, EpigramError::AssetNotFound(_)));
}

#[test]
fn degenerate_requests_are_layout_errors() {
    let fixture = Fixture::new("degenerate");
    let generator = fixture.generator();

    assert!(matches!(
        generator.create(&QuoteRequest::new("   ")),
        Err(EpigramError::Layout(_))
    ));
    assert!(matches!(
        generator.create(&QuoteRequest::new("fine").size(0, 100)),
        Err(EpigramError::Layout(_))
    ));
    assert!(matches!(
        generator.create(&QuoteRequest::new("fine").size(100, 0)),
        Err(EpigramError::Layout(_))
    ));
}

#[test]
fn explicit_background_and_font_skip_the_random_pick() {
    let fixture = Fixture::new("explicit");
    if !fixture.has_font {
        eprintln!("skipping: no system font found");
        return;
    }
    // Point the generator at empty dirs; explicit paths must still work.
    let empty_fonts = temp_dir("explicit_empty_fonts");
    let empty_bgs = temp_dir("explicit_empty_bgs");
    let generator =
        Generator::new(GeneratorOptions::new(&empty_fonts, &empty_bgs).workers(2)).unwrap();

    let font = std::fs::read_dir(&fixture.fonts_dir)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let request = QuoteRequest::new("Explicit assets")
        .size(320, 240)
        .font_path(font)
        .background(fixture.backgrounds_dir.join("bg.png"));
    let image = generator.create(&request).unwrap();
    assert_eq!(image.dimensions(), (320, 240));

    std::fs::remove_dir_all(&empty_fonts).ok();
    std::fs::remove_dir_all(&empty_bgs).ok();
}

#[test]
fn undecodable_background_is_an_image_load_error() {
    let fixture = Fixture::new("bad_bg");
    if !fixture.has_font {
        eprintln!("skipping: no system font found");
        return;
    }
    let bad = fixture.backgrounds_dir.join("bad.png");
    std::fs::write(&bad, b"not an image at all").unwrap();
    let generator = fixture.generator();
    let err = generator
        .create(
            &QuoteRequest::new("Broken background")
                .size(320, 240)
                .background(bad),
        )
        .unwrap_err();
    assert!(matches!(err, EpigramError::ImageLoad(_)));
}

use image::{Rgb, RgbImage};
use pixel_mosaic::{
    Color, ColorGrid, Error, GridGeometry, PixelateConfig, PixelateOptions, Shape, pixelate_bytes, reduce, run,
    sample,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const RED: Color = Color::new(255, 0, 0);

fn save_png(img: &RgbImage, name: &str, dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

#[test]
fn solid_red_end_to_end() {
    let img = RgbImage::from_pixel(100, 100, Rgb([255, 0, 0]));
    let grid = sample(&img, &GridGeometry::rectangular(10), 0.8, 20).unwrap();
    assert_eq!(grid, ColorGrid::new(10, 10, vec![RED; 100]).unwrap());

    let reduced = reduce(grid.clone(), 1).unwrap();
    assert_eq!(reduced, grid);
}

#[test]
fn run_writes_output_file() {
    let dir = tempdir().unwrap();
    let img = RgbImage::from_fn(60, 30, |x, _| if x < 30 { Rgb([0, 200, 0]) } else { Rgb([0, 0, 200]) });
    let input = save_png(&img, "in.png", dir.path());
    let output = dir.path().join("out.png");

    let config = PixelateConfig::new(&input, &output, PixelateOptions::new(GridGeometry::rectangular(6)));
    let report = run(&config).unwrap();

    assert_eq!(report.input_size, (60, 30));
    assert_eq!(report.grid_size, (3, 6));
    assert_eq!(report.output_size, (66, 33));
    assert_eq!(report.palette, vec![Color::new(0, 200, 0), Color::new(0, 0, 200)]);

    let written = image::open(&output).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (66, 33));
    assert_eq!(*written.get_pixel(0, 0), Rgb([0, 200, 0]));
    assert_eq!(*written.get_pixel(10, 0), Rgb([255, 255, 255]));
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[test]
fn run_with_reduction_and_circles() {
    let dir = tempdir().unwrap();
    let img = RgbImage::from_fn(80, 80, |x, y| Rgb([(x * 3) as u8, (y * 3) as u8, 90]));
    let input = save_png(&img, "gradient.png", dir.path());
    let output = dir.path().join("dots.png");

    let mut options = PixelateOptions::new(GridGeometry::staggered(8));
    options.num_colors = Some(3);
    options.seed = 11;
    assert_eq!(options.shape, Shape::Circles);

    let report = run(&PixelateConfig::new(&input, &output, options.clone())).unwrap();
    assert!(report.palette.len() <= 3);
    // 10px cells, 9px rows
    assert_eq!(report.grid_size, (8, 8));
    assert!(output.exists());

    let again = dir.path().join("dots_again.png");
    let second = run(&PixelateConfig::new(&input, &again, options)).unwrap();
    assert_eq!(second.palette, report.palette);
}

#[test]
fn missing_input_leaves_no_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.png");
    let config = PixelateConfig::new(
        dir.path().join("missing.png"),
        &output,
        PixelateOptions::new(GridGeometry::rectangular(10)),
    );
    let err = run(&config).unwrap_err();
    assert!(matches!(err, Error::InputNotFound { .. }));
    assert!(!output.exists());
}

#[test]
fn bad_geometry_leaves_no_output() {
    let dir = tempdir().unwrap();
    let input = save_png(&RgbImage::from_pixel(10, 10, Rgb([5, 5, 5])), "small.png", dir.path());
    let output = dir.path().join("out.png");
    let config = PixelateConfig::new(&input, &output, PixelateOptions::new(GridGeometry::rectangular(50)));
    assert!(run(&config).unwrap_err().is_configuration());
    assert!(!output.exists());
}

#[test]
fn corrupt_input_is_a_decode_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.png");
    std::fs::write(&input, b"\x89PNG but not really").unwrap();
    let output = dir.path().join("out.png");
    let config = PixelateConfig::new(&input, &output, PixelateOptions::new(GridGeometry::rectangular(10)));
    assert!(matches!(run(&config), Err(Error::Decode { .. })));
    assert!(!output.exists());
}

#[test]
fn unknown_output_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let input = save_png(&RgbImage::from_pixel(20, 20, Rgb([5, 5, 5])), "in.png", dir.path());
    let output = dir.path().join("out.unknownext");
    let config = PixelateConfig::new(&input, &output, PixelateOptions::new(GridGeometry::rectangular(4)));
    assert!(run(&config).unwrap_err().is_configuration());
    assert!(!output.exists());
}

#[test]
fn bytes_round_trip_returns_png_and_palette() {
    let img = RgbImage::from_pixel(30, 30, Rgb([0x12, 0x34, 0x56]));
    let mut encoded = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageFormat::Png).unwrap();

    let (png, palette) = pixelate_bytes(&encoded, &PixelateOptions::new(GridGeometry::rectangular(3))).unwrap();
    assert_eq!(palette, vec!["123456".to_string()]);
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (33, 33));
}

//! End-to-end iteration tests against generated directories

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage, Rgba, RgbaImage};

use stapel::errors::StapelError;
use stapel::listing::{scan_directories, SortOrder};
use stapel::provider::{Provider, SkipDecodeFailures};
use stapel::provider_directory::{select_image, DirectoryProvider};
use stapel::tensor::mask_to_tensor;

fn write_rgb(path: &Path) {
    RgbImage::from_fn(4, 4, |x, y| Rgb([(x * 10) as u8, (y * 10) as u8, 200]))
        .save(path)
        .unwrap();
}

fn write_rgba(path: &Path, alpha: u8) {
    RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, alpha]))
        .save(path)
        .unwrap();
}

#[test]
fn wrap_visits_each_file_exactly_twice() {
    let dir = tempfile::tempdir().unwrap();
    for name in &["img1.png", "img2.png", "img10.png"] {
        write_rgb(&dir.path().join(name));
    }
    let dirs = vec![dir.path().to_path_buf()];

    let mut seen = Vec::new();
    for cursor in 0..6 {
        let loaded = select_image(&dirs, cursor, true, SortOrder::Filename)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.next_cursor, cursor + 1);
        assert_eq!(loaded.file_count, 3);
        seen.push(loaded.entry.file_name);
    }
    assert_eq!(
        seen,
        vec!["img1.png", "img2.png", "img10.png", "img1.png", "img2.png", "img10.png"]
    );
}

#[test]
fn empty_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "no images here").unwrap();

    let err = select_image(&[dir.path().to_path_buf()], 0, true, SortOrder::Filename).unwrap_err();
    assert!(matches!(err, StapelError::EmptyDirectory));
}

#[test]
fn missing_directory_fails() {
    let missing = PathBuf::from("/no/such/directory");
    let err = select_image(&[missing], 0, false, SortOrder::Filename).unwrap_err();
    assert!(matches!(err, StapelError::DirectoryNotFound(_)));
}

#[test]
fn corrupt_file_is_a_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    write_rgb(&dir.path().join("a.png"));
    fs::write(dir.path().join("b.png"), b"definitely not a png").unwrap();
    let dirs = vec![dir.path().to_path_buf()];

    let loaded = select_image(&dirs, 0, false, SortOrder::Filename)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.entry.file_name, "a.png");

    let err = select_image(&dirs, 1, false, SortOrder::Filename).unwrap_err();
    assert!(matches!(err, StapelError::DecodeFailure(_)));
}

#[test]
fn exhaustion_is_terminal_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_rgb(&dir.path().join("a.png"));
    write_rgb(&dir.path().join("b.png"));
    let dirs = vec![dir.path().to_path_buf()];

    assert!(select_image(&dirs, 2, false, SortOrder::Filename)
        .unwrap()
        .is_none());
    assert!(select_image(&dirs, 7, false, SortOrder::Filename)
        .unwrap()
        .is_none());
}

#[test]
fn same_cursor_yields_same_file() {
    let dir = tempfile::tempdir().unwrap();
    for name in &["x.png", "y.png", "z.png"] {
        write_rgb(&dir.path().join(name));
    }
    let dirs = vec![dir.path().to_path_buf()];

    let first = select_image(&dirs, 1, false, SortOrder::Filename)
        .unwrap()
        .unwrap();
    let second = select_image(&dirs, 1, false, SortOrder::Filename)
        .unwrap()
        .unwrap();
    assert_eq!(first.entry.file_name, second.entry.file_name);
}

#[test]
fn listing_merges_multiple_directories() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    write_rgb(&dir_a.path().join("b.png"));
    write_rgb(&dir_b.path().join("a.png"));
    let dirs = vec![dir_a.path().to_path_buf(), dir_b.path().to_path_buf()];

    let entries = scan_directories(&dirs, SortOrder::Filename).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.file_name.as_str()).collect();
    assert_eq!(names, vec!["a.png", "b.png"]);
}

#[test]
fn alpha_channel_becomes_an_inverted_mask() {
    let dir = tempfile::tempdir().unwrap();
    write_rgba(&dir.path().join("t.png"), 0);
    let dirs = vec![dir.path().to_path_buf()];

    let loaded = select_image(&dirs, 0, false, SortOrder::Filename)
        .unwrap()
        .unwrap();
    let mask = loaded.mask.expect("alpha png should produce a mask");
    let tensor = mask_to_tensor(Some(&mask));
    assert_eq!((tensor.width, tensor.height), (4, 4));
    assert!(tensor.data.iter().all(|&v| (v - 1.0).abs() < 1e-6));
}

#[test]
fn opaque_image_has_no_mask() {
    let dir = tempfile::tempdir().unwrap();
    write_rgb(&dir.path().join("plain.bmp"));
    let dirs = vec![dir.path().to_path_buf()];

    let loaded = select_image(&dirs, 0, false, SortOrder::Filename)
        .unwrap()
        .unwrap();
    assert!(loaded.mask.is_none());
    let tensor = mask_to_tensor(loaded.mask.as_ref());
    assert_eq!((tensor.width, tensor.height), (64, 64));
    assert!(tensor.data.iter().all(|&v| v == 0.0));
}

#[test]
fn jpeg_files_decode() {
    let dir = tempfile::tempdir().unwrap();
    write_rgb(&dir.path().join("photo.jpg"));
    let dirs = vec![dir.path().to_path_buf()];

    let loaded = select_image(&dirs, 0, false, SortOrder::Filename)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.entry.file_name, "photo.jpg");
    assert_eq!(loaded.image.to_rgb8().dimensions(), (4, 4));
}

#[test]
fn provider_advances_past_a_failed_file() {
    let dir = tempfile::tempdir().unwrap();
    write_rgb(&dir.path().join("a.png"));
    fs::write(dir.path().join("b.png"), b"broken").unwrap();
    write_rgb(&dir.path().join("c.png"));
    let dirs = vec![dir.path().to_path_buf()];

    let mut provider = DirectoryProvider::new(dirs, SortOrder::Filename, false);
    assert_eq!(
        provider.next_image().unwrap().unwrap().entry.file_name,
        "a.png"
    );
    assert_eq!(provider.cursor(), 1);
    assert!(matches!(
        provider.next_image().unwrap_err(),
        StapelError::DecodeFailure(_)
    ));
    assert_eq!(provider.cursor(), 2);
    assert_eq!(
        provider.next_image().unwrap().unwrap().entry.file_name,
        "c.png"
    );
    assert!(provider.next_image().unwrap().is_none());
}

#[test]
fn skip_decorator_swallows_decode_failures() {
    let dir = tempfile::tempdir().unwrap();
    write_rgb(&dir.path().join("a.png"));
    fs::write(dir.path().join("b.png"), b"broken").unwrap();
    write_rgb(&dir.path().join("c.png"));
    let dirs = vec![dir.path().to_path_buf()];

    let mut provider =
        SkipDecodeFailures::new(DirectoryProvider::new(dirs, SortOrder::Filename, false), 3);
    let mut names = Vec::new();
    while let Some(loaded) = provider.next_image().unwrap() {
        names.push(loaded.entry.file_name);
    }
    assert_eq!(names, vec!["a.png", "c.png"]);
}

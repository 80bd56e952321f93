use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{App, Arg};
use image::GenericImageView;

use stapel::config::Settings;
use stapel::errors::StapelResult;
use stapel::listing::{scan_directories, SortOrder};
use stapel::provider::{Provider, SkipDecodeFailures};
use stapel::provider_directory::{select_image, DirectoryProvider};
use stapel::tensor::{image_to_tensor, mask_to_tensor};

fn main() -> StapelResult<()> {
    env_logger::init();
    let matches = App::new("Stapel")
        .about("Selects and loads images from directories for batch workflows")
        .arg(
            Arg::new("directory")
                .takes_value(true)
                .required(true)
                .index(1)
                .about("Directories to scan, separated by semicolons"),
        )
        .arg(
            Arg::new("index")
                .short('i')
                .long("index")
                .about("Cursor index of the image to load")
                .takes_value(true)
                .validator(|v| usize::from_str(v))
                .default_value("0"),
        )
        .arg(
            Arg::new("wrap")
                .short('w')
                .long("wrap")
                .about("Take the index modulo the listing length"),
        )
        .arg(
            Arg::new("sort_by")
                .long("sort-by")
                .about("Listing order")
                .takes_value(true)
                .possible_values(&[
                    "filename",
                    "date-newest-first",
                    "date-oldest-first",
                    "file-size",
                ]),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .about("Write the decoded image to this path")
                .takes_value(true),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .about("Print the sorted file listing and exit"),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .about("Load every image from the index on and report failures"),
        )
        .arg(
            Arg::new("skip_errors")
                .long("skip-errors")
                .about("Keep going past files that fail to decode"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .takes_value(true)
                .validator(|f| std::fs::File::open(f)),
        )
        .get_matches();

    let settings = Settings::load(matches.value_of("config").map(Path::new))
        .expect("Failed to read configuration");

    let dirs: Vec<PathBuf> = matches
        .value_of("directory")
        .expect("Directory missing")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect();

    let sort_by = matches
        .value_of("sort_by")
        .map(str::to_string)
        .or(settings.sort_by)
        .map(|s| SortOrder::from_str(&s).expect("Unknown sort order"))
        .unwrap_or_default();
    let wrap = matches.is_present("wrap") || settings.wrap.unwrap_or(false);
    let skip_errors = matches.is_present("skip_errors") || settings.skip_errors.unwrap_or(false);
    let cursor: usize = matches
        .value_of("index")
        .expect("Index missing")
        .parse()
        .expect("Index must be a non-negative integer");

    if matches.is_present("list") {
        for entry in scan_directories(&dirs, sort_by)? {
            let modified: chrono::DateTime<chrono::Local> = entry.modified.into();
            println!(
                "{}  {:>10}  {}",
                modified.format("%Y-%m-%d %H:%M:%S"),
                entry.size,
                entry.path.display()
            );
        }
        return Ok(());
    }

    if matches.is_present("all") {
        // Exhaustion is the stop condition here, so wrap stays off.
        let listing_len = scan_directories(&dirs, sort_by)?.len();
        let provider = DirectoryProvider::new(dirs, sort_by, false).with_cursor(cursor);
        let mut provider: Box<dyn Provider> = if skip_errors {
            Box::new(SkipDecodeFailures::new(provider, listing_len))
        } else {
            Box::new(provider)
        };
        let mut count = 0;
        while let Some(loaded) = provider.next_image()? {
            println!(
                "{}  {}x{}{}",
                loaded.entry.path.display(),
                loaded.image.width(),
                loaded.image.height(),
                if loaded.mask.is_some() { "  +mask" } else { "" }
            );
            count += 1;
        }
        println!("Loaded {} images", count);
        return Ok(());
    }

    match select_image(&dirs, cursor, wrap, sort_by)? {
        Some(loaded) => {
            let tensor = image_to_tensor(&loaded.image);
            let mask = mask_to_tensor(loaded.mask.as_ref());
            println!("File:   {}", loaded.entry.path.display());
            println!(
                "Name:   {} ({})",
                loaded.entry.file_name,
                loaded.entry.file_stem()
            );
            println!("Files:  {}", loaded.file_count);
            println!("Next:   {}", loaded.next_cursor);
            println!("Image:  {}x{}x3", tensor.width, tensor.height);
            println!("Mask:   {}x{}", mask.width, mask.height);
            if let Some(output) = matches.value_of("output") {
                loaded.image.save(output).expect("Failed to write output");
            }
        }
        None => println!("No more images"),
    }
    Ok(())
}

// Galleria CLI binary

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use galleria_lib::capture::{
    CameraDevice, CameraFacing, CaptureCoordinator, CaptureOutcome, FsRelocator, LocationProvider, Permission,
    TransientImage,
};
use galleria_lib::constants::{GALLERIA_FOLDER, MSG_CAPTURE_FAILED};
use galleria_lib::db::init_library_folders;
use galleria_lib::gallery::{Gallery, NoticeLevel, ScrollCommand};
use galleria_lib::presentation::ImageInfo;
use galleria_lib::settings::{default_library_root, Settings};
use galleria_lib::{open_library, GalleriaError, GeoFix, ImageRepository};

const DEFAULT_PAGE_WIDTH: f64 = 400.0;

#[derive(Parser)]
#[command(name = "galleria")]
#[command(about = "Galleria - a local photo gallery", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new library
    Init {
        /// Library root path (defaults to the pictures folder)
        path: Option<PathBuf>,
    },

    /// Add a photo as if taken by the camera
    Capture {
        /// Image file to capture (copied, the original is left in place)
        file: PathBuf,
        /// Latitude of the location fix
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude of the location fix
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        album: Option<String>,
        /// Shoot with the front camera
        #[arg(long)]
        front: bool,
        /// Library root (defaults to current directory)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },

    /// Show the gallery grid
    List {
        /// Only this album
        #[arg(long)]
        album: Option<String>,
        /// Library root (defaults to current directory)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },

    /// Show photo details
    Show {
        /// Image ID
        id: i64,
        /// Library root (defaults to current directory)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },

    /// Delete a photo
    Delete {
        /// Image ID
        id: i64,
        /// Library root (defaults to current directory)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },

    /// Point a photo at a different file
    SetUri {
        /// Image ID
        id: i64,
        uri: String,
        /// Library root (defaults to current directory)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },

    /// Toggle the favorite flag
    Favorite {
        /// Image ID
        id: i64,
        /// Library root (defaults to current directory)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },

    /// List albums
    Albums {
        /// Library root (defaults to current directory)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },

    /// Open the viewer at a grid position and replay actions
    View {
        /// Grid position (0-based)
        index: usize,
        /// next, prev, delete, favorite, info, map, close, swipe:<offset>
        actions: Vec<String>,
        /// Page width used for swipe offsets
        #[arg(long, default_value_t = DEFAULT_PAGE_WIDTH)]
        page_width: f64,
        /// Library root (defaults to current directory)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => cmd_init(path),
        Commands::Capture { file, lat, lon, tag, album, front, library } => {
            let fix = lat.zip(lon).map(|(latitude, longitude)| GeoFix { latitude, longitude });
            cmd_capture(file, fix, tag, album, front, library)
        }
        Commands::List { album, library } => cmd_list(album, library),
        Commands::Show { id, library } => cmd_show(id, library),
        Commands::Delete { id, library } => cmd_delete(id, library),
        Commands::SetUri { id, uri, library } => cmd_set_uri(id, uri, library),
        Commands::Favorite { id, library } => cmd_favorite(id, library),
        Commands::Albums { library } => cmd_albums(library),
        Commands::View { index, actions, page_width, library } => {
            cmd_view(index, actions, page_width, library)
        }
    }
}

fn cmd_init(path: Option<PathBuf>) -> Result<()> {
    let library_root = match path {
        Some(path) => path,
        None => default_library_root()?,
    };

    if library_root.join(GALLERIA_FOLDER).exists() {
        anyhow::bail!("Library already exists at {}", library_root.display());
    }

    init_library_folders(&library_root)?;
    let library_root = library_root.canonicalize().unwrap_or(library_root);

    let settings = Settings::default();
    settings.save(&library_root)?;
    open_library(&library_root)?;

    println!("Initialized library at {}", library_root.display());
    println!("Structure created:");
    println!("  .galleria/{}   - Database", settings.db_filename);
    println!("  .galleria/settings.json - Settings");
    println!("  photos/                 - Captured photos");

    Ok(())
}

/// Stand-in camera: "takes" a photo by copying a file into the cache folder.
struct FileCamera {
    source: PathBuf,
    cache_dir: PathBuf,
}

impl CameraDevice for FileCamera {
    fn request_permission(&mut self) -> Permission {
        if self.source.is_file() {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    fn capture(&mut self, facing: CameraFacing) -> galleria_lib::Result<TransientImage> {
        log::debug!("Capturing {} ({:?} camera)", self.source.display(), facing);
        let filename = self
            .source
            .file_name()
            .ok_or_else(|| GalleriaError::InvalidPath("No filename".to_string()))?;
        std::fs::create_dir_all(&self.cache_dir)?;
        let transient = self.cache_dir.join(filename);
        std::fs::copy(&self.source, &transient)
            .map_err(|e| GalleriaError::Capture(format!("{}: {}", self.source.display(), e)))?;
        Ok(TransientImage { uri: transient.to_string_lossy().to_string() })
    }
}

/// Location fix given on the command line.
struct FixedLocation(Option<GeoFix>);

impl LocationProvider for FixedLocation {
    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn current_fix(&mut self) -> Option<GeoFix> {
        self.0
    }
}

fn cmd_capture(
    file: PathBuf,
    fix: Option<GeoFix>,
    tag: Option<String>,
    album: Option<String>,
    front: bool,
    library: Option<PathBuf>,
) -> Result<()> {
    let library_root = resolve_library_root(library)?;
    let (store, settings) = open_library(&library_root)?;

    let camera = FileCamera {
        source: file.clone(),
        cache_dir: library_root.join(GALLERIA_FOLDER).join("cache"),
    };
    let relocator = FsRelocator::new(settings.photos_dir(&library_root))
        .organize_by_date(settings.organize_by_date);

    let mut coordinator = CaptureCoordinator::new(camera, FixedLocation(fix), relocator)
        .missing_location(settings.missing_location);
    coordinator.set_labels(tag, album);
    if front {
        coordinator.toggle_facing();
    }

    if coordinator.activate() != Permission::Granted {
        eprintln!("Error: {}", MSG_CAPTURE_FAILED);
        anyhow::bail!("Cannot read {}", file.display());
    }

    let outcome = coordinator.capture(&store).map_err(|e| {
        if e.is_capture_failure() {
            eprintln!("Error: {}", MSG_CAPTURE_FAILED);
        }
        e
    })?;

    match outcome {
        CaptureOutcome::Saved(event) => {
            println!("Captured image {} -> {}", event.id, event.uri);
            if fix.is_none() {
                println!("No location given; saved without coordinates.");
            }
        }
        CaptureOutcome::Skipped => {
            println!("No location given; capture skipped (missingLocation = skip).");
        }
    }

    Ok(())
}

fn cmd_list(album: Option<String>, library: Option<PathBuf>) -> Result<()> {
    let library_root = resolve_library_root(library)?;
    let (store, settings) = open_library(&library_root)?;

    let mut gallery = Gallery::new(store);
    match album.as_deref() {
        Some(album) => gallery.load_album(album),
        None => gallery.load(),
    };
    print_notices(&mut gallery);

    let grid = gallery.grid(settings.grid_columns);
    if let Some(message) = grid.empty_message {
        println!("{}", message);
        println!("Use 'galleria capture <file>' to add photos.");
        return Ok(());
    }

    println!("{:>5}  {:>5}  {:>3}  {:<32}  {}", "Index", "ID", "Fav", "Name", "URI");
    println!("{}", "-".repeat(80));

    for cell in grid.rows.iter().flatten() {
        let name = gallery
            .collection()
            .get_by_id(cell.id)
            .and_then(|record| record.name.as_deref())
            .unwrap_or("-");
        println!("{:>5}  {:>5}  {:>3}  {:<32}  {}",
            cell.index,
            cell.id,
            if cell.is_favorite { "*" } else { "" },
            truncate(name, 32),
            cell.uri
        );
    }

    println!();
    println!("{} photos in {} rows of {}", gallery.len(), grid.rows.len(), grid.columns);

    Ok(())
}

fn cmd_show(id: i64, library: Option<PathBuf>) -> Result<()> {
    let library_root = resolve_library_root(library)?;
    let (store, _) = open_library(&library_root)?;

    let record = store
        .fetch_by_id(id)?
        .ok_or(GalleriaError::ImageNotFound(id))?;

    println!("Image #{}", record.id);
    println!();
    print_info(&ImageInfo::from(&record));

    Ok(())
}

fn cmd_delete(id: i64, library: Option<PathBuf>) -> Result<()> {
    let library_root = resolve_library_root(library)?;
    let (store, _) = open_library(&library_root)?;

    let mut gallery = Gallery::new(store);
    gallery.load();
    gallery.remove(id);
    print_notices(&mut gallery);

    Ok(())
}

fn cmd_set_uri(id: i64, uri: String, library: Option<PathBuf>) -> Result<()> {
    let library_root = resolve_library_root(library)?;
    let (store, _) = open_library(&library_root)?;

    if store.fetch_by_id(id)?.is_none() {
        println!("No image {}; nothing changed.", id);
        return Ok(());
    }
    store.update_uri(id, &uri)?;
    println!("Image {} now points at {}", id, uri);

    Ok(())
}

fn cmd_favorite(id: i64, library: Option<PathBuf>) -> Result<()> {
    let library_root = resolve_library_root(library)?;
    let (store, _) = open_library(&library_root)?;

    let mut gallery = Gallery::new(store);
    gallery.load();
    let index = gallery
        .collection()
        .index_of(id)
        .ok_or(GalleriaError::ImageNotFound(id))?;

    gallery.open_viewer(index);
    if let Some(favorite) = gallery.toggle_favorite_current() {
        println!("Image {} {}", id, if favorite { "added to favorites" } else { "removed from favorites" });
    }
    print_notices(&mut gallery);

    Ok(())
}

fn cmd_albums(library: Option<PathBuf>) -> Result<()> {
    let library_root = resolve_library_root(library)?;
    let (store, _) = open_library(&library_root)?;

    let albums = store.list_albums()?;
    if albums.is_empty() {
        println!("No albums. Use 'galleria capture --album <name>' to file photos.");
        return Ok(());
    }
    for album in albums {
        println!("{}", album);
    }

    Ok(())
}

fn cmd_view(index: usize, actions: Vec<String>, page_width: f64, library: Option<PathBuf>) -> Result<()> {
    let library_root = resolve_library_root(library)?;
    let (store, _) = open_library(&library_root)?;

    let mut gallery = Gallery::new(store);
    gallery.load();
    print_notices(&mut gallery);

    if gallery.is_empty() {
        println!("No photos available.");
        return Ok(());
    }

    gallery.open_viewer(index);
    print_viewer(&mut gallery, &format!("open {}", index));

    for action in &actions {
        match action.as_str() {
            "next" => { gallery.next(); }
            "prev" => { gallery.previous(); }
            "delete" => { gallery.remove_current(); }
            "favorite" => { gallery.toggle_favorite_current(); }
            "close" => gallery.close_viewer(),
            "info" => {
                if let Some(info) = gallery.current_info() {
                    print_info(&info);
                }
                continue;
            }
            "map" => {
                match gallery.current_map_pin() {
                    Some(pin) => println!("  map: {} at ({:.5}, {:.5})", pin.title, pin.latitude, pin.longitude),
                    None => println!("  map: no location for this photo"),
                }
                continue;
            }
            other => match other.strip_prefix("swipe:").and_then(|v| v.parse::<f64>().ok()) {
                Some(offset) => { gallery.scrolled(offset, page_width); }
                None => anyhow::bail!("Unknown viewer action '{}'", other),
            },
        }
        print_viewer(&mut gallery, action);
    }

    Ok(())
}

// --- Helper Functions ---

fn resolve_library_root(library: Option<PathBuf>) -> Result<PathBuf> {
    let path = library.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let path = path.canonicalize().unwrap_or(path);

    if !path.join(GALLERIA_FOLDER).exists() {
        anyhow::bail!(
            "No library found at {}. Use 'galleria init <path>' to create one.",
            path.display()
        );
    }

    Ok(path)
}

fn print_viewer<R: ImageRepository>(gallery: &mut Gallery<R>, action: &str) {
    let position = gallery.position();
    match gallery.current() {
        Some(record) => println!(
            "{:<12} slide {}/{}  id {}  [prev {}] [next {}]  {}",
            action,
            position.slide_number,
            gallery.len(),
            record.id,
            if position.prev_disabled { "off" } else { "on" },
            if position.next_disabled { "off" } else { "on" },
            record.uri
        ),
        None => println!("{:<12} viewer closed", action),
    }

    match gallery.take_scroll() {
        Some(ScrollCommand::ToIndex { index, .. }) => log::debug!("scroll to page {}", index),
        Some(ScrollCommand::ToOffset { offset, .. }) => log::debug!("scroll to offset {}", offset),
        None => {}
    }
    print_notices(gallery);
}

fn print_info(info: &ImageInfo) {
    for (label, value) in info.lines() {
        println!("  {:<11}{}", format!("{}:", label), value);
    }
}

fn print_notices<R: ImageRepository>(gallery: &mut Gallery<R>) {
    for notice in gallery.take_notices() {
        match notice.level {
            NoticeLevel::Success => println!("{}: {}", notice.title, notice.message),
            NoticeLevel::Error => eprintln!("{}: {}", notice.title, notice.message),
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

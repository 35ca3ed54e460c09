//! Element catalogue information tool
//!
//! Opens (building if needed) the binary element catalogues and prints their
//! header and object statistics, or looks up a single object.
//!
//! Usage:
//!   cargo run --bin catalogue_info -- --data-dir DIR [--class comet] [--find Halley]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use skychart::data::download_element_sources;
use skychart::elements::ElementCatalogue;
use skychart::planetlib::titlecase;
use skychart::time::{format_date, jd_now};
use skychart::{CatalogueStore, EngineConfig, ObjectClass};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ClassArg {
    Planet,
    Asteroid,
    Comet,
}

impl From<ClassArg> for ObjectClass {
    fn from(class: ClassArg) -> Self {
        match class {
            ClassArg::Planet => ObjectClass::Planet,
            ClassArg::Asteroid => ObjectClass::Asteroid,
            ClassArg::Comet => ObjectClass::Comet,
        }
    }
}

/// Element catalogue information tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Builds and inspects binary catalogues of orbital elements",
    long_about = None
)]
struct Args {
    /// Engine configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the element sources and catalogues
    #[arg(short = 'D', long)]
    data_dir: Option<PathBuf>,

    /// Only report on this class
    #[arg(long, value_enum)]
    class: Option<ClassArg>,

    /// Rebuild the binary catalogues from their sources
    #[arg(short, long, action = ArgAction::SetTrue)]
    rebuild: bool,

    /// Download the asteroid and comet sources first
    #[arg(long, action = ArgAction::SetTrue)]
    download: bool,

    /// Look up an object by name or number
    #[arg(short, long)]
    find: Option<String>,
}

fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

fn print_statistics(catalogue: &ElementCatalogue) -> Result<()> {
    let header = catalogue.header();
    print_section_header(&format!("{} catalogue", catalogue.class().label()));
    println!("File: {}", catalogue.path().display());
    println!("Created: {} by {} on {}", format_date(header.creation_epoch)?, header.version, header.hostname);
    println!("Objects: {} of {}", header.object_count, header.max_objects);
    println!("Secure orbits: {}", header.secure_count);
    println!("Maximum epochs per object: {}", header.epoch_max_count);

    let counts: Vec<usize> = (0..catalogue.len()).filter_map(|i| catalogue.epoch_count(i)).collect();
    let multi_epoch = counts.iter().filter(|&&n| n > 1).count();
    let total: usize = counts.iter().sum();
    println!("Objects with several epochs: {}", multi_epoch);
    println!("Element records: {}", total);
    Ok(())
}

fn print_object(catalogue: &ElementCatalogue, query: &str) -> Result<bool> {
    let index = match query.parse::<i32>() {
        Ok(number) => catalogue.find_by_number(number),
        Err(_) => catalogue.search_by_name(query),
    };
    let index = match index {
        Some(index) => index,
        None => return Ok(false),
    };

    print_section_header(&format!("{} #{}", catalogue.class().label(), index));
    if let Some(names) = catalogue.names(index) {
        println!("Name: {}", titlecase(&names[0]));
        if !names[1].is_empty() {
            println!("Designation: {}", names[1]);
        }
    }
    println!("Secure orbit: {}", catalogue.is_secure(index).unwrap_or(false));
    for elements in catalogue.elements(index)? {
        println!(
            "  epoch {}  a={:.6} AU  e={:.6}  i={:.4} rad  H={:.2}  G={:.2}",
            format_date(elements.epoch_osculation)?,
            elements.semi_major_axis,
            elements.eccentricity,
            elements.inclination,
            elements.absolute_mag,
            elements.slope_g
        );
    }
    if let Some(fetch) = catalogue.fetch(index, jd_now())? {
        let now = fetch.dominant();
        println!("Elements used now: epoch {}", format_date(now.epoch_osculation)?);
    }
    Ok(true)
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir);
    }
    if args.download {
        download_element_sources(&config, false)?;
    }

    let store = CatalogueStore::new(config);
    let classes: Vec<ObjectClass> = match args.class {
        Some(class) => vec![class.into()],
        None => ObjectClass::ALL.to_vec(),
    };

    let mut found = false;
    for class in classes {
        if !store.is_available(class) {
            println!("\nNo {} catalogue or sources in {}", class.label(), store.config().data_dir.display());
            continue;
        }
        let catalogue = if args.rebuild {
            store.rebuild(class)?
        } else {
            store.get_or_init(class)?
        };
        match &args.find {
            Some(query) => found |= print_object(&catalogue, query)?,
            None => print_statistics(&catalogue)?,
        }
    }

    if let Some(query) = &args.find {
        if !found {
            return Err(format!("object {:?} not found", query).into());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

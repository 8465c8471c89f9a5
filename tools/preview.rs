//! Preview a saved level as ASCII.
//!
//! Usage: preview <LEVEL_ID> [--dir <DIR>] [--legend]

use clap::Parser;
use std::path::PathBuf;

use mood_level_engine::core::interpret::Atmosphere;
use mood_level_engine::core::store::LevelStore;
use mood_level_engine::schema::layer::LayerKind;

#[derive(Parser, Debug)]
#[command(name = "preview")]
#[command(about = "Render a saved level in the terminal")]
struct Args {
    /// Level id to load
    level_id: u32,

    /// Root directory the level was saved under
    #[arg(short, long, default_value = "levels")]
    dir: PathBuf,

    /// Print the glyph legend
    #[arg(long)]
    legend: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .init();
    let args = Args::parse();

    let store = LevelStore::new(&args.dir);
    let level = match store.load(args.level_id) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Error loading level {}: {e}", args.level_id);
            std::process::exit(1);
        }
    };

    let atmosphere = Atmosphere::for_emotion(level.emotion);
    println!(
        "Level {}: {} ({}x{}, seed {})",
        args.level_id,
        level.emotion,
        level.width(),
        level.height(),
        level.seed.map_or_else(|| "unknown".to_string(), |s| s.to_string())
    );
    println!("{}", atmosphere.setting);
    println!();
    print!("{}", level.to_ascii());
    println!();

    for kind in LayerKind::ALL.iter().filter(|k| !k.is_placeholder()) {
        let count = level.layer(*kind).count(|t| !t.is_air());
        println!("  {:<10} {count}", kind.file_name());
    }
    match level.validate() {
        Ok(()) => println!("Markers: ok"),
        Err(e) => println!("Markers: {e}"),
    }

    if args.legend {
        println!();
        println!("  #  ground    =  floating platform    o  single block");
        println!("  S  spawn     G  goal    $  coin");
        println!("  T  palm      t  background palm    \"  grass");
    }
}

//! Generate a level from an emotion label or a line of free text and save
//! it as per-layer CSV files.
//!
//! Usage: generate [EMOTION] [--text <TEXT>] [--seed <N>] [--out <DIR>]
//!                 [--level-id <ID>] [--profiles <FILE>] [--goal-policy <P>]

use clap::Parser;
use std::path::PathBuf;

use mood_level_engine::core::interpret::{interpret, KeywordClassifier, TemplateWriter};
use mood_level_engine::core::markers::GoalPolicy;
use mood_level_engine::core::pipeline::LevelGenerator;
use mood_level_engine::core::store::LevelStore;
use mood_level_engine::schema::emotion::Emotion;
use mood_level_engine::schema::layer::LayerKind;

#[derive(Parser, Debug)]
#[command(name = "generate")]
#[command(about = "Generate a mood-driven platformer level")]
struct Args {
    /// Emotion label: joy, fear, anger or neutral (anything else is neutral)
    #[arg(default_value = "neutral")]
    emotion: String,

    /// Classify this text instead of taking an emotion label
    #[arg(short, long)]
    text: Option<String>,

    /// Random seed (a fresh seed is drawn if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output root directory
    #[arg(short, long, default_value = "levels")]
    out: PathBuf,

    /// Level id, used as the directory and file name key
    #[arg(short, long, default_value = "0")]
    level_id: u32,

    /// RON profile overrides
    #[arg(short, long)]
    profiles: Option<PathBuf>,

    /// Goal placement: "supported" or "fixed"
    #[arg(long, default_value = "supported", value_parser = parse_goal_policy)]
    goal_policy: GoalPolicy,

    /// Print the level as ASCII after saving
    #[arg(long)]
    show: bool,
}

fn parse_goal_policy(s: &str) -> Result<GoalPolicy, String> {
    GoalPolicy::from_name(s).ok_or_else(|| format!("unknown goal policy `{s}`"))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
    let args = Args::parse();

    let mut builder = LevelGenerator::builder().goal_policy(args.goal_policy);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if let Some(ref path) = args.profiles {
        builder = builder.profiles_file(path);
    }
    let generator = match builder.build() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error loading profiles: {e}");
            std::process::exit(1);
        }
    };

    let emotion = match args.text {
        Some(ref text) => {
            let reading = interpret(text, &KeywordClassifier::builtin(), &TemplateWriter);
            println!("Mood: {}", reading.emotion);
            println!("Setting: {}", reading.atmosphere.setting);
            println!("{}", reading.narrative);
            reading.emotion
        }
        None => Emotion::parse(&args.emotion),
    };

    let level = match generator.generate(emotion) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Error generating level: {e}");
            std::process::exit(1);
        }
    };

    let store = LevelStore::new(&args.out);
    match store.save(&level, args.level_id) {
        Ok(dir) => println!("Saved {emotion} level to {}", dir.display()),
        Err(e) => {
            eprintln!("Error saving level: {e}");
            std::process::exit(1);
        }
    }

    if let Some(seed) = level.seed {
        println!("Seed: {seed}");
    }
    let coins = level.layer(LayerKind::Coins).count(|t| !t.is_air());
    println!("Coins: {coins}");
    if args.show {
        print!("{}", level.to_ascii());
    }
}

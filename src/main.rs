//! skeltool - inspect and edit `.skel` skeleton files
//!
//! # Commands
//!
//! - `skeltool list [dir]` - List `.skel` files with their owner and ident
//! - `skeltool info <file>` - Print a summary of one skeleton
//! - `skeltool anims <file>` - List animation names
//! - `skeltool rename <file> <old> <new>` - Rename an animation in place
//! - `skeltool rename-at <file> <index> <new>` - Rename the animation at an index
//! - `skeltool duplicate <file> <index>` - Copy an animation right after itself
//! - `skeltool move <file> <index> <up|down>` - Swap an animation with a neighbour
//! - `skeltool remove <file> <index>` - Delete an animation
//! - `skeltool dump <file>` - Print the document as JSON
//! - `skeltool pack <json> <file>` - Encode a JSON document back to `.skel`

mod settings;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use settings::ToolSettings;
use skel_tools::Skeleton;
use skel_tools::model::MoveDirection;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFY_APP_NAME: &str = "skel-tools";

#[derive(Parser)]
#[command(name = "skeltool")]
#[command(about = "Inspect and edit .skel skeleton files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List .skel files in a directory (defaults to the last one used)
    List { dir: Option<PathBuf> },

    /// Print a summary of a skeleton
    Info { file: PathBuf },

    /// List animation names
    Anims { file: PathBuf },

    /// Rename an animation
    Rename {
        file: PathBuf,
        old: String,
        new: String,
        /// Write to this file instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rename the animation at an index (as printed by `anims`)
    RenameAt {
        file: PathBuf,
        index: usize,
        new: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Insert a copy of an animation right after it
    Duplicate {
        file: PathBuf,
        index: usize,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Swap an animation with the one above or below it
    Move {
        file: PathBuf,
        index: usize,
        direction: Direction,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete an animation
    Remove {
        file: PathBuf,
        index: usize,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the document as JSON
    Dump { file: PathBuf },

    /// Encode a JSON document produced by `dump`
    Pack { json: PathBuf, output: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut settings = ToolSettings::load();

    match cli.command {
        Commands::List { dir } => list(&mut settings, dir),
        Commands::Info { file } => info(&file),
        Commands::Anims { file } => anims(&file),
        Commands::Rename {
            file,
            old,
            new,
            output,
        } => rename(&settings, &file, &old, &new, output.as_deref()),
        Commands::RenameAt {
            file,
            index,
            new,
            output,
        } => rename_at(&settings, &file, index, &new, output.as_deref()),
        Commands::Duplicate {
            file,
            index,
            output,
        } => duplicate(&settings, &file, index, output.as_deref()),
        Commands::Move {
            file,
            index,
            direction,
            output,
        } => move_animation(&settings, &file, index, direction, output.as_deref()),
        Commands::Remove {
            file,
            index,
            output,
        } => remove(&settings, &file, index, output.as_deref()),
        Commands::Dump { file } => dump(&file),
        Commands::Pack { json, output } => pack(&json, &output),
    }
}

fn list(settings: &mut ToolSettings, dir: Option<PathBuf>) -> Result<()> {
    let Some(dir) = dir.or_else(|| settings.last_dir.clone()) else {
        bail!("no directory given and none remembered");
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "skel") {
            paths.push(path);
        }
    }
    paths.sort();

    for path in &paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match skel_tools::parse_file_name(&name) {
            Ok((owner, ident)) => println!("{name}\towner={owner}\tident={ident}"),
            Err(_) => println!("{name}\t(not a sprite skeleton)"),
        }
    }

    settings.last_dir = Some(dir);
    settings.save();
    Ok(())
}

fn info(file: &Path) -> Result<()> {
    let skeleton = skel_tools::read(file)?;
    println!("owner:        {}", skeleton.owner.as_deref().unwrap_or(""));
    println!("ident:        {}", skeleton.ident.as_deref().unwrap_or(""));
    println!("hash:         {}", skeleton.hash.as_deref().unwrap_or("<null>"));
    println!("version:      {}", skeleton.version.as_deref().unwrap_or("<null>"));
    println!("size:         {} x {}", skeleton.width, skeleton.height);
    println!("nonessential: {}", skeleton.nonessential);
    if let Some(images_path) = &skeleton.images_path {
        println!("images:       {images_path}");
    }
    println!("bones:        {}", skeleton.bones.len());
    println!("ik:           {}", skeleton.ik_constraints.len());
    println!("slots:        {}", skeleton.slots.len());
    println!("skins:        {}", skeleton.skins.len() + 1);
    println!("events:       {}", skeleton.events.len());
    println!("animations:   {}", skeleton.animations.len());
    Ok(())
}

fn anims(file: &Path) -> Result<()> {
    let skeleton = skel_tools::read(file)?;
    for (i, name) in skeleton.animation_names().into_iter().enumerate() {
        println!("{i}\t{}", name.unwrap_or("<null>"));
    }
    Ok(())
}

fn rename(
    settings: &ToolSettings,
    file: &Path,
    old: &str,
    new: &str,
    output: Option<&Path>,
) -> Result<()> {
    if new.trim().is_empty() {
        bail!("new animation name must not be blank");
    }

    let mut skeleton = skel_tools::read(file)?;
    if !skeleton.rename_animation(old, new) {
        bail!("no animation named {old:?} in {}", file.display());
    }

    let target = save(settings, file, output, &skeleton)?;
    println!("renamed {old:?} to {new:?} in {}", target.display());
    Ok(())
}

fn rename_at(
    settings: &ToolSettings,
    file: &Path,
    index: usize,
    new: &str,
    output: Option<&Path>,
) -> Result<()> {
    if new.trim().is_empty() {
        bail!("new animation name must not be blank");
    }

    let mut skeleton = skel_tools::read(file)?;
    if !skeleton.rename_animation_at(index, new) {
        bail!("no animation at index {index} in {}", file.display());
    }

    let target = save(settings, file, output, &skeleton)?;
    println!("renamed animation {index} to {new:?} in {}", target.display());
    Ok(())
}

fn duplicate(
    settings: &ToolSettings,
    file: &Path,
    index: usize,
    output: Option<&Path>,
) -> Result<()> {
    let mut skeleton = skel_tools::read(file)?;
    let Some(copy) = skeleton.duplicate_animation(index) else {
        bail!("no animation at index {index} in {}", file.display());
    };

    let target = save(settings, file, output, &skeleton)?;
    println!("copied animation {index} to {copy} in {}", target.display());
    Ok(())
}

fn move_animation(
    settings: &ToolSettings,
    file: &Path,
    index: usize,
    direction: Direction,
    output: Option<&Path>,
) -> Result<()> {
    let mut skeleton = skel_tools::read(file)?;
    let Some(moved) = skeleton.move_animation(index, direction.into()) else {
        bail!("animation {index} cannot move that way in {}", file.display());
    };

    let target = save(settings, file, output, &skeleton)?;
    println!("moved animation {index} to {moved} in {}", target.display());
    Ok(())
}

fn remove(
    settings: &ToolSettings,
    file: &Path,
    index: usize,
    output: Option<&Path>,
) -> Result<()> {
    let mut skeleton = skel_tools::read(file)?;
    let Some(removed) = skeleton.remove_animation(index) else {
        bail!("no animation at index {index} in {}", file.display());
    };

    let target = save(settings, file, output, &skeleton)?;
    println!(
        "removed animation {index} ({}) from {}",
        removed.name().unwrap_or("<null>"),
        target.display()
    );
    Ok(())
}

/// Writes an edited skeleton to `output`, or back over `file` after taking a
/// backup when settings ask for one.
fn save<'a>(
    settings: &ToolSettings,
    file: &'a Path,
    output: Option<&'a Path>,
    skeleton: &Skeleton,
) -> Result<&'a Path> {
    let target = match output {
        Some(output) => output,
        None => {
            if settings.backup {
                let backup = settings.backup_path(file);
                fs::copy(file, &backup)
                    .with_context(|| format!("backing up to {}", backup.display()))?;
                info!("backed up {} to {}", file.display(), backup.display());
            }
            file
        }
    };
    skel_tools::write(target, skeleton)?;
    Ok(target)
}

fn dump(file: &Path) -> Result<()> {
    let skeleton = skel_tools::read(file)?;
    println!("{}", serde_json::to_string_pretty(&skeleton)?);
    Ok(())
}

fn pack(json: &Path, output: &Path) -> Result<()> {
    let text = fs::read_to_string(json).with_context(|| format!("reading {}", json.display()))?;
    let skeleton: Skeleton = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", json.display()))?;
    skel_tools::write(output, &skeleton)?;
    println!("packed {} into {}", json.display(), output.display());
    Ok(())
}

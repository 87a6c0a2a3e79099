//! diffsurface CLI entry point.
//!
//! Thin terminal front end over the library: compute diffs, parse patches,
//! inspect merge conflicts and dry-run the render cache.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use diffsurface::domain::{ConflictResolution, DiffLineKind, DiffResult};
use diffsurface::infra::app_config::{ViewConfig, load_config, load_config_from};
use diffsurface::infra::conflict::parse_conflicts;
use diffsurface::infra::diff::{
    DiffOptions, diff_with_options, from_multi_file_patch, resolve_language,
};
use diffsurface::ui::diff::{
    MonospaceGlyphs, RenderCacheController, SharedSyntaxCache, render::FramePath,
};

#[derive(Parser, Debug)]
#[command(name = "diffsurface")]
#[command(version)]
#[command(about = "Diff engine and render-cache toolkit for large diff views", long_about = None)]
struct Args {
    /// Config file (defaults to the user data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Diff two files
    Diff {
        old: PathBuf,
        new: PathBuf,
        /// Print the DiffResult as JSON
        #[arg(long)]
        json: bool,
        /// Align lines ignoring whitespace
        #[arg(long)]
        ignore_whitespace: bool,
    },

    /// Parse a unified diff (use `-` for stdin)
    Patch {
        file: String,
        /// Language tag used for highlighting
        #[arg(long)]
        language: Option<String>,
        /// Fallback filename when the patch has no file headers
        #[arg(long)]
        filename: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// List merge conflicts in a file
    Conflicts {
        file: PathBuf,
        /// Resolve every region and print the resulting text
        #[arg(long, value_enum)]
        resolve_all: Option<Resolution>,
    },

    /// Render one frame of a diff and report what the cache did
    Render {
        old: PathBuf,
        new: PathBuf,
        /// Vertical scroll offset in pixels
        #[arg(long, default_value_t = 0.0)]
        top: f32,
        /// Viewport height in pixels
        #[arg(long, default_value_t = 720.0)]
        height: f32,
        /// Viewport width in pixels
        #[arg(long, default_value_t = 1200.0)]
        width: f32,
        #[arg(long)]
        language: Option<String>,
        /// Use the light palette
        #[arg(long)]
        light: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Resolution {
    Ours,
    Theirs,
    Both,
    Base,
}

impl From<Resolution> for ConflictResolution {
    fn from(value: Resolution) -> Self {
        match value {
            Resolution::Ours => ConflictResolution::Ours,
            Resolution::Theirs => ConflictResolution::Theirs,
            Resolution::Both => ConflictResolution::Both,
            Resolution::Base => ConflictResolution::Base,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_config(),
    };

    match args.command {
        Commands::Diff {
            old,
            new,
            json,
            ignore_whitespace,
        } => {
            let result = diff_files(&old, &new, ignore_whitespace || config.ignore_whitespace, &config)?;
            print_result(&result, json)
        }
        Commands::Patch {
            file,
            language,
            filename,
            json,
        } => {
            let text = read_input(&file)?;
            let result = from_multi_file_patch(
                &text,
                language.as_deref(),
                filename.as_deref(),
                config.spacer_lines,
            );
            print_result(&result, json)
        }
        Commands::Conflicts { file, resolve_all } => {
            let text = read_file(&file)?;
            let mut set = parse_conflicts(&text);
            match resolve_all {
                Some(choice) => {
                    for id in 0..set.len() {
                        set.resolve(id, choice.into());
                    }
                    print!("{}", set.resolved_text());
                }
                None => {
                    for region in set.regions() {
                        println!(
                            "#{} lines {}-{}: {} vs {}",
                            region.id,
                            region.start_line_index + 1,
                            region.end_line_index + 1,
                            region.ours_label,
                            region.theirs_label
                        );
                    }
                    println!("{} unresolved", set.unresolved_count());
                }
            }
            Ok(())
        }
        Commands::Render {
            old,
            new,
            top,
            height,
            width,
            language,
            light,
        } => {
            let mut result = diff_files(&old, &new, config.ignore_whitespace, &config)?;
            result.language = resolve_language(language.as_deref(), new.to_str());
            render(result, &config, top, width, height, !light)
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        return Ok(buffer);
    }
    read_file(Path::new(file))
}

fn diff_files(old: &Path, new: &Path, ignore_whitespace: bool, config: &ViewConfig) -> Result<DiffResult> {
    let old_text = read_file(old)?;
    let new_text = read_file(new)?;
    let mut result = diff_with_options(
        &old_text,
        &new_text,
        DiffOptions {
            ignore_whitespace,
            max_inline_len: config.max_inline_len,
        },
    );
    result.language = resolve_language(None, new.to_str());
    Ok(result)
}

fn print_result(result: &DiffResult, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(result).context("Failed to serialize diff")?;
        println!("{out}");
        return Ok(());
    }

    for line in &result.lines {
        let number = |n: Option<usize>| n.map(|n| n.to_string()).unwrap_or_default();
        match line.kind {
            DiffLineKind::FileHeader => println!("=== {}", line.content),
            DiffLineKind::Spacer => println!(),
            kind => {
                let prefix = match kind {
                    DiffLineKind::Added => '+',
                    DiffLineKind::Removed => '-',
                    _ => ' ',
                };
                println!(
                    "{:>5} {:>5} {prefix}{}",
                    number(line.original_line_number),
                    number(line.new_line_number),
                    line.content
                );
            }
        }
    }
    println!("+{} -{}", result.additions(), result.deletions());
    Ok(())
}

fn render(
    result: DiffResult,
    config: &ViewConfig,
    top: f32,
    width: f32,
    height: f32,
    dark: bool,
) -> Result<()> {
    let config = ViewConfig {
        dark_mode: dark,
        ..config.clone()
    };
    let shared = SharedSyntaxCache::new(config.shared_cache_capacity);
    let mut controller =
        RenderCacheController::with_parts(config, shared, Box::new(MonospaceGlyphs::default()));
    controller.set_content(Arc::new(result));
    controller.set_viewport(width, height);
    controller.scroll_to(top);

    let mut frame = controller.frame();
    if frame.path == FramePath::Empty {
        // Scroll was past the end; the second frame sees the clamped offset.
        frame = controller.frame();
    }
    if controller.wait_for_highlights(Duration::from_secs(5)) {
        frame = controller.frame();
    }

    println!("rows      {:?}", frame.visible);
    println!("rects     {}", frame.instances.rects.len());
    println!("glyphs    {}", frame.instances.glyphs.len());
    println!("camera    {:.1}", frame.camera_offset.y);
    println!(
        "stats     {}",
        serde_json::to_string(&controller.stats()).context("Failed to serialize stats")?
    );
    Ok(())
}

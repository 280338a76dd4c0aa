use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, bail};

use snappea_editor::{EditorConfig, Surface};

const USAGE: &str = "usage: snappea-editor <info|export> <file> [out.png]";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [command, input] if command == "info" => info(Path::new(input)),
        [command, input, output] if command == "export" => {
            export(Path::new(input), Path::new(output))
        }
        _ => bail!(USAGE),
    }
}

fn load(input: &Path) -> anyhow::Result<Surface> {
    let config = EditorConfig::load();
    Surface::load_from_path(input, config.field_cache())
        .with_context(|| format!("Failed to load {}", input.display()))
}

fn info(input: &Path) -> anyhow::Result<()> {
    let surface = load(input)?;
    let (width, height) = surface.image().dimensions();
    println!("{}: {}x{}", input.display(), width, height);
    println!("captured: {}", surface.capture().taken_at.format("%Y-%m-%d %H:%M:%S"));
    for element in surface.elements() {
        let bounds = element.bounds();
        match surface.step_number(element.id()) {
            Some(number) => println!("  {} #{} {:?}", element.kind(), number, bounds),
            None => println!("  {} {:?}", element.kind(), bounds),
        }
    }
    Ok(())
}

fn export(input: &Path, output: &Path) -> anyhow::Result<()> {
    let surface = load(input)?;
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    surface
        .write_export_png(BufWriter::new(file))
        .with_context(|| format!("Failed to export {}", output.display()))?;
    log::info!("Exported {}", output.display());
    Ok(())
}

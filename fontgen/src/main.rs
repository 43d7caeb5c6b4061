//! Generates GB2312 font partitions for flashing.
//!
//! ```text
//! fontgen generate plan.toml --out build/font
//! fontgen plan --size 12 --size 16 --parts 7
//! ```

mod args;
mod error;

use std::path::Path;

use args::{Args, Command, LayoutArgs, Overrides};
use error::ErrorReport;
use gb2312_font::{BudgetPlan, Config};

fn main() -> miette::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    use clap::Parser as _;
    let args = Args::parse_from(wild::args());

    match args.command {
        Command::Generate {
            plan,
            layout,
            font,
            font_index,
            out,
            y_offsets,
            no_annotate,
            charset,
            binary,
        } => {
            let mut config = load_config(plan.as_deref(), &layout)?;
            Overrides {
                font,
                font_index,
                out,
                y_offsets,
                no_annotate,
                charset,
                binary,
            }
            .apply(&mut config);
            log::debug!("{config:?}");
            let report = gb2312_font::generate(&config).map_err(ErrorReport::from)?;
            println!("{report}");
            log::info!(
                "wrote {} part(s) to '{}'",
                report.partitions.len(),
                config.output_dir.display()
            );
        }
        Command::Plan { plan, layout } => {
            let config = load_config(plan.as_deref(), &layout)?;
            config.validate_layout().map_err(ErrorReport::from)?;
            let plan = BudgetPlan::new(&config.sizes, config.range.len(), config.partitions)
                .map_err(ErrorReport::from)?;
            print_plan(&plan);
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>, layout: &LayoutArgs) -> Result<Config, ErrorReport> {
    let mut config = match path {
        Some(path) => read_plan(path)?,
        None => Config::default(),
    };
    layout.apply(&mut config);
    Ok(config)
}

fn read_plan(path: &Path) -> Result<Config, ErrorReport> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ErrorReport::message(format!("error reading '{}': {e}", path.display()))
    })?;
    let mut config: Config =
        toml::from_str(&text).map_err(|e| ErrorReport::from_toml(&e, path, text))?;
    if let Some(dir) = path.parent() {
        if !config.font.as_os_str().is_empty() && config.font.is_relative() {
            config.font = dir.join(&config.font);
        }
        if config.output_dir.is_relative() {
            config.output_dir = dir.join(&config.output_dir);
        }
    }
    Ok(config)
}

fn print_plan(plan: &BudgetPlan) {
    println!(
        "{} code positions at {} size(s): {} bytes",
        plan.total_slots(),
        plan.sizes().len(),
        plan.total_bytes()
    );
    println!(
        "{} part(s) of at most {} bytes (the last part takes any remainder)",
        plan.partitions(),
        plan.bytes_per_partition()
    );
    println!("font start addresses:");
    for (size, offset) in plan.expected_offsets().iter() {
        println!("  {size}x{size}: 0x{offset:08X}");
    }
}

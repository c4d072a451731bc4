use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use domhook_bridge::{generate_glue, BridgeConfig, Operator};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_GLUE_NAME: &str = "domhook.js";

#[derive(Debug, Args)]
pub struct GlueArgs {
    /// Directory holding domhook.config.json (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub config: String,

    /// Output file (defaults to domhook.js next to the config)
    #[arg(short, long)]
    pub out: Option<String>,

    /// Output to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Only emit hooks for these operators (overrides config)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub operators: Vec<OperatorArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OperatorArg {
    InnerHtml,
    AppendChild,
    RemoveChild,
    ReplaceChild,
}

impl From<OperatorArg> for Operator {
    fn from(arg: OperatorArg) -> Self {
        match arg {
            OperatorArg::InnerHtml => Operator::ReplaceContents,
            OperatorArg::AppendChild => Operator::AppendChild,
            OperatorArg::RemoveChild => Operator::RemoveChild,
            OperatorArg::ReplaceChild => Operator::ReplaceChild,
        }
    }
}

pub fn glue(args: GlueArgs, cwd: &str) -> Result<()> {
    let config_dir = PathBuf::from(cwd).join(&args.config);
    let mut config = BridgeConfig::load(&config_dir)
        .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;

    if !args.operators.is_empty() {
        config = config.with_operators(args.operators.iter().copied().map(Operator::from).collect());
    }
    debug!(operators = ?config.operators, module = %config.module_path, "Generating glue");

    let js = generate_glue(&config);

    if args.stdout {
        println!("{}", js);
        return Ok(());
    }

    let out_path = match &args.out {
        Some(out) => PathBuf::from(cwd).join(out),
        None => config_dir.join(DEFAULT_GLUE_NAME),
    };
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out_path, js)?;

    let names: Vec<String> = config.operators.iter().map(|op| op.to_string()).collect();
    println!(
        "  {} {} → {}",
        "✓".green(),
        names.join(", "),
        out_path.display()
    );

    Ok(())
}

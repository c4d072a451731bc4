use anyhow::Result;
use clap::Args;
use colored::Colorize;
use domhook_bridge::{BridgeConfig, MalformedPayloadPolicy, MultiTargetPolicy, DEFAULT_CONFIG_NAME};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub dir: String,

    /// Path the page fetches the compiled module from
    #[arg(short, long)]
    pub module_path: Option<String>,

    /// Refuse to place one node under several targets
    #[arg(long)]
    pub singleton: bool,

    /// Fail instead of coercing payloads of the wrong shape
    #[arg(long)]
    pub strict: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let dir = PathBuf::from(cwd).join(&args.dir);
    let config_path = dir.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing domhook...".bright_blue().bold());

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        println!("  {} Created {}/", "✓".green(), args.dir);
    }

    let mut config = BridgeConfig::default();
    if let Some(module_path) = args.module_path {
        config.module_path = module_path;
    }
    if args.singleton {
        config = config.with_multi_target(MultiTargetPolicy::SingletonOnly);
    }
    if args.strict {
        config = config.with_malformed_payload(MalformedPayloadPolicy::FaultFast);
    }

    fs::write(&config_path, config.to_json_pretty()?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Ready!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Point modulePath at your compiled module ({})", config.module_path);
    println!("  2. Run: domhook glue");

    Ok(())
}

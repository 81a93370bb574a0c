use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use swathscale::{
    AreaRegistry, ChannelSource, ConfigSource, ConfigStore, MessageOutcome, Notification,
    Processor, StaticAreaRegistry, notification,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "swathscale", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset (e.g. `debug`, `swathscale=trace`).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process JSON-lines notifications until stopped or the input ends.
    Run(RunArgs),
    /// Process a single notification.
    Process(ProcessArgs),
    /// Resolve every configured topic and report problems.
    CheckConfig(CheckArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// INI configuration, one section per topic.
    #[arg(long)]
    config: PathBuf,

    /// JSON file of area definitions.
    #[arg(long)]
    areas: Option<PathBuf>,

    /// JSON-lines notification file; stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Re-read the configuration file for every message.
    #[arg(long)]
    reload_config: bool,
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// INI configuration, one section per topic.
    #[arg(long)]
    config: PathBuf,

    /// JSON file of area definitions.
    #[arg(long)]
    areas: Option<PathBuf>,

    /// Topic selecting the profile.
    #[arg(long)]
    topic: String,

    /// Source image path or URI.
    #[arg(long)]
    uri: String,

    /// Nominal acquisition time (RFC 3339 or `%Y-%m-%dT%H:%M:%S`).
    #[arg(long)]
    start_time: String,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// INI configuration, one section per topic.
    #[arg(long)]
    config: PathBuf,

    /// JSON file of area definitions.
    #[arg(long)]
    areas: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Process(args) => cmd_process(args),
        Command::CheckConfig(args) => cmd_check_config(args),
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: &Path) -> anyhow::Result<ConfigStore> {
    ConfigStore::load_from(path).with_context(|| format!("load config '{}'", path.display()))
}

fn load_areas(path: Option<&Path>) -> anyhow::Result<Arc<dyn AreaRegistry>> {
    let registry = match path {
        Some(path) => StaticAreaRegistry::from_json_file(path)
            .with_context(|| format!("load areas '{}'", path.display()))?,
        None => StaticAreaRegistry::default(),
    };
    Ok(Arc::new(registry))
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = if args.reload_config {
        // Fail fast on an unreadable file even though it is re-read per message.
        load_config(&args.config)?;
        ConfigSource::Reloading(args.config.clone())
    } else {
        ConfigSource::Static(load_config(&args.config)?)
    };
    let processor = Processor::new(config, load_areas(args.areas.as_deref())?);

    let stop = processor.stop_handle();
    ctrlc::set_handler(move || stop.stop()).context("install ctrl-c handler")?;

    let (tx, mut source) = ChannelSource::channel();
    let _reader = match &args.input {
        Some(path) => {
            let f = File::open(path)
                .with_context(|| format!("open notifications '{}'", path.display()))?;
            notification::spawn_json_lines_reader(BufReader::new(f), tx)
        }
        None => notification::spawn_json_lines_reader(BufReader::new(std::io::stdin()), tx),
    };

    let handled = processor.run(&mut source);
    eprintln!("processed {handled} notification(s)");
    Ok(())
}

fn cmd_process(args: ProcessArgs) -> anyhow::Result<()> {
    let processor = Processor::new(
        ConfigSource::Static(load_config(&args.config)?),
        load_areas(args.areas.as_deref())?,
    );
    let msg = Notification::new(args.topic, args.uri, args.start_time);
    match processor.process(&msg) {
        MessageOutcome::Written(paths) => {
            for path in paths {
                eprintln!("wrote {}", path.display());
            }
            Ok(())
        }
        MessageOutcome::SkippedBackup => {
            eprintln!("skipped: product already exists");
            Ok(())
        }
        MessageOutcome::Dropped(reason) => anyhow::bail!("message dropped: {reason}"),
    }
}

fn cmd_check_config(args: CheckArgs) -> anyhow::Result<()> {
    let store = load_config(&args.config)?;
    let areas = load_areas(args.areas.as_deref())?;

    let mut failed = 0usize;
    for topic in store.topics() {
        match store.resolve_profile(&topic, areas.as_ref()) {
            Ok(profile) => eprintln!(
                "ok   {topic}: {} output(s) -> {}",
                profile.outputs.len(),
                profile.out_pattern
            ),
            Err(err) => {
                failed += 1;
                eprintln!("FAIL {topic}: {err}");
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} topic(s) failed to resolve");
    }
    Ok(())
}

mod animator;
mod color;
mod config;
mod document;
mod gradient;
mod render;
mod runner;
mod scheduler;

use crate::{
    animator::{AnimatorState, BackgroundAnimator},
    config::Config,
    document::Document,
    render::{Compositor, TerminalHost},
    runner::{Host, PrintHost, Runner},
    scheduler::Scheduler,
};
use anyhow::Context;
use clap::Parser;
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Run a background animation that crossfades between random linear gradients.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The path to the configuration file.
    #[clap(short, long, env = "BACKDROP_CONFIG")]
    config: Option<PathBuf>,

    /// The id of the element to animate.
    #[clap(short, long)]
    target: Option<String>,

    /// The time between the start of two cycles, in milliseconds.
    #[clap(long, value_name = "MILLIS")]
    period: Option<u64>,

    /// The time between fading out and applying the next gradient, in milliseconds.
    #[clap(long, value_name = "MILLIS")]
    fade_delay: Option<u64>,

    /// How long opacity changes take on screen, in milliseconds.
    #[clap(long, value_name = "MILLIS")]
    transition: Option<u64>,

    /// The number of frames drawn per second.
    #[clap(long)]
    fps: Option<u16>,

    /// The seed used to generate colors.
    #[clap(long)]
    seed: Option<u64>,

    /// Exit after this many cycles complete.
    #[clap(long)]
    cycles: Option<u64>,

    /// Print every style change to stdout instead of drawing on the terminal.
    #[clap(long)]
    print: bool,

    /// Write logs to this file.
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// Print the JSON schema for the configuration file and exit.
    #[cfg(feature = "json-schema")]
    #[clap(long)]
    generate_config_file_schema: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(target) = &self.target {
            config.animator.target = target.clone();
        }
        if let Some(period) = self.period {
            config.animator.period_millis = period;
        }
        if let Some(fade_delay) = self.fade_delay {
            config.animator.fade_delay_millis = fade_delay;
        }
        if let Some(seed) = self.seed {
            config.animator.seed = Some(seed);
        }
        if let Some(transition) = self.transition {
            config.render.transition_millis = transition;
        }
        if let Some(fps) = self.fps {
            config.render.frames_per_second = fps;
        }
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create log file '{}'", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("backdrop=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(Mutex::new(file)).with_ansi(false).init();
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Start animating once the host is up, then run until done.
fn animate<H: Host>(
    config: &Config,
    document: &Document,
    host: &mut H,
    cycles: Option<u64>,
) -> anyhow::Result<AnimatorState> {
    let mut scheduler = Scheduler::new();
    let animator = BackgroundAnimator::attach(document, &config.animator, &mut scheduler)?;
    let mut runner = Runner::new(scheduler, animator, config.render.frame_interval(), cycles);
    Ok(runner.run(host)?)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    #[cfg(feature = "json-schema")]
    {
        if cli.generate_config_file_schema {
            let schema = schemars::schema_for!(Config);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            return Ok(());
        }
    }

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }
    let config = load_config(&cli)?;
    if config.has_overlapping_cycles() {
        warn!(
            period = config.animator.period_millis,
            fade_delay = config.animator.fade_delay_millis,
            fade_in_frames = config.animator.fade_in_frames,
            "cycles can fade out before the previous one faded in"
        );
        eprintln!("[backdrop] note: the fade delay and fade in don't fit in the period, cycles will interleave");
    }

    let document = Document::from_config(&config.document);
    let state = if cli.print {
        let mut host = PrintHost::new(&document, io::stdout().lock());
        animate(&config, &document, &mut host, cli.cycles)?
    } else {
        let compositor = Compositor::new(&document, config.render.backdrop, config.render.transition());
        let mut host = TerminalHost::new(io::stdout(), compositor)?;
        animate(&config, &document, &mut host, cli.cycles)?
    };
    info!(cycles = state.cycles_completed, angle = %state.angle, "animation stopped");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("[backdrop] error: {e:#}");
        std::process::exit(1);
    }
}

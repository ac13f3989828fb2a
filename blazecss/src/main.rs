use anyhow::{Context, Result};
use blazecss_lib::blaze_generate::blaze_rules::{self, RuleSources};
use clap::Parser;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

const BLAZECSS_INTRO: &str = r#"
        ____  __                 ___________ _____
       / __ )/ /___ _____  ___  / ____/ ___// ___/
      / __  / / __ `/_  / / _ \/ /    \__ \ \__ \
     / /_/ / / /_/ / / /_/  __/ /___ ___/ /___/ /
    /_____/_/\__,_/ /___/\___/\____//____//____/

    Welcome to BlazeCSS - Templated stylesheets, scoped and composed!
"#;

#[derive(Parser)]
#[command(name = "BlazeCSS")]
#[command(about = "Render templated CSS rules against a JSON binding")]
struct Args {
    /// Rule template file.
    template: PathBuf,

    /// Output file name. Prints to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file used as the template binding.
    #[arg(short, long)]
    binding: Option<PathBuf>,

    /// Parent selector that `&` and leading `:` selectors resolve into.
    #[arg(short, long, default_value = "")]
    parent: String,

    /// Rule template whose styles `{{extend ".name"}}` can pull in.
    #[arg(long)]
    feed: Option<PathBuf>,

    /// Rule templates rendered ahead of the main rule, in order.
    #[arg(long = "depends")]
    depends: Vec<PathBuf>,

    /// Minify the generated stylesheet.
    #[arg(long)]
    minify: bool,

    /// Render missing binding fields as empty instead of failing.
    #[arg(long)]
    lenient: bool,

    /// Do not print the banner.
    #[arg(short, long)]
    quiet: bool,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Error reading {}", path.display()))
}

fn run(args: &Args) -> Result<()> {
    let template = read(&args.template)?;
    let feed = args.feed.as_deref().map(read).transpose()?;
    let depends = args
        .depends
        .iter()
        .map(|path| read(path))
        .collect::<Result<Vec<_>>>()?;

    let binding: serde_json::Value = match &args.binding {
        Some(path) => serde_json::from_str(&read(path)?)
            .with_context(|| format!("Error parsing binding {}", path.display()))?,
        None => serde_json::Value::Null,
    };

    let sources = RuleSources {
        template: &template,
        feed: feed.as_deref(),
        depends: depends.iter().map(String::as_str).collect(),
        lenient: args.lenient,
    };

    let sheet = blaze_rules::generate(&sources, &binding, &args.parent)
        .with_context(|| format!("Error rendering {}", args.template.display()))?;
    info!("Generated {} rules.", sheet.len());

    let css = blaze_rules::emit(&sheet, args.minify)?;

    match &args.output {
        Some(path) => {
            fs::write(path, css).with_context(|| format!("Error writing {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", css),
    }

    Ok(())
}

fn main() {
    env_logger::init();

    // parse the args given in terminal
    let args: Args = Args::parse();

    if !args.quiet {
        eprintln!("{}", BLAZECSS_INTRO);
    }

    if let Err(e) = run(&args) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cmdreg::{discover_settings, Dynamic, Error, Manifest, Program, Registry, Variadic};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cmdreg", version, about = "Run a command from a self-describing registry")]
struct Cli {
    /// Program manifest with `name` and `description`.
    #[arg(long, default_value = "manifest.json")]
    manifest: PathBuf,

    /// Command to run; prints usage when omitted.
    command: Option<String>,

    /// Arguments handed to the command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn build(package: String, force: bool) {
    println!("build {} (force: {})", package, force);
}

fn remove(packages: Vec<String>) {
    println!("remove {}", packages.join(" "));
}

fn list_all() {
    println!("list");
}

fn get(args: Variadic<Dynamic>) {
    let name = args.get::<Manifest>(0).map(|m| m.name.as_str()).unwrap_or("cmdreg");
    let options = args.get::<Vec<String>>(1).cloned().unwrap_or_default();
    println!("{}: get {}", name, options.join(" "));
}

fn echo(args: Variadic<Dynamic>) {
    let options = args.get::<Vec<String>>(1).cloned().unwrap_or_default();
    println!("{}", options.join(" "));
}

fn registry(settings: &cmdreg::Settings, settings_dir: &std::path::Path) -> cmdreg::Result<Registry> {
    let mut registry = Registry::with_symbols(settings.source_tree(settings_dir));
    registry.register_named(build, &["package", "force"])?;
    registry.register_named(get, &["args"])?;
    registry.register_named(echo, &["args"])?;
    registry.register_named(list_all, &[])?;
    registry.register_named(remove, &["packages"])?;
    Ok(registry)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cmdreg=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let (settings, settings_dir) = discover_settings(&cwd);
    debug!(settings_dir = %settings_dir.display(), "loaded settings");

    let manifest = Manifest::load(&cli.manifest)
        .with_context(|| format!("cannot load manifest '{}'", cli.manifest.display()))?;
    let registry = registry(&settings, &settings_dir).context("cannot build command registry")?;
    let program = Program::from_manifest(&manifest, &registry, settings.line_length());

    let Some(command) = cli.command else {
        println!("{}", program.usage);
        return Ok(ExitCode::SUCCESS);
    };

    match registry.dispatch(&command) {
        Ok(handler) => {
            info!(command = %command, args = cli.args.len(), "dispatching");
            handler(Variadic::<Dynamic>::new().with(manifest).with(cli.args));
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::SignatureMismatch(_)) => {
            eprintln!(
                "{}: error. \"{}\" takes typed arguments and cannot be run directly.",
                program.name, command
            );
            println!("{}", program.usage);
            Ok(ExitCode::from(2))
        }
        Err(e) if e.is_recoverable() => {
            eprintln!("{}: error. \"{}\" is not a supported command.", program.name, command);
            println!("{}", program.usage);
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}

use std::fs::File;
use std::io::Write;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use labspec::cli::{Cli, Command, OutputFormat};
use labspec::config;
use labspec::error::LabspecError;
use labspec::profile;
use labspec::request::Request;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr — stdout carries only the emitted document.
    let filter = if cli.verbose {
        EnvFilter::new("labspec=debug")
    } else {
        EnvFilter::from_default_env()
            .add_directive("labspec=info".parse().expect("valid log directive"))
    };
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(stderr_layer).init();

    let command = cli.command.unwrap_or(Command::Generate {
        output: None,
        format: OutputFormat::Xml,
    });

    match command {
        Command::Generate { output, format } => {
            run_generate(cli.config.as_deref(), output.as_deref(), format)?;
        }
        Command::Validate => run_validate(cli.config.as_deref())?,
        Command::Init { defaults } => labspec::init::run(defaults)?,
    }

    Ok(())
}

/// Build the request (built-in profile, or a profile description file when
/// `--config` is given) and write the document once.
fn run_generate(
    config_path: Option<&Path>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<(), LabspecError> {
    let (request, tour) = match config_path {
        Some(path) => {
            let config = config::load_config(path)?;
            (profile::from_config(&config)?, profile::tour_from_config(&config))
        }
        None => (profile::default_request()?, None),
    };

    tracing::debug!(nodes = request.nodes().len(), "request built");

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path).map_err(|e| LabspecError::Io {
            context: format!("creating {}", path.display()),
            source: e,
        })?),
        None => Box::new(std::io::stdout()),
    };

    match format {
        OutputFormat::Xml => profile::emit(request, tour, &mut *out)?,
        OutputFormat::Json => {
            request.validate()?;
            let json = render_json(&request)?;
            writeln!(out, "{json}").map_err(|e| LabspecError::Io {
                context: "writing request specification".into(),
                source: e,
            })?;
        }
    }

    if let Some(path) = output {
        tracing::info!(path = %path.display(), "wrote request specification");
    }

    Ok(())
}

fn run_validate(config_path: Option<&Path>) -> Result<(), LabspecError> {
    let Some(path) = config_path else {
        return Err(LabspecError::Validation {
            message: "validate requires --config <path>".into(),
        });
    };

    let config = config::load_config(path)?;
    let request = profile::from_config(&config)?;
    request.validate()?;

    println!("{}: {} node(s), OK", path.display(), request.nodes().len());
    Ok(())
}

// ── JSON output structs ─────────────────────────────────────────────

#[derive(facet::Facet)]
struct RequestJson {
    nodes: Vec<NodeJson>,
}

#[derive(facet::Facet)]
struct NodeJson {
    name: String,
    kind: String,
    disk_image: String,
    exclusive: bool,
}

fn render_json(request: &Request) -> Result<String, LabspecError> {
    let nodes = request
        .nodes()
        .iter()
        .map(|n| NodeJson {
            name: n.client_id.clone(),
            kind: n.sliver.name().to_string(),
            disk_image: n.disk_image.clone().unwrap_or_default(),
            exclusive: n.sliver.exclusive(),
        })
        .collect();

    facet_json::to_string(&RequestJson { nodes }).map_err(|e| LabspecError::Serialize {
        message: e.to_string(),
    })
}

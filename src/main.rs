use clap::Parser;
use formgate::cli::{self, Cli, Command};
use formgate::config::Settings;
use formgate::domain::ValidationResult;
use formgate::schema::SchemaGate;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_root(&cli.root)?;
    info!("Loaded {} schemas from {}", settings.schemas.len(), cli.root.display());

    match cli.command {
        Command::Check { schema, input } => {
            let schema = settings.schema(&schema)?;
            let values = cli::load_record(&input)?;

            match SchemaGate::validate(&schema, &values) {
                ValidationResult::Valid => {
                    println!("{}", json!({ "valid": true }));
                }
                ValidationResult::Invalid(errors) => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({ "valid": false, "errors": errors }))?
                    );
                    std::process::exit(1);
                }
            }
        }
        Command::List => {
            for config in settings.schemas.iter().filter(|c| !c.is_fragment()) {
                let schema = config.build(&settings.schemas)?;
                println!("{}", cli::list_heading(config));
                for field in schema.fields() {
                    let marker = if field.is_required() { "*" } else { " " };
                    println!("  {}{}", marker, field.name);
                }
            }
        }
    }

    Ok(())
}

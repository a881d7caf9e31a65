use clap::Parser;
use quietus::config::prompt::Prompter;
use quietus::config::toml_config::TomlConfig;
use quietus::utils::logger::{self, LogFormat};
use quietus::utils::validation::Validate;
use quietus::{CliArgs, FeedPipeline, HttpFeedClient, InactivityEngine, LocalStorage, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_logger(LogFormat::from_flag(args.log_json), args.verbose);

    tracing::info!("Starting quietus");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let file_config = match args.config.as_deref() {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::error!("Failed to load config file '{}': {}", path, e);
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let settings = {
        let stdin = std::io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
        Settings::resolve(&args, file_config.as_ref(), &mut prompter)?
    };

    if let Err(e) = settings.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::debug!("Resolved settings: {:?}", settings);

    let client = HttpFeedClient::from_config(&settings)?;
    let pipeline = FeedPipeline::new(LocalStorage::default(), client, settings);
    let engine = InactivityEngine::new(pipeline);

    match engine.run().await {
        Ok(output) => {
            println!("{}", output.report);

            let failures = &output.evaluation.failures;
            if !failures.is_empty() {
                eprintln!("⚠️  {} feed(s) could not be checked:", failures.len());
                for failure in failures {
                    eprintln!("   {}: {}", failure.organization.name(), failure.reason);
                }
            }
        }
        Err(e) => {
            tracing::error!(
                "Inactivity check failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

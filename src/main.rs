use clap::Parser;
use fluxgen::{
    cli::CliOptions, logger, shell::Console, BatchJob, Config, Result, Studio, StudioError,
    TopicCatalog,
};
use std::io;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let env_loaded = dotenv::dotenv().is_ok();
    let opts = CliOptions::parse();

    if let Err(e) = logger::init_with_config(opts.logger_config()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if env_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    match run(opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(opts: CliOptions) -> Result<()> {
    let mut config = opts.apply(Config::from_env());
    let catalog = TopicCatalog::default();

    let job = {
        let mut console = Console::new(io::stdin().lock(), io::stdout());

        for credential in config.missing_credentials() {
            log::warn!("{} is not set", credential.env_var());
            let value = console.read_credential(credential)?;
            config.set_credential(credential, value);
        }
        logger::log_config_info(&config);

        let topic = match opts.resolve_topic(&catalog).map_err(StudioError::Config)? {
            Some(topic) => {
                log::info!("Topic from command line: {}", topic.name);
                topic
            }
            None => console.select_topic(&catalog)?,
        };
        let user_request = match &opts.request {
            Some(request) => request.trim().to_string(),
            None => console.read_request()?,
        };
        let batch_size = match opts.batch_size {
            Some(size) => size,
            None => console.read_batch_size()?,
        };
        let upscale_factor = match opts.upscale {
            Some(factor) => factor,
            None => console.read_upscale_factor()?,
        };

        BatchJob {
            topic,
            user_request,
            batch_size,
            upscale_factor,
        }
    };

    let studio = Studio::from_config(&config, opts.mode).await?;

    log::info!(
        "🚀 Generating {} image(s) for '{}' (mode: {}, upscale: {})",
        job.batch_size,
        job.topic.name,
        opts.mode.as_str(),
        job.upscale_factor
    );
    let report = {
        let _timer = logger::timer("batch");
        studio.run_batch(&job).await?
    };

    log::info!(
        "✅ Done: {} saved, {} skipped, {} upscale fallback(s)",
        report.saved.len(),
        report.skipped,
        report.upscale_fallbacks
    );

    Ok(())
}

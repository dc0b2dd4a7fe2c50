use log::{debug, error, info};

use aistation::GatewayConfig;

#[tokio::main]
async fn main()
{   // Load .env before the logger so RUST_LOG can come from it
    let dotenv_result = dotenv::dotenv();

    env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    match dotenv_result
    {   Ok(path) => debug!("Loaded environment from {}", path.display())
      , Err(_) => debug!("No .env file, using process environment")
    }

    let config = match GatewayConfig::from_env()
    {   Ok(config) => config
      , Err(e) => {
          error!("{}", e);
          std::process::exit(2);
        }
    };

    info!("Starting AI station on {}", config.server.addr());

    if let Err(e) = aistation::server::start(config).await
    {   error!("{}", e);
        std::process::exit(1);
    }
}

//! sensor-rtdb - upload and read sensor readings from the command line

use anyhow::Context;
use clap::{Parser, Subcommand};
use firebase_sensor_rust::{
    logging::{init_logging, LogConfig},
    ClientConfig, SensorDataClient,
};
use std::path::PathBuf;
use tracing::Level;

/// Sensor reading uploader for Firebase Realtime Database
#[derive(Parser, Debug)]
#[command(name = "sensor-rtdb")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging, overriding RUST_LOG
    #[arg(long, global = true)]
    debug: bool,

    /// Optional TOML configuration file
    #[arg(long, global = true, env = "SENSOR_CONFIG")]
    config: Option<PathBuf>,

    /// Service-account key file
    #[arg(long, global = true, env = "SENSOR_CREDENTIAL_PATH")]
    credential_path: Option<PathBuf>,

    /// Database URL
    #[arg(long, global = true, env = "SENSOR_DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload one reading and print the path it was written to
    Upload {
        /// Sensor identifier
        #[arg(long)]
        sensor_id: String,

        /// Sensor type (energia, luminosidad, presencia, ...)
        #[arg(long)]
        tipo: String,

        /// Reading as a JSON object, e.g. '{"power": 120}'
        #[arg(long)]
        data: String,

        /// Root path for readings
        #[arg(long)]
        base_path: Option<String>,
    },
    /// Print the value stored at a path
    Get {
        /// Database path, e.g. /lecturas/energia/sensor-7
        path: String,
    },
}

impl Cli {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        match (&self.credential_path, &self.database_url) {
            (Some(credential_path), Some(database_url)) if self.config.is_none() => {
                Ok(ClientConfig::new(credential_path.clone(), database_url)?)
            }
            _ => {
                let mut config = ClientConfig::load(self.config.as_deref())?;
                if let Some(credential_path) = &self.credential_path {
                    config.credential_path = credential_path.clone();
                }
                if let Some(database_url) = &self.database_url {
                    config.database_url = database_url
                        .parse()
                        .with_context(|| format!("invalid database URL '{database_url}'"))?;
                    config.validate()?;
                }
                Ok(config)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.debug {
        log_config = log_config
            .with_level(Level::DEBUG)
            .with_directive(Level::DEBUG.as_str());
    }
    init_logging(log_config)?;

    let config = cli.client_config()?;
    let client = SensorDataClient::connect(&config)?;

    match cli.command {
        Command::Upload {
            sensor_id,
            tipo,
            data,
            base_path,
        } => {
            let data: serde_json::Value =
                serde_json::from_str(&data).context("--data is not valid JSON")?;
            let path = client
                .upload_value(data, &sensor_id, &tipo, base_path.as_deref())
                .await?;
            println!("{path}");
        }
        Command::Get { path } => {
            let value = client.get(&path).await?;
            match value {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => println!("null"),
            }
        }
    }

    Ok(())
}

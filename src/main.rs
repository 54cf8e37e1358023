//! recipe-box server entry point.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::info;

use recipe_box::{api, HttpServer, IdGenerator, SequentialIds, ServerConfig, Stores, UuidIds};

/// How record ids are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IdStrategy {
    /// Random v4 UUIDs
    Uuid,
    /// 1, 2, 3, ...
    Sequential,
}

/// In-memory recipe and shopping-list API
#[derive(Parser, Debug)]
#[command(name = "recipe-box")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "RECIPE_BOX_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Maximum number of concurrent connections
    #[arg(long, default_value_t = 1024)]
    max_connections: usize,

    /// Largest request accepted, in bytes
    #[arg(long, default_value_t = 8192)]
    read_buffer_size: usize,

    /// Seconds a client has to send its request
    #[arg(long, default_value_t = 10)]
    read_timeout_secs: u64,

    /// Id generation strategy
    #[arg(long, value_enum, default_value_t = IdStrategy::Uuid)]
    ids: IdStrategy,

    /// Start with empty collections
    #[arg(long)]
    no_seed: bool,
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            addr: self.addr,
            max_connections: self.max_connections,
            read_buffer_size: self.read_buffer_size,
            read_timeout: Duration::from_secs(self.read_timeout_secs),
        }
    }

    fn stores(&self) -> Stores {
        let ids = self.ids;
        Stores::new(move || -> Box<dyn IdGenerator> {
            match ids {
                IdStrategy::Uuid => Box::new(UuidIds),
                IdStrategy::Sequential => Box::new(SequentialIds::new()),
            }
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let stores = cli.stores();
    if cli.no_seed {
        info!("Starting with empty collections");
    } else {
        stores.seed();
    }

    let server = HttpServer::new(cli.server_config());
    api::mount(&server, &stores).await;
    server.start().await?;

    Ok(())
}

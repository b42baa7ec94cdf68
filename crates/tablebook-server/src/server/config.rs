use anyhow::bail;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Runtime configuration for the `tablebook-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tablebook-server",
    version,
    about = "A gRPC service for restaurant table reservations"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/tablebook.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// Where reservations and tables are kept.
    ///
    /// `memory` keeps everything in process and loses it on exit; `redb`
    /// persists to the file at `DATABASE_PATH`.
    ///
    /// Environment variable: `STORE_BACKEND`
    #[arg(long, env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Redb)]
    pub store_backend: StoreBackend,

    /// Database file used by the `redb` backend. Created if missing.
    ///
    /// Environment variable: `DATABASE_PATH`
    #[arg(long, env = "DATABASE_PATH", default_value = "tablebook.redb")]
    pub database_path: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redb,
}

/// Where the server keeps its documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    Redb { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub store: StoreConfig,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        let store = match args.store_backend {
            StoreBackend::Memory => StoreConfig::Memory,
            StoreBackend::Redb => {
                if args.database_path.as_os_str().is_empty() {
                    bail!("DATABASE_PATH must be set when STORE_BACKEND is redb");
                }
                if args.database_path.is_dir() {
                    bail!(
                        "DATABASE_PATH ({}) is a directory, expected a file",
                        args.database_path.display()
                    );
                }
                StoreConfig::Redb {
                    path: args.database_path,
                }
            }
        };

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            store,
        })
    }
}

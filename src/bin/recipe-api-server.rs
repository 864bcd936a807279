// ABOUTME: Recipe API server binary
// ABOUTME: Loads configuration, opens the repository and image store, then serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recipe API Server Binary

use anyhow::Result;
use clap::Parser;
use recipe_api_server::{
    config::environment::{ImageStoreKind, ServerConfig},
    database::Database,
    logging,
    resources::ServerResources,
    server::RecipeServer,
    storage::{create_image_store, LocalImageStore},
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "recipe-api-server")]
#[command(about = "Recipe API - owner-scoped recipes, tags and ingredients")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    config.validate()?;

    info!("Starting Recipe API Server");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;

    if config.images.store == ImageStoreKind::Local {
        LocalImageStore::new(
            config.images.media_root.clone(),
            config.images.url_prefix.clone(),
        )
        .ensure_root()
        .await?;
    }
    let image_store = create_image_store(&config.images);
    info!("Image store backend: {}", image_store.backend());

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(
        Arc::new(config),
        database,
        image_store,
    ));

    if let Err(e) = RecipeServer::new(resources).run(port).await {
        error!("Server error: {}", e);
        return Err(e);
    }
    Ok(())
}

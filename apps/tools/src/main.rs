use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{domain::ProductId, protocol::UiAction};
use storefront_core::{Catalog, ControllerOptions, InteractionController};

#[derive(Parser, Debug)]
struct Cli {
    /// Product feed to use instead of the built-in demo catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    ListProducts,
    CheckCatalog,
    RenderPage {
        /// Product ids to put in the cart before rendering; repeat for duplicates.
        #[arg(long = "add")]
        add: Vec<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    let cli = Cli::parse();
    let catalog = match &cli.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("failed to load catalog from '{}'", path.display()))?,
        None => Catalog::builtin(),
    };

    match cli.command {
        Command::ListProducts => {
            for product in catalog.products() {
                println!("{}\t{}\t{}", product.id, product.price, product.name);
            }
        }
        Command::CheckCatalog => {
            println!("catalog ok: {} products", catalog.len());
        }
        Command::RenderPage { add, output } => {
            let controller = InteractionController::new(catalog, ControllerOptions::default());
            for id in add {
                controller
                    .dispatch(UiAction::AddToCart {
                        product_id: ProductId::new(id),
                    })
                    .await;
            }
            let html = controller.render_page().await;
            match output {
                Some(path) => {
                    fs::write(&path, html)
                        .with_context(|| format!("failed to write '{}'", path.display()))?;
                    tracing::info!(path = %path.display(), "page written");
                }
                None => print!("{html}"),
            }
        }
    }

    Ok(())
}

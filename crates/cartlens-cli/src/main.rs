use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cartlens_core::aggregate;
use cartlens_core::models::{ImageBlob, ImageField};
use cartlens_core::{Candidate, Config, ItemPipeline, ListStore, Session, VisionAnalyzer};
use cartlens_vision::VisionClient;

#[derive(Parser)]
#[command(name = "cartlens")]
#[command(version, about = "Photo-driven shopping list tracker", long_about = None)]
struct Cli {
    /// List to operate on
    #[arg(long, global = true, default_value = cartlens_core::session::DEFAULT_LIST_NAME)]
    list: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Analyze photos and add the resulting item to the list
    Add {
        /// Price per unit
        #[arg(long)]
        price: String,
        /// Number of units
        #[arg(long)]
        quantity: String,
        /// Product photo to identify
        #[arg(long)]
        photo: Option<PathBuf>,
        /// Nutrition label photo
        #[arg(long)]
        label: Option<PathBuf>,
    },
    /// Print the list's items
    Show,
    /// Print spend and nutrition totals
    Totals,
    /// All saved list names
    Lists,
    /// Remove one item by id
    Remove {
        id: uuid::Uuid,
    },
    /// Delete the whole list
    DeleteList,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cartlens=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let store = ListStore::open(&config.db_path()?)?;

    match cli.command {
        Commands::Add {
            price,
            quantity,
            photo,
            label,
        } => {
            tracing::info!("Adding item to '{}'", cli.list);

            let api_key = config
                .analysis
                .api_key
                .clone()
                .context("no API key configured; set CARTLENS_API_KEY or analysis.api_key")?;
            let client = VisionClient::with_base_url(api_key, config.analysis.api_url.clone())
                .with_model(config.analysis.model.clone())
                .with_retry_config(config.retry.to_retry_config());
            let analyzer = Arc::new(VisionAnalyzer::new(client));
            let mut pipeline = ItemPipeline::new(analyzer);

            let mut session = Session::new();
            session.replace_items(
                cli.list.clone(),
                store.load(&cli.list)?.unwrap_or_default(),
            );

            let candidate = Candidate {
                price,
                quantity,
                product_image: photo
                    .map(|p| ImageField::Live(ImageBlob::from_path(p)))
                    .unwrap_or_default(),
                nutrition_image: label
                    .map(|p| ImageField::Live(ImageBlob::from_path(p)))
                    .unwrap_or_default(),
            };

            let ticket = session.begin_submission();
            let item = pipeline.submit(candidate).await?;
            println!("Added {} x{} @ ${:.2}", item.name, item.quantity, item.price);
            session.commit_submission(ticket, item);
            store.save(session.list_name(), session.items())?;
        }
        Commands::Show => {
            let items = store.load(&cli.list)?.unwrap_or_default();
            if items.is_empty() {
                println!("'{}' is empty", cli.list);
            }
            for item in &items {
                println!(
                    "{}  {}  x{}  ${:.2}",
                    item.id, item.name, item.quantity, item.price
                );
                if let Some(desc) = &item.description {
                    println!("    {desc}");
                }
                if let Some(info) = &item.nutrition_info {
                    println!(
                        "    {} cal, {}g protein per serving",
                        info.calories.unwrap_or(0.0),
                        info.protein.unwrap_or(0.0)
                    );
                }
            }
        }
        Commands::Totals => {
            let items = store.load(&cli.list)?.unwrap_or_default();
            println!("Total spend: ${:.2}", aggregate::total_spend(&items));

            let totals = aggregate::nutrition_totals(&items);
            println!("Calories: {:.0}", totals.calories);
            println!(
                "Protein: {:.1}g  Carbs: {:.1}g  Sugar: {:.1}g  Fat: {:.1}g",
                totals.protein, totals.carbohydrates, totals.sugar, totals.fat
            );
        }
        Commands::Lists => {
            let names = store.names()?;
            if names.is_empty() {
                println!("No saved lists yet");
            }
            for name in names {
                println!("{name}");
            }
        }
        Commands::Remove { id } => {
            let mut session = Session::new();
            session.replace_items(
                cli.list.clone(),
                store.load(&cli.list)?.unwrap_or_default(),
            );
            let before = session.items().len();
            session.delete_item(id);
            if session.items().len() == before {
                bail!("no item {} in '{}'", id, cli.list);
            }
            store.save(session.list_name(), session.items())?;
            println!("Removed {id}");
        }
        Commands::DeleteList => {
            store.delete(&cli.list)?;
            println!("Deleted '{}'", cli.list);
        }
    }

    Ok(())
}

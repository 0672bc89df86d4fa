use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use savor_api::StorefrontClient;
use savor_store::{AuthStore, Cart, CartCoordinator, InMemoryAuthStore, LocalCartFile};
use savor_types::{CartItem, Product};
use tracing::info;

use crate::parse_role;

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let file = LocalCartFile::from_env();
    match matches.subcommand() {
        Some(("show", _)) => {
            print_items(&file.load()?.to_items());
            Ok(())
        }
        Some(("add", sub)) => add(file, sub).await,
        Some(("remove", sub)) => {
            let id = sub.get_one::<String>("id").context("product id is required")?;
            let mut coordinator = coordinator(file)?;
            coordinator.remove_item(id).await?;
            print_items(&coordinator.local_cart().to_items());
            Ok(())
        }
        Some(("clear", _)) => {
            file.save(&Cart::new())?;
            println!("Cart cleared");
            Ok(())
        }
        Some(("sync", sub)) => sync(file, sub).await,
        other => bail!("unsupported cart command: {:?}", other.map(|(name, _)| name)),
    }
}

/// Signed-out coordinator, so changes land in the guest cart file.
fn coordinator(file: LocalCartFile) -> Result<CartCoordinator> {
    let auth = Arc::new(InMemoryAuthStore::new());
    let client = StorefrontClient::new_from_env()?.with_token_source(auth.clone());
    Ok(CartCoordinator::new(auth, Arc::new(client), Some(file))?)
}

async fn add(file: LocalCartFile, matches: &ArgMatches) -> Result<()> {
    let id = matches.get_one::<String>("id").context("product id is required")?;
    let price = matches.get_one::<f64>("price").copied().context("price is required")?;
    let quantity = matches.get_one::<u32>("quantity").copied().unwrap_or(1);
    let product = Product {
        id: id.clone(),
        title: matches.get_one::<String>("title").cloned().unwrap_or_else(|| id.clone()),
        image: None,
        price,
        category: None,
    };

    let mut coordinator = coordinator(file)?;
    for _ in 0..quantity {
        coordinator.add_product(&product).await?;
    }
    print_items(&coordinator.local_cart().to_items());
    Ok(())
}

async fn sync(file: LocalCartFile, matches: &ArgMatches) -> Result<()> {
    let role = parse_role(matches)?.unwrap_or_default();
    let auth = Arc::new(InMemoryAuthStore::new());
    let client = Arc::new(StorefrontClient::new_from_env()?.with_token_source(auth.clone()));

    let credentials = client.demo_token(role).await.context("demo sign-in failed")?;
    info!(%role, user = %credentials.user.id, "signed in with demo account");
    auth.set_credentials(credentials);

    let mut coordinator = CartCoordinator::new(auth, client, Some(file))?;
    let remote = coordinator.reconcile_after_login().await?;
    println!("Remote cart after sync:");
    print_items(&remote);
    Ok(())
}

fn print_items(items: &[CartItem]) {
    if items.is_empty() {
        println!("Cart is empty");
        return;
    }
    for item in items {
        println!(
            "{:<12} {:<24} {:>3} x {:>8.2} = {:>9.2}",
            item.id, item.title, item.quantity, item.price, item.total_price
        );
    }
    let quantity: u32 = items.iter().map(|item| item.quantity).sum();
    let amount: f64 = items.iter().map(|item| item.total_price).sum();
    println!("{:<12} {:<24} {:>3}   {:>8} = {:>9.2}", "total", "", quantity, "", amount);
}

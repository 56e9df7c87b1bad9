use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use storefront::api::ApiError;
use storefront::app::{SharedStore, Storefront};
use storefront::config::{ApiConfig, ClientConfig, ConfigError};
use storefront::services::products::DEFAULT_PAGE_SIZE;
use storefront::storage::FileStore;
use storefront::types::{Address, ProductFilters};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("not signed in; run `storefront login` first")]
    NotAuthenticated,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Storefront API client")]
struct Cli {
    /// Overrides `STOREFRONT_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Overrides `STOREFRONT_STATE_DIR`.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(Credentials),
    Register(Credentials),
    Logout,
    Whoami,
    Refresh,
    Products(ProductsCommand),
    Cart(CartCommand),
    Orders(OrdersCommand),
    /// Compare 2 to 5 products.
    Compare {
        #[arg(required = true)]
        product_ids: Vec<String>,
    },
    Reviews(ReviewsCommand),
    Profile(ProfileCommand),
}

#[derive(Args, Debug)]
struct Credentials {
    email: String,
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProductsSubcommand {
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
    },
    Show {
        product_id: String,
    },
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Categories,
    Brands,
}

#[derive(Args, Debug)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Subcommand, Debug)]
enum CartSubcommand {
    Show,
    Add {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    Update {
        product_id: String,
        quantity: u32,
    },
    Remove {
        product_id: String,
    },
    Clear,
}

#[derive(Args, Debug)]
struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Subcommand, Debug)]
enum OrdersSubcommand {
    List,
    Show {
        order_id: String,
    },
    /// Place an order for the current cart.
    Create {
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        zip_code: String,
        #[arg(long, default_value = "US")]
        country: String,
        #[arg(long, default_value = "credit_card")]
        payment_method: String,
    },
}

#[derive(Args, Debug)]
struct ReviewsCommand {
    #[command(subcommand)]
    command: ReviewsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReviewsSubcommand {
    List {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Stats {
        product_id: String,
    },
    Create {
        product_id: String,
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Helpful {
        review_id: String,
    },
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Show,
    Preferences,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.api = ApiConfig::new(&url, config.api.timeouts)?;
    }
    if let Some(dir) = cli.state_dir {
        config.state_dir = dir;
    }

    let storage: SharedStore = Arc::new(FileStore::new(&config.state_dir));
    let app = Storefront::new(&config.api, storage)?;
    app.bootstrap().await;

    match cli.command {
        Command::Login(c) => print_json(&app.login(&c.email, &c.password).await?),
        Command::Register(c) => print_json(&app.register(&c.email, &c.password).await?),
        Command::Logout => {
            app.logout().await;
            print_json(&serde_json::json!({ "signedOut": true }))
        }
        Command::Whoami => {
            let session = app.session();
            print_json(&session.user().ok_or(CliError::NotAuthenticated)?)
        }
        Command::Refresh => {
            require_session(&app)?;
            app.refresh().await?;
            print_json(&serde_json::json!({ "refreshed": true }))
        }
        Command::Products(products) => run_products(&app, products.command).await,
        Command::Cart(cart) => {
            require_session(&app)?;
            run_cart(&app, cart.command).await
        }
        Command::Orders(orders) => {
            require_session(&app)?;
            run_orders(&app, orders.command).await
        }
        Command::Compare { product_ids } => {
            print_json(&app.services().comparison.compare(&product_ids).await?)
        }
        Command::Reviews(reviews) => run_reviews(&app, reviews.command).await,
        Command::Profile(profile) => {
            require_session(&app)?;
            let users = &app.services().users;
            match profile.command {
                ProfileSubcommand::Show => print_json(&users.profile().await?),
                ProfileSubcommand::Preferences => print_json(&users.preferences().await?),
            }
        }
    }
}

async fn run_products(app: &Storefront, command: ProductsSubcommand) -> Result<(), CliError> {
    let products = &app.services().products;
    match command {
        ProductsSubcommand::List { category, brand, min_price, max_price, search, page, limit } => {
            let filters = ProductFilters { category, brand, min_price, max_price, search_query: search };
            print_json(&products.list(&filters, page, limit).await?)
        }
        ProductsSubcommand::Show { product_id } => print_json(&products.get(&product_id).await?),
        ProductsSubcommand::Search { query, page } => print_json(&products.search(&query, page).await?),
        ProductsSubcommand::Categories => print_json(&products.categories().await?),
        ProductsSubcommand::Brands => print_json(&products.brands().await?),
    }
}

async fn run_cart(app: &Storefront, command: CartSubcommand) -> Result<(), CliError> {
    let cart = &app.services().cart;
    match command {
        CartSubcommand::Show => print_json(&cart.get().await?),
        CartSubcommand::Add { product_id, quantity } => print_json(&cart.add_item(&product_id, quantity).await?),
        CartSubcommand::Update { product_id, quantity } => {
            print_json(&cart.update_item(&product_id, quantity).await?)
        }
        CartSubcommand::Remove { product_id } => print_json(&cart.remove_item(&product_id).await?),
        CartSubcommand::Clear => {
            cart.clear().await?;
            print_json(&serde_json::json!({ "cleared": true }))
        }
    }
}

async fn run_orders(app: &Storefront, command: OrdersSubcommand) -> Result<(), CliError> {
    let orders = &app.services().orders;
    match command {
        OrdersSubcommand::List => print_json(&orders.list().await?),
        OrdersSubcommand::Show { order_id } => print_json(&orders.get(&order_id).await?),
        OrdersSubcommand::Create { street, city, state, zip_code, country, payment_method } => {
            let address = Address { street, city, state, zip_code, country };
            print_json(&orders.create(&address, &payment_method).await?)
        }
    }
}

async fn run_reviews(app: &Storefront, command: ReviewsSubcommand) -> Result<(), CliError> {
    let reviews = &app.services().reviews;
    match command {
        ReviewsSubcommand::List { product_id, page } => print_json(&reviews.for_product(&product_id, page).await?),
        ReviewsSubcommand::Stats { product_id } => print_json(&reviews.stats(&product_id).await?),
        ReviewsSubcommand::Create { product_id, rating, title, content } => {
            require_session(app)?;
            print_json(&reviews.create(&product_id, rating, &title, &content).await?)
        }
        ReviewsSubcommand::Helpful { review_id } => {
            require_session(app)?;
            print_json(&reviews.mark_helpful(&review_id).await?)
        }
    }
}

fn require_session(app: &Storefront) -> Result<(), CliError> {
    if app.session().is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotAuthenticated)
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

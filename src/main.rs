use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use property_admin::admin;
use property_admin::config::{self, StoreConfig};
use property_admin::filter::{ListingQuery, StatusFilter, TypeFilter};
use property_admin::models::{Listing, ListingDraft};
use property_admin::stats::{format_price, DashboardSummary};
use property_admin::store::memory::{DEMO_EMAIL, DEMO_PASSWORD};
use property_admin::store::{Credentials, ListingStore, MemoryStore, SupabaseStore};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "property-admin", version, about = "Manage real-estate listings")]
struct Cli {
    /// Use the built-in demo store instead of Supabase. It lives only for
    /// this run, so add/edit/delete changes are discarded on exit.
    #[arg(long, global = true)]
    offline: bool,

    /// Sign-in email (defaults to ADMIN_EMAIL)
    #[arg(long, global = true)]
    email: Option<String>,

    /// Sign-in password (defaults to ADMIN_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check credentials against the store
    Login,
    /// Totals, status breakdown and recent listings
    Dashboard {
        /// Also write the summary to dashboard.json
        #[arg(long)]
        json: bool,
    },
    /// List listings matching a search
    List {
        #[arg(long, default_value = "")]
        search: String,
        /// `all` or a status token (disponible, pendiente, vendido, alquilado)
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// `all` or a property type, matched exactly (form categories: Casa,
        /// Departamento, Monoambiente, Duplex, PH, Terreno, Local, Rural)
        #[arg(long = "type", default_value = "all")]
        property_type: TypeFilter,
    },
    /// Show one listing
    Show { id: String },
    /// Create a listing from a JSON draft
    Add {
        #[arg(long)]
        file: PathBuf,
    },
    /// Replace a listing's fields with a JSON draft
    Edit {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete a listing
    Delete { id: String },
}

impl Command {
    fn writes(&self) -> bool {
        matches!(self, Command::Add { .. } | Command::Edit { .. } | Command::Delete { .. })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let (store, credentials): (Box<dyn ListingStore>, Credentials) = if cli.offline {
        let credentials = Credentials::new(
            cli.email.unwrap_or_else(|| DEMO_EMAIL.to_string()),
            cli.password.unwrap_or_else(|| DEMO_PASSWORD.to_string()),
        );
        (Box::new(MemoryStore::demo()), credentials)
    } else {
        let store_config = StoreConfig::from_env()?;
        let credentials = config::credentials(cli.email, cli.password, |name| std::env::var(name).ok())?;
        (Box::new(SupabaseStore::new(store_config)?), credentials)
    };

    info!("🏠 Property Admin ({} store)", store.store_name());
    if cli.offline && cli.command.writes() {
        warn!("Offline store is in-memory; this change is discarded when the command exits");
    }

    let session = store
        .sign_in(&credentials)
        .await
        .context("Sign-in failed")?;
    let store = store.as_ref();

    match cli.command {
        Command::Login => {
            println!("Sesión iniciada como {}", session.email.as_deref().unwrap_or(&session.user_id));
        }
        Command::Dashboard { json } => {
            let summary = admin::dashboard(store, &session).await?;
            print_dashboard(&summary);
            if json {
                let out = serde_json::to_string_pretty(&summary)?;
                tokio::fs::write("dashboard.json", out).await?;
                info!("💾 Saved dashboard summary to dashboard.json");
            }
        }
        Command::List {
            search,
            status,
            property_type,
        } => {
            let query = ListingQuery::search(search)
                .with_status(status)
                .with_type(property_type);
            let listings = admin::search(store, &session, &query).await?;
            if listings.is_empty() {
                println!("No se encontraron propiedades");
            }
            for (i, listing) in listings.iter().enumerate() {
                print_summary_line(i + 1, listing);
            }
        }
        Command::Show { id } => {
            let listing = store.get_by_id(&session, &id).await?;
            print_listing(&listing);
        }
        Command::Add { file } => {
            let draft = read_draft(&file).await?;
            let listing = admin::create_listing(store, &session, &draft).await?;
            println!("Propiedad creada: {}", listing.id());
        }
        Command::Edit { id, file } => {
            // Load before reading the draft so a bad id fails first.
            store.get_by_id(&session, &id).await?;
            let draft = read_draft(&file).await?;
            admin::update_listing(store, &session, &id, &draft).await?;
            println!("Propiedad actualizada: {}", id);
        }
        Command::Delete { id } => {
            admin::delete_listing(store, &session, &id).await?;
            println!("Propiedad eliminada: {}", id);
        }
    }

    Ok(())
}

async fn read_draft(path: &Path) -> Result<ListingDraft> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a listing draft", path.display()))
}

fn print_dashboard(summary: &DashboardSummary) {
    println!("Total propiedades:      {}", summary.total_count);
    println!("Propiedades disponibles: {}", summary.available_count);
    println!("Valor total:            {}", format_price(summary.total_value));
    println!("Precio promedio:        {}", format_price(summary.average_price));
    println!();

    println!("Estado de propiedades");
    for share in &summary.statuses {
        println!("   {:<10} {:>3}% ({})", share.status.label(), share.percentage, share.count);
    }
    println!();

    println!("Tipos de propiedades");
    for category in &summary.categories {
        println!("   {:<13} {}", category.category, category.count);
    }
    println!();

    println!("Propiedades recientes");
    for (i, listing) in summary.recent.iter().enumerate() {
        print_summary_line(i + 1, listing);
    }
}

fn print_summary_line(n: usize, listing: &Listing) {
    let fields = &listing.fields;
    println!("{}. {} ({})", n, fields.title, format_price(fields.price));
    println!(
        "   {} · {} · {}",
        fields.location,
        fields.property_type,
        listing.status().label()
    );
    println!("   ID: {}", listing.id());
}

fn print_listing(listing: &Listing) {
    let fields = &listing.fields;
    println!("{}", fields.title);
    println!("   ID: {}", listing.id());
    println!("   Tipo: {}", fields.property_type);
    println!("   Estado: {}", listing.status().label());
    let place: Vec<&str> = [Some(fields.location.as_str()), fields.city.as_deref(), fields.state.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    println!("   Ubicación: {}", place.join(", "));
    println!("   Precio: {}", format_price(fields.price));
    println!(
        "   {} m² · {} ambientes · {} baños",
        fields.square_meters, fields.bedrooms, fields.bathrooms
    );
    if !fields.amenities.is_empty() {
        println!("   Comodidades: {}", fields.amenities.join(", "));
    }
    for image in &fields.images {
        println!("   Imagen: {}", image);
    }
    println!("   {}", fields.description);
    if let Some(created) = listing.created_at {
        println!("   Creada: {}", created.format("%Y-%m-%d %H:%M"));
    }
    if let Some(updated) = listing.updated_at {
        println!("   Actualizada: {}", updated.format("%Y-%m-%d %H:%M"));
    }
}

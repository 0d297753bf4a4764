use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use property_price_predictor::batch::predict_csv;
use property_price_predictor::request::{area_notices, suggested_rooms};
use property_price_predictor::schema::amenity_label;
use property_price_predictor::{format_price, AppConfig, PredictionRequest, Predictor};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Predict New Administrative Capital property prices from a trained model.
#[derive(Parser, Debug)]
#[command(name = "property-price")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, short = 'c', global = true, env = "PROPERTY_CONFIG")]
    config: Option<PathBuf>,

    /// Trained model artifact (overrides the config file)
    #[arg(long, global = true, env = "PROPERTY_MODEL_PATH")]
    model: Option<PathBuf>,

    /// Feature-column list (overrides the config file)
    #[arg(long, global = true, env = "PROPERTY_FEATURES_PATH")]
    features: Option<PathBuf>,

    /// Derive the feature list from a training CSV header (takes precedence over --features)
    #[arg(long, global = true)]
    features_from_csv: Option<PathBuf>,

    /// Currency label for displayed prices
    #[arg(long, global = true)]
    currency: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict the price of a single property
    Predict(PredictArgs),

    /// Score every row of a CSV file
    Batch {
        /// Listings to score
        input: PathBuf,
        /// Where to write the scored CSV
        #[arg(long, short = 'o', default_value = "predictions.csv")]
        output: PathBuf,
    },

    /// List the property types, locations, and amenities the model knows
    Schema,

    /// Show area warnings and typical room counts for an area
    Guidance {
        /// Area in square meters
        #[arg(long)]
        area: f64,
    },
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Property type, e.g. Apartment
    #[arg(long = "type")]
    property_type: String,

    /// Location, e.g. R7
    #[arg(long)]
    location: String,

    /// Area in square meters
    #[arg(long)]
    area: f64,

    #[arg(long)]
    bedrooms: u32,

    #[arg(long)]
    bathrooms: u32,

    /// Amenity column, repeatable (e.g. --amenity has_pool)
    #[arg(long = "amenity")]
    amenities: Vec<String>,
}

impl Cli {
    fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => AppConfig::default(),
        };
        if let Some(model) = &self.model {
            config = config.with_model_path(model);
        }
        if let Some(features) = &self.features {
            config = config.with_features_path(features);
        }
        if let Some(csv) = &self.features_from_csv {
            config = config.with_training_csv(csv);
        }
        if let Some(currency) = &self.currency {
            config = config.with_currency(currency);
        }
        Ok(config)
    }
}

fn load_predictor(config: &AppConfig) -> Result<Predictor> {
    Predictor::load(config).with_context(|| {
        format!(
            "failed to load model {} with features {}",
            config.model_path.display(),
            config.schema_source().display()
        )
    })
}

fn predict(config: &AppConfig, args: PredictArgs) -> Result<()> {
    let predictor = load_predictor(config)?;

    for notice in area_notices(args.area) {
        println!("warning: {notice}");
    }
    let rooms = suggested_rooms(args.area);
    if !rooms.allows(args.bedrooms, args.bathrooms) {
        println!(
            "note: {} sqm listings usually have {:?} bedrooms and {:?} bathrooms",
            args.area, rooms.bedrooms, rooms.bathrooms
        );
    }

    let request = PredictionRequest::new(
        args.property_type,
        args.location,
        args.area,
        args.bedrooms,
        args.bathrooms,
    )
    .with_amenities(args.amenities);

    let prediction = predictor.predict(&request)?;
    for warning in &prediction.warnings {
        println!("warning: {warning}");
    }
    println!(
        "Predicted Price: {}",
        format_price(prediction.price, &config.currency)
    );
    Ok(())
}

fn show_schema(config: &AppConfig) -> Result<()> {
    let predictor = load_predictor(config)?;
    let schema = predictor.schema();

    println!("Property types: {}", schema.property_types().join(", "));
    println!("Locations: {}", schema.locations().join(", "));
    println!("Amenities:");
    for column in schema.amenity_columns() {
        println!("  {column:<24} {}", amenity_label(column));
    }
    Ok(())
}

fn show_guidance(area: f64) {
    for notice in area_notices(area) {
        println!("warning: {notice}");
    }
    let rooms = suggested_rooms(area);
    println!("Bedrooms: {:?}", rooms.bedrooms);
    println!("Bathrooms: {:?}", rooms.bathrooms);
}

// Steps
// 1. Resolve configuration (file, then flags and environment)
// 2. Load the feature list and model once
// 3. Run the requested command against them
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("property_price_predictor=info,property_price=info")
        }))
        .init();

    let cli = Cli::parse();
    let config = cli.app_config()?;

    match cli.command {
        Commands::Predict(args) => predict(&config, args)?,
        Commands::Batch { input, output } => {
            let predictor = load_predictor(&config)?;
            let summary = predict_csv(&predictor, &input, &output)
                .with_context(|| format!("failed to score {}", input.display()))?;
            info!(
                "Batch complete: {} predicted, {} skipped",
                summary.predicted, summary.skipped
            );
        }
        Commands::Schema => show_schema(&config)?,
        Commands::Guidance { area } => show_guidance(area),
    }

    Ok(())
}

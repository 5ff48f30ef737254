use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use aws_marketplace_cli::config::{DEFAULT_DATA_DIR, DEFAULT_PAGE_SIZE};
use aws_marketplace_cli::report;
use aws_marketplace_cli::{AwsCatalog, CatalogSync, ProductSelection, SyncConfig, SyncError, Workspace};

#[derive(Parser, Debug)]
#[command(name = "aws-marketplace-cli")]
#[command(version, about = "Mirror AWS Marketplace catalog products to local YAML and push edits back as changesets")]
struct Args {
    /// Directory holding the local product mirror
    #[arg(long, global = true, value_name = "DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// AWS profile to load credentials from
    #[arg(long, global = true, value_name = "NAME")]
    profile: Option<String>,

    /// AWS region to send catalog requests to
    #[arg(long, global = true, value_name = "REGION")]
    region: Option<String>,

    /// Entities requested per list page
    #[arg(long, global = true, value_name = "N", default_value_t = DEFAULT_PAGE_SIZE,
          value_parser = clap::value_parser!(i32).range(1..=50))]
    page_size: i32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all my AWS Marketplace products of a given type, or 'all' for all types
    ///
    /// Valid product types are ServerProduct, ContainerProduct, DataProduct,
    /// MachinelearningProduct, SaaSProduct, ServiceProduct, SolutionProduct
    /// and SupportProduct.
    List {
        #[arg(value_name = "PRODUCT_TYPE")]
        product_type: String,
    },

    /// Dump marketplace catalog data for a product to its description YAML file
    Dump { product: String },

    /// Update a product's information from its local description YAML file
    Update {
        product: String,

        /// Print the changeset JSON to stdout without creating the changeset
        #[arg(long)]
        no_op: bool,
    },

    /// Dump every version of a product to its own YAML file
    DumpVersions { product: String },

    /// Push the local state of a product version's YAML file as a new version
    PushVersion {
        product: String,
        version: String,

        /// Print the changeset JSON to stdout without creating the changeset
        #[arg(long)]
        no_op: bool,
    },

    /// Copy the YAML data from the src version to the dst version
    Clone {
        product: String,
        src_version: String,
        dst_version: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("aws_marketplace_cli=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), SyncError> {
    let config = SyncConfig::default()
        .with_data_dir(args.data_dir)
        .with_page_size(args.page_size)
        .with_profile(args.profile)
        .with_region(args.region);

    match args.command {
        Command::List { product_type } => {
            let selection: ProductSelection = product_type.parse()?;
            let listing = connect(&config).await?.list(selection).await?;
            println!("{}", report::render_listing(&listing));
        }
        Command::Dump { product } => {
            let outcome = connect(&config).await?.dump(&product).await?;
            println!("{}", report::render_write(&outcome));
        }
        Command::Update { product, no_op } => {
            let outcome = connect(&config).await?.update(&product, no_op).await?;
            println!("{}", report::render_change_set(&outcome));
        }
        Command::DumpVersions { product } => {
            for outcome in connect(&config).await?.dump_versions(&product).await? {
                println!("{}", report::render_write(&outcome));
            }
        }
        Command::PushVersion {
            product,
            version,
            no_op,
        } => {
            let outcome = connect(&config).await?.push_version(&product, &version, no_op).await?;
            println!("{}", report::render_change_set(&outcome));
        }
        Command::Clone {
            product,
            src_version,
            dst_version,
        } => {
            // Local only, no AWS configuration needed
            let workspace = Workspace::new(config.data_dir.clone());
            let outcome = workspace.clone_version(&product, &src_version, &dst_version)?;
            println!("{}", report::render_clone(&product, &src_version, &outcome));
        }
    }

    Ok(())
}

async fn connect(config: &SyncConfig) -> Result<CatalogSync<AwsCatalog>, SyncError> {
    let sdk_config = config.load_sdk_config().await?;
    Ok(CatalogSync::new(
        AwsCatalog::new(&sdk_config, config.page_size),
        Workspace::new(config.data_dir.clone()),
    ))
}

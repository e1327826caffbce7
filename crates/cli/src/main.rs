use catalog_core::{
    constants::{DEFAULT_DATA_FILE, DEFAULT_UPLOADS_DIR},
    path_from_env_value, CatalogError, CoreConfig, Product, ProductFields, ProductRepository,
    UploadedImage,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Product catalog CLI")]
struct Cli {
    /// Base URL used to print absolute image URLs
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all products
    List,
    /// Show one product
    Show {
        /// Product id
        id: String,
    },
    /// Add a product
    Add {
        /// Product name
        nama: String,
        /// Product category
        kategori: String,
        /// Price, e.g. 19.99
        harga: String,
        /// Product description
        deskripsi: String,
        /// Path to the product image
        #[arg(long)]
        image: PathBuf,
    },
    /// Update a product; omitted fields keep their stored values
    Update {
        /// Product id
        id: String,
        #[arg(long)]
        nama: Option<String>,
        #[arg(long)]
        kategori: Option<String>,
        #[arg(long)]
        harga: Option<String>,
        #[arg(long)]
        deskripsi: Option<String>,
        /// Path to a replacement image
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a product and its image
    Delete {
        /// Product id
        id: String,
    },
}

fn open_repository() -> Result<ProductRepository, CatalogError> {
    let data_file =
        path_from_env_value(std::env::var("CATALOG_DATA_FILE").ok(), DEFAULT_DATA_FILE);
    let uploads_dir = path_from_env_value(
        std::env::var("CATALOG_UPLOADS_DIR").ok(),
        DEFAULT_UPLOADS_DIR,
    );
    let cfg = CoreConfig::new(data_file, uploads_dir)?;
    ProductRepository::open(Arc::new(cfg))
}

fn read_image(path: &Path) -> Result<UploadedImage, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    let upload = UploadedImage::new(bytes, file_name, None);
    upload.check()?;
    Ok(upload)
}

fn print_product(product: &Product) {
    println!(
        "ID: {}, Name: {}, Category: {}, Price: {}, Image: {}",
        product.id,
        product.name,
        product.category,
        product.price,
        product.image.as_deref().unwrap_or("-")
    );
    println!("  {}", product.description);
}

fn print_error(action: &str, err: &CatalogError) {
    match err {
        CatalogError::ValidationFailed(errors) => {
            eprintln!("Error {}: validation failed", action);
            for e in errors {
                eprintln!("  - {}", e);
            }
        }
        other => eprintln!("Error {}: {}", action, other),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'catalog --help' for commands");
        return Ok(());
    };

    let repository = open_repository()?;

    match command {
        Commands::List => match repository.list(&cli.base_url) {
            Ok(products) => products.iter().for_each(print_product),
            Err(CatalogError::NoProducts) => println!("No products found."),
            Err(e) => print_error("listing products", &e),
        },
        Commands::Show { id } => match repository.get(&id, &cli.base_url) {
            Ok(product) => print_product(&product),
            Err(e) => print_error("showing product", &e),
        },
        Commands::Add {
            nama,
            kategori,
            harga,
            deskripsi,
            image,
        } => {
            let upload = read_image(&image)?;
            let fields = ProductFields {
                name: Some(nama),
                category: Some(kategori),
                price: Some(harga),
                description: Some(deskripsi),
            };
            match repository.create(fields, Some(&upload)) {
                Ok(product) => println!("Created product with ID: {}", product.id),
                Err(e) => print_error("creating product", &e),
            }
        }
        Commands::Update {
            id,
            nama,
            kategori,
            harga,
            deskripsi,
            image,
        } => {
            let upload = image.as_deref().map(read_image).transpose()?;
            let fields = ProductFields {
                name: nama,
                category: kategori,
                price: harga,
                description: deskripsi,
            };
            match repository.update(&id, fields, upload.as_ref()) {
                Ok(product) => println!("Updated product with ID: {}", product.id),
                Err(e) => print_error("updating product", &e),
            }
        }
        Commands::Delete { id } => match repository.delete(&id) {
            Ok(()) => println!("Deleted product with ID: {}", id),
            Err(e) => print_error("deleting product", &e),
        },
    }

    Ok(())
}

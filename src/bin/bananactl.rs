use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use nano_banana_proxy::error::OperationError;
use nano_banana_proxy::gemini::GeneratedImage;
use nano_banana_proxy::service::{OperationInput, OperationOutput};
use nano_banana_proxy::utils::encode::{extension_for_media_type, media_type_for_path, EncodedAsset};
use nano_banana_proxy::{build_service, Config, Operation};

#[derive(Parser, Debug)]
#[command(name = "bananactl", about = "CLI for the Nano Banana image proxy", version)]
struct Cli {
    /// API key for the generation endpoint
    #[arg(global = true, long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override GEMINI_API_URL
    #[arg(global = true, long)]
    api_url: Option<String>,

    /// Directory generated images are written to
    #[arg(global = true, long, value_name = "DIR", default_value = "out")]
    out: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an image from text
    Generate {
        #[arg(long)]
        prompt: String,
    },
    /// Edit an existing image
    Edit {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        prompt: String,
    },
    /// Put a product on a person
    TryOn {
        #[arg(long)]
        product: PathBuf,
        #[arg(long)]
        person: PathBuf,
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Create ad variations from a model and a product shot
    Ads {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        product: PathBuf,
        #[arg(long)]
        prompt: Option<String>,
        /// Number of variations (clamped to 1..=3)
        #[arg(long, allow_negative_numbers = true)]
        variations: Option<i64>,
    },
    /// Merge several images into one
    Merge {
        /// Images to merge; only the first five are used
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Generate three scene variations
    Scenes {
        #[arg(long)]
        scene: PathBuf,
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Restore an old or damaged photo
    Restore {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        prompt: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env and parse CLI
    Config::dotenv_load();
    let cli = Cli::parse();

    let mut conf = Config::new()?;
    if let Some(url) = cli.api_url {
        conf.api_url = url;
    }
    let service = build_service(&conf)?;

    let mut input = OperationInput { api_key: cli.api_key, ..Default::default() };
    let op = match cli.command {
        Commands::Generate { prompt } => {
            input.prompt = Some(prompt);
            Operation::Generate
        }
        Commands::Edit { file, prompt } => {
            input.prompt = Some(prompt);
            attach(&mut input, "file", &file).await?;
            Operation::Edit
        }
        Commands::TryOn { product, person, prompt } => {
            input.prompt = prompt;
            attach(&mut input, "product", &product).await?;
            attach(&mut input, "person", &person).await?;
            Operation::VirtualTryOn
        }
        Commands::Ads { model, product, prompt, variations } => {
            input.prompt = prompt;
            input.variations = variations;
            attach(&mut input, "model", &model).await?;
            attach(&mut input, "product", &product).await?;
            Operation::CreateAds
        }
        Commands::Merge { files, prompt } => {
            input.prompt = prompt;
            for file in &files {
                attach(&mut input, "files", file).await?;
            }
            Operation::MergeImages
        }
        Commands::Scenes { scene, prompt } => {
            input.prompt = prompt;
            attach(&mut input, "scene", &scene).await?;
            Operation::GenerateScenes
        }
        Commands::Restore { file, prompt } => {
            input.prompt = prompt;
            attach(&mut input, "file", &file).await?;
            Operation::RestoreOldImage
        }
    };

    let images = match service.run(op, input).await {
        Ok(OperationOutput::Single(image)) => vec![image],
        Ok(OperationOutput::Batch(outcome)) => {
            for failure in &outcome.failures {
                eprintln!("Variant {} failed: {}", failure.index + 1, failure.reason);
            }
            if outcome.results.is_empty() {
                eprintln!("No variants produced an image");
                std::process::exit(1);
            }
            outcome.results
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(if matches!(e, OperationError::Generation(_)) { 1 } else { 2 });
        }
    };

    tokio::fs::create_dir_all(&cli.out).await?;
    for (i, image) in images.iter().enumerate() {
        let path = save_image(&cli.out, op, i + 1, image).await?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

async fn attach(input: &mut OperationInput, field: &str, path: &Path) -> std::io::Result<()> {
    let file = tokio::fs::File::open(path).await?;
    let asset = EncodedAsset::read_from(file, media_type_for_path(path)).await?;
    input.add_file(field, asset);
    Ok(())
}

async fn save_image(
    dir: &Path,
    op: Operation,
    n: usize,
    image: &GeneratedImage,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let asset = EncodedAsset { data: image.data.clone(), media_type: image.media_type.clone() };
    let bytes = asset.decode()?;
    let path = dir.join(format!("{}-{}.{}", op.key(), n, extension_for_media_type(&image.media_type)));
    tokio::fs::write(&path, &bytes).await?;
    Ok(path)
}

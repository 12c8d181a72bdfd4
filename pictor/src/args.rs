use std::path::PathBuf;

use clap::Parser;
use pictor_config::BackendKind;
use pictor_imagegen::GenerationInputs;

/// Pictor image generator
#[derive(Debug, Parser)]
#[command(name = "pictor", about = "Generate images from a text prompt with OpenAI or Hugging Face")]
pub struct Args {
    /// Text prompt describing the image
    pub prompt: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "pictor.toml", env = "PICTOR_CONFIG")]
    pub config: PathBuf,

    /// Override the secrets file from the configuration
    #[arg(long, env = "PICTOR_SECRETS")]
    pub secrets: Option<PathBuf>,

    /// Backend to generate with (`openai` or `huggingface`)
    #[arg(short, long)]
    pub backend: Option<BackendKind>,

    /// Output size: an OpenAI size such as `1536x1024` or `auto`, or
    /// `WIDTHxHEIGHT` for Hugging Face
    #[arg(short, long)]
    pub size: Option<String>,

    /// Number of images to generate
    #[arg(short = 'n', long, default_value_t = 1, allow_negative_numbers = true)]
    pub count: i64,

    /// Hugging Face model id
    #[arg(short, long)]
    pub model: Option<String>,

    /// Hugging Face inference steps
    #[arg(long, allow_negative_numbers = true)]
    pub steps: Option<i64>,

    /// Hugging Face guidance scale
    #[arg(long)]
    pub guidance: Option<f32>,

    /// Directory generated images are written to
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Show vendor error text as-is instead of guidance messages
    #[arg(long)]
    pub raw_errors: bool,

    /// Log filter directive, e.g. `pictor_imagegen=debug`
    #[arg(long, env = "PICTOR_LOG")]
    pub log_filter: Option<String>,
}

impl Args {
    /// User inputs for one generation action
    pub fn inputs(&self) -> GenerationInputs {
        GenerationInputs {
            prompt: self.prompt.clone(),
            size: self.size.clone(),
            count: self.count,
            model: self.model.clone(),
            steps: self.steps,
            guidance_scale: self.guidance,
        }
    }
}

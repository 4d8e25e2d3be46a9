use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::{Engine, FenceMode, MalformedPolicy};

#[derive(Parser)]
#[command(name = "docsai")]
#[command(about = "Document source files with a hosted generative-AI model")]
#[command(version)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to the config file (defaults to ~/docsai.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Document code files using a generative AI model
    Document {
        /// File or files to document
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Replace each file with the documented version
        #[arg(long, overrides_with = "no_replace")]
        replace: bool,

        /// Write to a doc_-prefixed sibling file instead (default)
        #[arg(long)]
        no_replace: bool,

        /// Language for the documentation
        #[arg(long, default_value = "english")]
        language: String,

        /// Strip the first and last response line unconditionally instead
        /// of detecting fence markers
        #[arg(long)]
        always_strip: bool,

        /// Skip a file whose response carries no code instead of aborting
        /// the batch
        #[arg(long)]
        skip_malformed: bool,
    },

    /// Store the API key for the model service
    Config {
        /// API key for Gemini
        #[arg(long)]
        api_key: String,

        /// Configuration path
        #[arg(long)]
        config_path: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Document {
                files,
                replace,
                no_replace,
                language,
                always_strip,
                skip_malformed,
            } => {
                let replace = replace && !no_replace;
                let fence_mode = if always_strip {
                    FenceMode::Always
                } else {
                    FenceMode::Detect
                };
                let malformed_policy = if skip_malformed {
                    MalformedPolicy::SkipFile
                } else {
                    MalformedPolicy::Abort
                };

                engine
                    .document(files, replace, &language, fence_mode, malformed_policy)
                    .await
            }
            Commands::Config {
                api_key,
                config_path,
            } => engine.configure(&api_key, config_path),
        }
    }
}

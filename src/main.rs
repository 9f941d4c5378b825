//! aws-wrapper - command line access to the S3 and SQS helpers

use anyhow::Context;
use aws_wrapper::config::{Config, LoggingConfig};
use aws_wrapper::logging::init_subscriber;
use aws_wrapper::s3::{UploadOptions, UploadSource};
use aws_wrapper::AwsWrapper;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// aws-wrapper - S3 uploads with sane defaults and SQS access by queue name
#[derive(Parser, Debug)]
#[command(name = "aws-wrapper")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file. Without it the AWS default provider chain is used.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print collected metrics in the Prometheus text format after the command
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Object storage commands
    #[command(subcommand)]
    S3(S3Command),

    /// Queue commands
    #[command(subcommand)]
    Sqs(SqsCommand),
}

#[derive(Subcommand, Debug)]
enum S3Command {
    /// Print the public URL of an object
    Url { path: String },

    /// Print an object's contents
    Cat { path: String },

    /// Delete an object
    Rm { path: String },

    /// Upload a local file, creating the bucket if needed
    Upload {
        /// Destination as <bucket>/<key>
        path: String,
        /// Local file to upload
        file: PathBuf,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        acl: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum SqsCommand {
    /// Send a JSON message
    Push { queue: String, message: String },

    /// Receive one message and print it as JSON
    Pop {
        queue: String,
        /// Delete the message after printing it
        #[arg(long)]
        delete: bool,
    },

    /// Delete a message by receipt handle
    Ack { queue: String, receipt_handle: String },

    /// Remove every message from a queue
    Purge { queue: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => Some(
            Config::load(path).with_context(|| format!("Failed to load config {:?}", path))?,
        ),
        None => None,
    };

    let mut logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(LoggingConfig::default);
    if let Some(level) = args.log_level {
        logging.level = level;
    }
    logging.json |= args.json_logs;
    init_subscriber(&logging)?;

    info!("Starting aws-wrapper v{}", aws_wrapper::VERSION);

    let aws = match config {
        Some(ref config) => AwsWrapper::new(&config.aws)?,
        None => AwsWrapper::from_env().await,
    };

    let result = match args.command {
        Command::S3(command) => run_s3(&aws, command).await,
        Command::Sqs(command) => run_sqs(&aws, command).await,
    };

    if args.metrics {
        print!("{}", aws_wrapper::metrics::render());
    }
    result
}

async fn run_s3(aws: &AwsWrapper, command: S3Command) -> anyhow::Result<()> {
    match command {
        S3Command::Url { path } => {
            println!("{}", aws.s3.url(&path));
        }
        S3Command::Cat { path } => {
            print!("{}", aws.s3.get_file_contents(&path).await?);
        }
        S3Command::Rm { path } => {
            aws.s3.delete_file(&path).await?;
        }
        S3Command::Upload {
            path,
            file,
            content_type,
            acl,
        } => {
            let options = UploadOptions { content_type, acl };
            let result = aws
                .s3
                .upload(&path, UploadSource::Path(file), options)
                .await?;
            println!("{}", result.url);
        }
    }

    Ok(())
}

async fn run_sqs(aws: &AwsWrapper, command: SqsCommand) -> anyhow::Result<()> {
    match command {
        SqsCommand::Push { queue, message } => {
            let message: serde_json::Value =
                serde_json::from_str(&message).context("Message must be valid JSON")?;
            let receipt = aws.sqs.push_message(&queue, &message).await?;
            println!("{}", serde_json::to_string(&receipt)?);
        }
        SqsCommand::Pop { queue, delete } => match aws.sqs.get_message(&queue).await? {
            Some(message) => {
                println!("{}", serde_json::to_string(&message)?);
                if delete {
                    aws.sqs
                        .delete_message(&queue, &message.receipt_handle)
                        .await?;
                }
            }
            None => info!(queue = %queue, "No message available"),
        },
        SqsCommand::Ack {
            queue,
            receipt_handle,
        } => {
            aws.sqs.delete_message(&queue, &receipt_handle).await?;
        }
        SqsCommand::Purge { queue } => {
            aws.sqs.purge_queue(&queue).await?;
        }
    }

    Ok(())
}

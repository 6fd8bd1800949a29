//! CLI entry point for anae-site

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "anae-site")]
#[command(version)]
#[command(about = "Content and contact backend for the ANAE association website", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List blog content for a locale
    List {
        /// Type of content to list (post, tag, slug)
        #[arg(default_value = "post")]
        r#type: String,

        /// Locale to list (defaults to the site's default locale)
        #[arg(short, long)]
        locale: Option<String>,

        /// Include draft posts
        #[arg(long)]
        drafts: bool,
    },

    /// Create a new blog entry
    New {
        /// Title of the new entry
        title: String,

        /// Locale of the new entry (defaults to the site's default locale)
        #[arg(short, long)]
        locale: Option<String>,

        /// Directory name of the entry (defaults to the slugified title)
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// Generate sitemap.xml
    Sitemap {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "anae_site=debug,info"
    } else {
        "anae_site=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            let site = anae_site::Site::new(&base_dir)?;
            tracing::info!(
                "Serving {:?} (locales: {})",
                site.content_dir,
                site.config.locales.join(", ")
            );
            anae_site::server::start(&site, &ip, port).await?;
        }

        Commands::List {
            r#type,
            locale,
            drafts,
        } => {
            let site = anae_site::Site::new(&base_dir)?;
            let locale = locale.unwrap_or_else(|| site.config.default_locale.clone());
            anae_site::commands::list::run(&site, &r#type, &locale, drafts)?;
        }

        Commands::New {
            title,
            locale,
            slug,
        } => {
            let site = anae_site::Site::new(&base_dir)?;
            let locale = locale.unwrap_or_else(|| site.config.default_locale.clone());
            tracing::info!("Creating new entry with title: {}", title);
            let path =
                anae_site::commands::new::create_post(&site, &title, &locale, slug.as_deref())?;
            println!("Created: {}", path.display());
        }

        Commands::Sitemap { output } => {
            let site = anae_site::Site::new(&base_dir)?;
            anae_site::commands::sitemap::run(&site, output.as_deref())?;
        }

        Commands::Version => {
            println!("anae-site {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

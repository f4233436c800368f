//! Showcase Viewer - a self-contained GitHub profile showcase
//!
//! # Usage
//! ```bash
//! showcase-viewer octocat           # Start server for a profile
//! showcase-viewer octocat --open    # Start and open browser
//! showcase-viewer octocat --python python3.12
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use rust_embed::Embed;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use showcase_viewer::app::AppState;
use showcase_viewer::github::GithubClient;
use showcase_viewer::routes;
use showcase_viewer::sandbox::PythonLoader;

/// Embedded frontend static files
#[derive(Embed)]
#[folder = "assets"]
struct Assets;

/// Showcase Viewer - Browse a GitHub profile's projects in your browser
#[derive(Parser)]
#[command(name = "showcase-viewer")]
#[command(about = "A self-contained GitHub profile showcase", long_about = None)]
struct Cli {
    /// GitHub login whose profile and repositories to showcase
    #[arg(value_name = "LOGIN")]
    login: String,

    /// Open browser automatically after starting
    #[arg(short, long)]
    open: bool,

    /// Port to run the server on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Python interpreter used by the code sandbox
    #[arg(long, default_value = "python3")]
    python: String,

    /// Timeout in seconds for GitHub API requests
    #[arg(long, default_value = "30")]
    timeout: u64,
}

/// Serve embedded static files
async fn serve_static(req: Request<Body>) -> Response<Body> {
    let path = req.uri().path().trim_start_matches('/');

    // Default to index.html for root or non-file paths (SPA routing)
    let path = if path.is_empty() || !path.contains('.') {
        "index.html"
    } else {
        path
    };

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(content.data.into_owned()))
                .unwrap()
        }
        None => match Assets::get("index.html") {
            Some(content) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/html")
                .body(Body::from(content.data.into_owned()))
                .unwrap(),
            None => Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Body::from("Not Found"))
                .unwrap(),
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (quieter for production)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = match GithubClient::new(Duration::from_secs(cli.timeout)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(
        cli.login.clone(),
        client,
        Box::new(PythonLoader::new(cli.python.clone())),
    ));

    // Fetch profile + repos up front; either failure aborts startup.
    if let Err(e) = state.load().await {
        eprintln!("✗ Failed to load profile for {}: {}", cli.login, e);
        std::process::exit(1);
    }

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router with API routes and static file serving
    let app = Router::new()
        .merge(routes::create_router(state))
        .fallback(get(serve_static))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Bind to the port
    let addr = format!("127.0.0.1:{}", cli.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to port {}: {}", cli.port, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    let url = format!("http://127.0.0.1:{}", cli.port);
    println!();
    println!("  ┌─────────────────────────────────────────────┐");
    println!("  │              Showcase Viewer                │");
    println!("  └─────────────────────────────────────────────┘");
    println!();
    println!("  Profile: {}", cli.login);
    println!("  Server:  {}", url);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    // Open browser if requested
    if cli.open {
        if let Err(e) = open::that(&url) {
            eprintln!("  Warning: Could not open browser: {}", e);
        }
    }

    // Set up graceful shutdown
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

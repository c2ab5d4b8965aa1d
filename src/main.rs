//! # Press Brief
//!
//! An HTTP service that turns corporate press releases into analyst
//! briefs. Clients submit either a single press-release URL or a
//! company's news-listing base URL plus a date range; the service
//! scrapes the page(s), summarizes release content through an
//! OpenAI-compatible LLM API, streams the result back, and can export
//! finished summaries as Word documents.
//!
//! ## Endpoints
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/scrape-and-summarize` | Scrape one URL, stream the summary |
//! | `POST /api/scrape-and-summarize-batch` | Same, single JSON response |
//! | `POST /api/batch-summarize` | Concurrent fan-out over selected URLs |
//! | `POST /api/scrape-base-url` | Date-bounded listing crawl |
//! | `POST /api/generate-docx` | Export a summary as `.docx` |
//! | `GET /health` | Liveness probe |
//!
//! ## Architecture
//!
//! Each request is handled by one independent task; nothing is shared
//! across requests beyond the immutable HTTP clients. The listing crawl
//! fetches pages strictly sequentially with a politeness delay, while
//! the batch endpoint fans out one summarization round trip per selected
//! release.

use std::time::Duration;

use actix_web::{App, HttpServer, middleware, web};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod crawler;
mod dates;
mod filter;
mod models;
mod outputs;
mod routes;
mod scrapers;
mod utils;

use api::SummaryClient;
use cli::Cli;
use scrapers::PageClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    info!(bind = %args.bind, model = %args.model, "press_brief starting up");

    let pages = PageClient::new(Duration::from_millis(args.page_delay_ms));
    let llm = SummaryClient::new(args.api_base, args.openrouter_api_key, args.model);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pages.clone()))
            .app_data(web::Data::new(llm.clone()))
            .wrap(middleware::Logger::default())
            .service(routes::health)
            .service(routes::scrape_and_summarize)
            .service(routes::scrape_and_summarize_batch)
            .service(routes::batch_summarize)
            .service(routes::scrape_base_url)
            .service(routes::generate_docx)
    })
    .bind(&args.bind)?
    .run()
    .await
}

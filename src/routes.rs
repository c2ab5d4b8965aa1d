//! HTTP handlers for the press_brief API.
//!
//! Error mapping follows one rule: invalid client input answers `400`
//! with a JSON `{error}` body, upstream failures answer `500`. Failures
//! inside an already-open summary stream are reported in-band as a
//! `data: {"error": ...}` line, since the response status is long gone.

use actix_web::{HttpResponse, Responder, get, post, web};
use bytes::Bytes;
use futures::{Stream, StreamExt, future};
use serde_json::json;
use tracing::{error, info};

use crate::api::{SummaryClient, SummaryStream, analyst_prompt};
use crate::crawler::crawl;
use crate::models::{
    BatchSummarizeRequest, BatchSummary, CrawlRequest, CrawlResponse, ExportRequest,
    PressReleaseEntry, SummarizeRequest,
};
use crate::outputs::docx::summary_to_docx;
use crate::scrapers::PageClient;
use crate::scrapers::article::extract_article_text;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[get("/health")]
pub async fn health() -> impl Responder {
    web::Json(json!({ "status": "ok" }))
}

/* ---------------- single-URL summarization (streaming) ---------------- */

#[post("/api/scrape-and-summarize")]
pub async fn scrape_and_summarize(
    payload: web::Json<SummarizeRequest>,
    pages: web::Data<PageClient>,
    llm: web::Data<SummaryClient>,
) -> impl Responder {
    let Some(url) = payload.into_inner().url else {
        return HttpResponse::BadRequest().json(json!({ "error": "URL is required" }));
    };

    info!(%url, "Scraping URL for summarization");
    let html = match pages.fetch_html(&url).await {
        Ok(html) => html,
        Err(e) => {
            error!(error = %e, %url, "Scrape failed");
            return HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }));
        }
    };

    let Some(content) = extract_article_text(&html) else {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "No meaningful content found on the page" }));
    };
    info!(bytes = content.len(), "Extracted article content");

    let chunks = match llm.summarize_stream(&analyst_prompt(&content)).await {
        Ok(chunks) => chunks,
        Err(e) => {
            error!(error = %e, "Failed to open completion stream");
            return HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }));
        }
    };

    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(sse_body(chunks))
}

/// Re-emit decoded completion chunks as SSE-style lines.
///
/// The client tearing down its connection drops this stream, which drops
/// the underlying response body on every exit path.
fn sse_body(mut chunks: SummaryStream) -> impl Stream<Item = Result<Bytes, actix_web::Error>> {
    async_stream::stream! {
        while let Some(next) = chunks.next().await {
            match next {
                Ok(chunk) if chunk.done => {
                    yield Ok(Bytes::from("data: [DONE]\n\n"));
                    break;
                }
                Ok(chunk) => {
                    if !chunk.delta.is_empty() {
                        let line = format!("data: {}\n\n", json!({ "content": chunk.delta }));
                        yield Ok(Bytes::from(line));
                    }
                }
                Err(e) => {
                    error!(error = %e, "Streaming error");
                    let line = format!("data: {}\n\n", json!({ "error": e.to_string() }));
                    yield Ok(Bytes::from(line));
                    break;
                }
            }
        }
    }
}

/* ---------------- single-URL summarization (non-streaming) ---------------- */

#[post("/api/scrape-and-summarize-batch")]
pub async fn scrape_and_summarize_batch(
    payload: web::Json<SummarizeRequest>,
    pages: web::Data<PageClient>,
    llm: web::Data<SummaryClient>,
) -> impl Responder {
    let Some(url) = payload.into_inner().url else {
        return HttpResponse::BadRequest().json(json!({ "error": "URL is required" }));
    };

    let html = match pages.fetch_html(&url).await {
        Ok(html) => html,
        Err(e) => {
            error!(error = %e, %url, "Scrape failed");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": e.to_string() }));
        }
    };

    let Some(content) = extract_article_text(&html) else {
        return HttpResponse::BadRequest()
            .json(json!({ "success": false, "error": "No meaningful content found on the page" }));
    };

    match llm.summarize(&analyst_prompt(&content)).await {
        Ok(summary) => HttpResponse::Ok().json(json!({ "success": true, "summary": summary })),
        Err(e) => {
            error!(error = %e, %url, "Summarization failed");
            HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": e.to_string() }))
        }
    }
}

/* ---------------- batch fan-out over selected releases ---------------- */

/// Scrape and summarize one URL end to end. Used by the batch fan-out,
/// where any failure becomes a per-item placeholder instead of an HTTP
/// error.
async fn summarize_url(pages: &PageClient, llm: &SummaryClient, url: &str) -> anyhow::Result<String> {
    let html = pages.fetch_html(url).await?;
    let content = extract_article_text(&html)
        .ok_or_else(|| anyhow::anyhow!("No meaningful content found on the page"))?;
    llm.summarize(&analyst_prompt(&content)).await
}

#[post("/api/batch-summarize")]
pub async fn batch_summarize(
    payload: web::Json<BatchSummarizeRequest>,
    pages: web::Data<PageClient>,
    llm: web::Data<SummaryClient>,
) -> impl Responder {
    let urls = match payload.into_inner().urls {
        Some(urls) if !urls.is_empty() => urls,
        _ => return HttpResponse::BadRequest().json(json!({ "error": "URLs are required" })),
    };

    info!(count = urls.len(), "Batch summarization fan-out");
    let tasks = urls.into_iter().map(|url| {
        let pages = pages.clone();
        let llm = llm.clone();
        async move {
            let summary = match summarize_url(&pages, &llm, &url).await {
                Ok(summary) => summary,
                Err(e) => {
                    error!(error = %e, %url, "Batch item failed");
                    format!("Error: {e}")
                }
            };
            BatchSummary { url, summary }
        }
    });
    let results = future::join_all(tasks).await;

    HttpResponse::Ok().json(json!({ "success": true, "results": results }))
}

/* ---------------- base-URL crawl ---------------- */

#[post("/api/scrape-base-url")]
pub async fn scrape_base_url(
    payload: web::Json<CrawlRequest>,
    pages: web::Data<PageClient>,
) -> impl Responder {
    let spec = match payload.validate() {
        Ok(spec) => spec,
        Err(message) => return HttpResponse::BadRequest().json(json!({ "error": message })),
    };

    let outcome = crawl(pages.get_ref(), &spec).await;
    let entries: Vec<PressReleaseEntry> = outcome.items.into_iter().map(Into::into).collect();

    HttpResponse::Ok().json(CrawlResponse {
        success: true,
        total_found: entries.len(),
        press_releases: entries,
        year_range: spec.year_range(),
        date_range: spec.date_range(),
        pages_scrapped: outcome.pages_scrapped,
    })
}

/* ---------------- document export ---------------- */

#[post("/api/generate-docx")]
pub async fn generate_docx(payload: web::Json<ExportRequest>) -> impl Responder {
    let request = payload.into_inner();
    let Some(summary) = request.summary.filter(|summary| !summary.is_empty()) else {
        return HttpResponse::BadRequest().json(json!({ "error": "Summary is required" }));
    };

    match summary_to_docx(&summary, request.url.as_deref()) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(DOCX_CONTENT_TYPE)
            .insert_header((
                "Content-Disposition",
                r#"attachment; filename="press-release-summary.docx""#,
            ))
            .body(bytes),
        Err(e) => {
            error!(error = %e, "Docx generation failed");
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to generate document" }))
        }
    }
}

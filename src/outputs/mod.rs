//! Output formats for finished summaries.
//!
//! Summaries leave the service two ways: streamed back as SSE-style lines
//! (handled at the route layer) or exported as a Word document for
//! distribution. The document builder lives in [`docx`].

pub mod docx;

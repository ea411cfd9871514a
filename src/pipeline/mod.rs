//! Pipeline stages for turning a scanned PDF into transcript files.
//!
//! Each submodule implements exactly one step. Only `request` knows about
//! the wire; every other stage goes through it.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ poll ──▶ extract ──▶ write
//! (POST)     (GET)    (pure)      (fs)
//!    └────────┴── request (429 back-off)
//! ```
//!
//! 1. [`request`]: the [`request::Transport`] seam plus the bounded 429 retry loop
//! 2. [`upload`] : multipart `POST /documents`, returns the job id
//! 3. [`poll`]   : `GET /documents/{id}` until the job reports `processed`
//! 4. [`extract`]: reshape `results` into a page-number → text mapping
//! 5. [`write`]  : raw JSON, page JSON and merged transcript on disk

pub mod extract;
pub mod poll;
pub mod request;
pub mod upload;
pub mod write;

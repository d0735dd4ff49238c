//! Pipeline stages for resume analysis.
//!
//! Each submodule implements exactly one step. The orchestrator in
//! [`crate::analyze`] sequences them; the checklist lives in
//! [`crate::checklist`] because it is pure and has no collaborators.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ checklist ─────────────────────────────┐
//! (path/URL) (pdfium)  (rule table)                            ├──▶ PipelineReport
//!                  └──▶ request ──▶ service ──▶ validate ──────┘
//!                       (prompt)    (LLM call)  (JSON payload)
//! ```
//!
//! 1. [`input`]    — load the bytes and the declared media type
//! 2. [`extract`]  — page text via pdfium; runs in `spawn_blocking`
//! 3. [`request`]  — substitute the text into the prompt template
//! 4. [`service`]  — the one network call of the run
//! 5. [`validate`] — find the payload in the reply and type it

pub mod extract;
pub mod input;
pub mod request;
pub mod service;
pub mod validate;

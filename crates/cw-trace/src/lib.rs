//! `cw-trace` — observers that record the world's event trace.
//!
//! The determinism contract is judged on the dispatch stream: one row per
//! actor event, `(time, actor, label, priority)`, in dispatch order.  Two
//! runs from the same seed must produce byte-identical traces.  This crate
//! provides the two sinks the kernel's own tooling needs: an in-memory
//! vector for test assertions and a CSV writer for offline diffing.

pub mod csv_sink;
pub mod error;
pub mod row;
pub mod vec_sink;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use csv_sink::CsvTraceWriter;
pub use error::{TraceError, TraceResult};
pub use row::TraceRow;
pub use vec_sink::VecSink;

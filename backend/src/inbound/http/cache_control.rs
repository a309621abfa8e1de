//! Shared cache-control policies for HTTP handlers.

/// Responses that must never be stored by browsers or intermediaries.
pub const NO_STORE: &str = "no-store";

/// Build the cache-control header tuple for uncacheable responses.
///
/// Lookup results carry their own refresh deadline server-side, so clients
/// are told not to keep a copy that could outlive it.
pub const fn no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", NO_STORE)
}

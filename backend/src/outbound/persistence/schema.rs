//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a migration
//! changes the table, regenerate with `diesel print-schema` or edit by hand.

diesel::table! {
    /// Last known weather per city.
    ///
    /// One row per city, replaced in place on every refresh. `next_update` is
    /// the instant after which the row must be re-fetched.
    current_weather (city) {
        /// Primary key: case-sensitive city name.
        city -> Text,
        /// Provider condition text, or `Unknown` for placeholders.
        weather -> Text,
        /// Provider temperature in its native unit.
        temperature -> Double,
        /// Refresh deadline.
        next_update -> Timestamptz,
    }
}

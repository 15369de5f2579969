//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered user accounts.
    ///
    /// `email` carries the `users_email_key` unique constraint.
    users (id) {
        /// Primary key assigned by the sequence.
        id -> Int8,
        /// Display name (2 to 100 characters).
        #[max_length = 100]
        name -> Varchar,
        /// Unique login email.
        #[max_length = 320]
        email -> Varchar,
        /// Argon2id PHC string; never leaves the persistence layer.
        #[max_length = 255]
        password_hash -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

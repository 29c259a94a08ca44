//! Versioned SQL DDL applied at startup.
//!
//! Each migration runs at most once, inside its own transaction. Applied
//! versions are recorded in `_migrations` so restarts skip them.

/// A single schema migration. Versions must be unique and strictly
/// increasing.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

/// Ledger of applied migrations.
pub const MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS _migrations (
    version BIGINT PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        sql: r#"
CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    username VARCHAR(50) NOT NULL,
    email VARCHAR(100) NOT NULL,
    full_name VARCHAR(100) NULL,
    hashed_password VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX idx_users_username ON users(username);
CREATE UNIQUE INDEX idx_users_email ON users(email);
"#,
    },
    Migration {
        version: 2,
        name: "create_roles",
        sql: r#"
CREATE TABLE roles (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(50) NOT NULL UNIQUE,
    description TEXT NULL
);
"#,
    },
    Migration {
        version: 3,
        name: "add_user_bio",
        sql: r#"
ALTER TABLE users ADD COLUMN bio TEXT NULL;
"#,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_unique_and_increasing() {
        for pair in MIGRATIONS.windows(2) {
            assert!(
                pair[0].version < pair[1].version,
                "migration {} must precede {}",
                pair[0].version,
                pair[1].version
            );
        }
    }

    #[test]
    fn migrations_are_named_and_non_empty() {
        for m in MIGRATIONS {
            assert!(!m.name.is_empty());
            assert!(!m.sql.trim().is_empty());
        }
    }
}

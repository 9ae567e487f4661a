// Iris app records: measurements and users.

use crate::db::{is_unique_violation, StoreError};
use anyhow::{anyhow, Context, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// IRIS
// ============================================================================

/// One labelled flower from the Iris dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Iris {
    #[serde(default)]
    pub rowid: i64,
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
    pub species: String,
}

impl std::fmt::Display for Iris {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Iris: <{}, {}, {}, {}, {}>",
            self.sepal_length, self.sepal_width, self.petal_length, self.petal_width, self.species
        )
    }
}

pub fn load_iris_csv(csv_path: &Path) -> Result<Vec<Iris>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open iris CSV file")?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let iris: Iris = result.context("Failed to deserialize iris row")?;
        rows.push(iris);
    }

    Ok(rows)
}

pub fn insert_iris(conn: &Connection, iris: &Iris) -> Result<i64> {
    conn.execute(
        "INSERT INTO iris (sepal_length, sepal_width, petal_length, petal_width, species)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            iris.sepal_length,
            iris.sepal_width,
            iris.petal_length,
            iris.petal_width,
            iris.species,
        ],
    )
    .context("Failed to insert iris")?;

    Ok(conn.last_insert_rowid())
}

pub fn insert_irises(conn: &Connection, rows: &[Iris]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    for iris in rows {
        insert_iris(&tx, iris)?;
    }
    tx.commit()?;

    tracing::info!(inserted = rows.len(), "iris rows imported");
    Ok(rows.len())
}

pub fn get_all_iris(conn: &Connection) -> Result<Vec<Iris>> {
    let mut stmt = conn.prepare(
        "SELECT rowid, sepal_length, sepal_width, petal_length, petal_width, species
         FROM iris ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Iris {
                rowid: row.get(0)?,
                sepal_length: row.get(1)?,
                sepal_width: row.get(2)?,
                petal_length: row.get(3)?,
                petal_width: row.get(4)?,
                species: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

// ============================================================================
// USER
// ============================================================================

/// A login. The password only ever exists here as an argon2 PHC string.
#[derive(Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    password_hash: String,
}

impl User {
    /// Create a user, hashing the plain text password straight away.
    pub fn new(email: &str, password: &str) -> Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {}", e))?
            .to_string();

        Ok(User {
            id: 0,
            email: email.to_string(),
            password_hash,
        })
    }

    /// Checks the text matches the hashed password.
    pub fn check_password(&self, password: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(user_id = self.id, "stored password hash is unreadable: {}", e);
                false
            }
        }
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

// Never print the hash
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User: <{}, {}>", self.id, self.email)
    }
}

/// Store a new user and return its id. A taken email yields [`StoreError::Duplicate`].
pub fn insert_user(conn: &Connection, user: &User) -> Result<i64> {
    let result = conn.execute(
        r#"INSERT INTO "user" (email, password) VALUES (?1, ?2)"#,
        params![user.email, user.password_hash],
    );

    match result {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate {
            entity: "User",
            key: user.email.clone(),
        }
        .into()),
        Err(e) => Err(e).context("Failed to insert user"),
    }
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            r#"SELECT id, email, password FROM "user" WHERE email = ?1"#,
            params![email],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

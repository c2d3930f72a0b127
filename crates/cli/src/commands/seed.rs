//! Seed the database with users and products from a YAML file.
//!
//! Importing replaces all existing data in a single transaction, so a
//! failure part way leaves the database as it was. Products are owned by
//! the first admin user in the file.
//!
//! ```yaml
//! users:
//!   - name: Admin User
//!     email: admin@example.com
//!     password: "123456"
//!     isAdmin: true
//! products:
//!   - name: Airpods Wireless Bluetooth Headphones
//!     image: /images/airpods.jpg
//!     brand: Apple
//!     category: Electronics
//!     description: Bluetooth technology
//!     price: 89.99
//!     countInStock: 10
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use proshop_api::db::{Database, PgDatabase};
use proshop_api::models::{NewProduct, NewUser, SeedData};
use proshop_api::services::auth::{MIN_PASSWORD_LENGTH, hash_password};
use proshop_core::Email;

use super::{CommandError, connect};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub products: Vec<NewProduct>,
}

impl SeedFile {
    /// Parse and validate a seed document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the data breaks an
    /// account rule.
    pub fn parse(content: &str) -> Result<Self, CommandError> {
        let file: Self = serde_yaml::from_str(content)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<(), CommandError> {
        let invalid = |msg: String| Err(CommandError::InvalidSeed(msg));

        let mut seen = HashSet::new();
        for user in &self.users {
            let email = Email::parse(&user.email)
                .map_err(|e| CommandError::InvalidSeed(format!("{}: {e}", user.email)))?;
            if !seen.insert(email) {
                return invalid(format!("duplicate email {}", user.email));
            }
            if user.name.trim().is_empty() {
                return invalid(format!("{}: name is required", user.email));
            }
            if user.password.chars().count() < MIN_PASSWORD_LENGTH {
                return invalid(format!(
                    "{}: password must be at least {MIN_PASSWORD_LENGTH} characters",
                    user.email
                ));
            }
        }

        if !self.products.is_empty() && self.owner().is_none() {
            return invalid("products need at least one admin user".to_owned());
        }
        Ok(())
    }

    /// Index of the user that owns the seeded products.
    fn owner(&self) -> Option<usize> {
        self.users.iter().position(|u| u.is_admin)
    }

    /// Hash passwords and normalize emails into storable records.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidSeed` if an email or password is unusable.
    pub fn into_data(self) -> Result<SeedData, CommandError> {
        let users = self
            .users
            .into_iter()
            .map(|user| {
                let email = Email::parse(&user.email).map_err(|e| CommandError::InvalidSeed(e.to_string()))?;
                let password_hash =
                    hash_password(&user.password).map_err(|e| CommandError::InvalidSeed(e.to_string()))?;
                Ok(NewUser {
                    name: user.name,
                    email,
                    password_hash,
                    is_admin: user.is_admin,
                })
            })
            .collect::<Result<Vec<_>, CommandError>>()?;

        Ok(SeedData {
            users,
            products: self.products,
        })
    }
}

/// Replace all data with the contents of `path`.
///
/// # Errors
///
/// Returns an error if the file is invalid or any database write fails.
pub async fn import(path: &Path) -> Result<(), CommandError> {
    info!(path = %path.display(), "Loading seed file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed = SeedFile::parse(&content)?;
    info!(users = seed.users.len(), products = seed.products.len(), "Parsed seed file");

    let data = seed.into_data()?;

    let db = PgDatabase::new(connect().await?);
    let summary = db.replace_all(data).await.map_err(|e| {
        error!(error = %e, "Seeding failed, existing data left untouched");
        e
    })?;

    info!("Seeding complete!");
    info!("  Users inserted: {}", summary.users);
    info!("  Products inserted: {}", summary.products);
    Ok(())
}

/// Delete every review, product and user.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn destroy() -> Result<(), CommandError> {
    let db = PgDatabase::new(connect().await?);
    db.destroy_all().await?;
    info!("Data destroyed!");
    Ok(())
}

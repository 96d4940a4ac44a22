//! # Customer Repository
//!
//! Deduplicated customer contacts. Phone is the natural key: a credit
//! origination for a phone number that already exists refreshes the stored
//! contact (last write wins) instead of creating a duplicate.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use caja_core::types::Customer;
use caja_core::validation::validate_credit_customer;

use crate::error::StoreResult;
use crate::repository::new_id;

const CUSTOMER_COLUMNS: &str = "id, name, phone, address, notes, created_at, updated_at";

/// Contact details captured at the register.
#[derive(Debug, Clone)]
pub struct ContactDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub notes: Option<String>,
}

/// Repository for customer contacts.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by phone number.
    pub async fn get_by_phone(&self, phone: &str) -> StoreResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists all customers, most recently updated first.
    pub async fn list(&self) -> StoreResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY updated_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets or creates a customer by phone, refreshing the contact fields.
    ///
    /// Runs on a borrowed connection so the credit-origination flow can
    /// call it inside its transaction.
    pub(crate) async fn upsert_by_phone(
        conn: &mut SqliteConnection,
        details: &ContactDetails,
    ) -> StoreResult<Customer> {
        validate_credit_customer(&details.name, &details.phone)
            .map_err(caja_core::CoreError::from)?;

        let now = Utc::now();
        let existing = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?1"
        ))
        .bind(details.phone.trim())
        .fetch_optional(&mut *conn)
        .await?;

        match existing {
            Some(mut customer) => {
                debug!(id = %customer.id, "Refreshing existing customer");

                sqlx::query(
                    r#"
                    UPDATE customers
                    SET name = ?2, address = ?3, notes = ?4, updated_at = ?5
                    WHERE id = ?1
                    "#,
                )
                .bind(&customer.id)
                .bind(details.name.trim())
                .bind(&details.address)
                .bind(&details.notes)
                .bind(now)
                .execute(&mut *conn)
                .await?;

                customer.name = details.name.trim().to_string();
                customer.address = details.address.clone();
                customer.notes = details.notes.clone();
                customer.updated_at = now;
                Ok(customer)
            }

            None => {
                let customer = Customer {
                    id: new_id(),
                    name: details.name.trim().to_string(),
                    phone: details.phone.trim().to_string(),
                    address: details.address.clone(),
                    notes: details.notes.clone(),
                    created_at: now,
                    updated_at: now,
                };

                debug!(id = %customer.id, "Creating customer");

                sqlx::query(
                    r#"
                    INSERT INTO customers (id, name, phone, address, notes, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                )
                .bind(&customer.id)
                .bind(&customer.name)
                .bind(&customer.phone)
                .bind(&customer.address)
                .bind(&customer.notes)
                .bind(customer.created_at)
                .bind(customer.updated_at)
                .execute(&mut *conn)
                .await?;

                Ok(customer)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};

    fn maria() -> ContactDetails {
        ContactDetails {
            name: "Maria Lopez".to_string(),
            phone: "555-0101".to_string(),
            address: "12 Market St".to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_refreshes() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();

        let mut conn = store.pool().acquire().await.unwrap();
        let first = CustomerRepository::upsert_by_phone(&mut conn, &maria())
            .await
            .unwrap();

        // Same phone, new address: same row, refreshed fields.
        let mut updated = maria();
        updated.address = "99 Harbor Rd".to_string();
        let second = CustomerRepository::upsert_by_phone(&mut conn, &updated)
            .await
            .unwrap();
        drop(conn);

        assert_eq!(first.id, second.id);
        assert_eq!(second.address, "99 Harbor Rd");

        let all = store.customers().list().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_requires_name_and_phone() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let mut conn = store.pool().acquire().await.unwrap();

        let mut bad = maria();
        bad.phone = "  ".to_string();
        assert!(CustomerRepository::upsert_by_phone(&mut conn, &bad)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_get_by_phone() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let mut conn = store.pool().acquire().await.unwrap();
        CustomerRepository::upsert_by_phone(&mut conn, &maria())
            .await
            .unwrap();
        drop(conn);

        let repo = store.customers();
        assert!(repo.get_by_phone("555-0101").await.unwrap().is_some());
        assert!(repo.get_by_phone("555-9999").await.unwrap().is_none());
    }
}

use diesel::connection::{AnsiTransactionManager, SimpleConnection, TransactionManager};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use failsafe::backoff::EqualJittered;
use failsafe::failure_policy::{ConsecutiveFailures, OrElse, SuccessRateOverTimeWindow};
use failsafe::{CircuitBreaker, Config, StateMachine};

use crate::errors::StoreError;
use crate::schema::{
    category, food, ingredient, nutritional_info, recipe, recipe_category, recipe_ingredient,
};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

pub type CircuitBreakerType = StateMachine<
    OrElse<SuccessRateOverTimeWindow<EqualJittered>, ConsecutiveFailures<EqualJittered>>,
    (),
>;

const CREATE_TABLES: &str = include_str!("../migrations/2024-03-01-000000_create_catalog/up.sql");
const DROP_TABLES: &str = include_str!("../migrations/2024-03-01-000000_create_catalog/down.sql");

/// Turns on foreign key enforcement for every pooled connection. SQLite
/// leaves it off per connection unless asked.
#[derive(Debug, Clone, Copy)]
struct ForeignKeys;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ForeignKeys {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

pub fn establish_pool(database_url: &str, max_size: u32) -> Result<DbPool, StoreError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ForeignKeys))
        .build(manager)?;
    Ok(pool)
}

/// Creates any missing tables.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    conn.batch_execute(CREATE_TABLES)?;
    Ok(())
}

/// Runs a write. The outermost write takes the database write lock up front
/// with `BEGIN IMMEDIATE`, so two pooled connections never both hold a read
/// lock waiting to upgrade. A write nested inside another becomes a
/// savepoint of the enclosing transaction.
pub fn write_transaction<T, F>(conn: &mut SqliteConnection, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError>,
{
    let depth = AnsiTransactionManager::transaction_manager_status_mut(conn).transaction_depth()?;
    match depth {
        Some(_) => conn.transaction(f),
        None => conn.immediate_transaction(f),
    }
}

/// Drops every table and creates them again.
pub fn reset(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    write_transaction(conn, |conn| {
        conn.batch_execute(DROP_TABLES)?;
        conn.batch_execute(CREATE_TABLES)?;
        Ok(())
    })
}

/// Deletes all rows while keeping the tables, association tables first.
pub fn clear(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    write_transaction(conn, |conn| {
        diesel::delete(recipe_category::table).execute(conn)?;
        diesel::delete(recipe_ingredient::table).execute(conn)?;
        diesel::delete(nutritional_info::table).execute(conn)?;
        diesel::delete(recipe::table).execute(conn)?;
        diesel::delete(food::table).execute(conn)?;
        diesel::delete(ingredient::table).execute(conn)?;
        diesel::delete(category::table).execute(conn)?;
        Ok(())
    })
}

/// Outcome of a storage call made through the circuit breaker.
#[derive(Debug)]
pub enum StoreCallError {
    /// The breaker is open; the call was not attempted.
    Rejected,
    Failed(StoreError),
}

/// Handle shared by request handlers: the connection pool guarded by a
/// circuit breaker. Cloning is cheap.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
    breaker: CircuitBreakerType,
}

impl Store {
    pub fn new(pool: DbPool) -> Self {
        Store {
            pool,
            breaker: Config::new().build(),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Checks out one connection for the duration of `f`. Only storage
    /// failures are recorded by the breaker; domain errors pass through.
    pub fn run<F, T>(&self, f: F) -> Result<T, StoreCallError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError>,
    {
        let pool = &self.pool;
        let result = self.breaker.call_with(
            |err: &StoreError| err.is_infrastructure(),
            || {
                let mut conn = pool.get()?;
                f(&mut *conn)
            },
        );
        match result {
            Ok(value) => Ok(value),
            Err(failsafe::Error::Inner(err)) => Err(StoreCallError::Failed(err)),
            Err(failsafe::Error::Rejected) => {
                log::warn!("storage call rejected by the circuit breaker");
                Err(StoreCallError::Rejected)
            }
        }
    }
}

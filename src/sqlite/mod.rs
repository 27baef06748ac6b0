// SQLite driver for the execution layer:
// - config: bb8 connection manager and pool construction
// - params: SqlValue -> rusqlite value conversion
// - query: row extraction and result-set building
// - executor: select / execute / batch on a checked-out connection

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::{SharedSqliteConnection, SqliteManager, SqlitePool};
pub use executor::{execute, execute_batch, select};
pub use query::build_result_set;

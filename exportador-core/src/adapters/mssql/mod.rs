//! SQL Server adapter built on tiberius.
//!
//! One adapter implements every database-facing trait of the pipeline:
//! view provisioning, row retrieval, table discovery and connection tests.
//! Each operation opens its own connection and drops it when done.
//!
//! # Security
//! - The password is read from [`SecretPassword::expose`] only while the
//!   driver configuration is built
//! - Errors name server and database, never credentials
//!
//! [`SecretPassword::expose`]: crate::security::SecretPassword::expose

mod address;
mod values;

pub use address::{ServerAddress, parse_server};
pub use values::{cell_to_text, row_to_data_row};

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::models::{DataRow, DatabaseViewDefinition};
use crate::security::ConnectionParameters;
use crate::services::{ConnectionTester, DataRetrieval, SchemaManagement, TableDiscovery};
use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info, warn};

type SqlClient = Client<Compat<TcpStream>>;

/// SQL Server adapter; stateless apart from its configuration.
#[derive(Debug, Clone)]
pub struct SqlServerAdapter {
    config: ExportConfig,
}

impl SqlServerAdapter {
    /// Creates an adapter using the driver options of `config`.
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Builds the driver configuration for `params`.
    ///
    /// # Errors
    /// Returns a configuration error when the server name cannot be parsed.
    pub fn driver_config(&self, params: &ConnectionParameters) -> crate::Result<Config> {
        let address = parse_server(params.server(), self.config.port)?;

        let mut config = Config::new();
        config.host(&address.host);
        config.port(address.port);
        if let Some(instance) = &address.instance {
            config.instance_name(instance);
        }
        config.database(params.database());
        config.authentication(AuthMethod::sql_server(
            params.user(),
            params.password().expose(),
        ));
        if self.config.trust_server_certificate {
            config.trust_cert();
        }
        config.application_name("exportador");

        Ok(config)
    }

    /// Opens a connection, bounded by the configured connect timeout.
    async fn connect(&self, params: &ConnectionParameters) -> crate::Result<SqlClient> {
        let config = self.driver_config(params)?;
        let target = params.to_string();

        let connecting = async {
            let tcp = TcpStream::connect_named(&config)
                .await
                .map_err(|e| ExportError::connection_failed(format!("Unable to reach {target}"), e))?;
            tcp.set_nodelay(true)
                .map_err(|e| ExportError::connection_failed(format!("Unable to reach {target}"), e))?;

            Client::connect(config, tcp.compat_write())
                .await
                .map_err(|e| ExportError::connection_failed(format!("Login to {target} failed"), e))
        };

        match tokio::time::timeout(self.config.connect_timeout, connecting).await {
            Ok(client) => {
                debug!(server = %target, "Connection opened");
                client
            }
            Err(elapsed) => Err(ExportError::connection_failed(
                format!(
                    "Timed out after {}s connecting to {target}",
                    self.config.connect_timeout.as_secs()
                ),
                elapsed,
            )),
        }
    }

    /// Runs a batch that returns no rows.
    async fn run_batch(client: &mut SqlClient, sql: &str) -> crate::Result<()> {
        client
            .simple_query(sql)
            .await
            .map_err(|e| ExportError::query_failed(e.to_string()))?
            .into_results()
            .await
            .map_err(|e| ExportError::query_failed(e.to_string()))?;
        Ok(())
    }
}

/// Brackets one identifier part, doubling any closing bracket.
fn quote_identifier(part: &str) -> String {
    format!("[{}]", part.replace(']', "]]"))
}

/// `schema.table` → `[schema].[table]`; unqualified → `[table]`.
pub fn format_table_name(table_name: &str) -> String {
    match table_name.split_once('.') {
        Some((schema, table)) => format!("{}.{}", quote_identifier(schema), quote_identifier(table)),
        None => {
            warn!(
                table = table_name,
                "Table name has no schema, relying on the default schema"
            );
            quote_identifier(table_name)
        }
    }
}

/// `SELECT <columns> FROM <table>`, with `*` for a blank column list.
pub fn build_select(table_name: &str, columns: &str) -> String {
    let columns = if columns.trim().is_empty() { "*" } else { columns };
    format!("SELECT {columns} FROM {}", format_table_name(table_name))
}

/// Drop-if-exists batch for a view.
pub fn drop_view_sql(view_name: &str) -> String {
    let literal = view_name.replace('\'', "''");
    format!("IF OBJECT_ID('{literal}', 'V') IS NOT NULL DROP VIEW {view_name};")
}

#[async_trait]
impl SchemaManagement for SqlServerAdapter {
    async fn create_or_alter_view(
        &self,
        params: &ConnectionParameters,
        view: &DatabaseViewDefinition,
    ) -> crate::Result<()> {
        let mut client = self.connect(params).await?;

        Self::run_batch(&mut client, &drop_view_sql(view.view_name())).await?;
        debug!(view = view.view_name(), "Dropped view if it existed");

        let create = format!(
            "CREATE VIEW {} AS {}",
            view.view_name(),
            view.sql_definition()
        );
        Self::run_batch(&mut client, &create).await?;
        info!(view = view.view_name(), "View created");
        Ok(())
    }

    async fn execute_sql_command(&self, params: &ConnectionParameters, sql: &str) -> crate::Result<()> {
        let mut client = self.connect(params).await?;
        debug!(sql, "Executing command");
        Self::run_batch(&mut client, sql).await
    }
}

#[async_trait]
impl DataRetrieval for SqlServerAdapter {
    async fn get_data_from_table(
        &self,
        params: &ConnectionParameters,
        table_name: &str,
        columns: &str,
    ) -> crate::Result<Vec<DataRow>> {
        if table_name.trim().is_empty() {
            return Err(ExportError::configuration("Table name cannot be empty."));
        }

        let query = build_select(table_name, columns);
        let mut client = self.connect(params).await?;
        debug!(table = table_name, query = %query, "Querying table");

        let rows = client
            .simple_query(query.as_str())
            .await
            .map_err(|e| ExportError::query_failed(format!("Failed to read '{table_name}': {e}")))?
            .into_first_result()
            .await
            .map_err(|e| ExportError::query_failed(format!("Failed to read '{table_name}': {e}")))?;

        let data: Vec<DataRow> = rows.iter().map(row_to_data_row).collect();
        info!(table = table_name, rows = data.len(), "Table data retrieved");
        Ok(data)
    }
}

#[async_trait]
impl TableDiscovery for SqlServerAdapter {
    async fn get_table_names(
        &self,
        params: &ConnectionParameters,
        like_pattern: &str,
    ) -> crate::Result<Vec<String>> {
        let mut client = self.connect(params).await?;

        let rows = client
            .query(
                "SELECT TABLE_SCHEMA + '.' + TABLE_NAME
                 FROM INFORMATION_SCHEMA.TABLES
                 WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_NAME LIKE @P1
                 ORDER BY TABLE_SCHEMA, TABLE_NAME",
                &[&like_pattern],
            )
            .await
            .map_err(|e| ExportError::query_failed(e.to_string()))?
            .into_first_result()
            .await
            .map_err(|e| ExportError::query_failed(e.to_string()))?;

        let tables: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get::<&str, _>(0).map(str::to_string))
            .collect();

        info!(pattern = like_pattern, count = tables.len(), "Table discovery finished");
        Ok(tables)
    }
}

#[async_trait]
impl ConnectionTester for SqlServerAdapter {
    async fn test_connection(&self, params: &ConnectionParameters) -> crate::Result<()> {
        let mut client = self.connect(params).await?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| ExportError::query_failed(e.to_string()))?
            .into_results()
            .await
            .map_err(|e| ExportError::query_failed(e.to_string()))?;
        info!(server = %params, "Connection test succeeded");
        Ok(())
    }
}

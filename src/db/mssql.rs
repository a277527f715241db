use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, Row};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use super::SqlBackend;
use crate::config::DatasourceConfig;

type TdsClient = Client<Compat<TcpStream>>;

/// One SQL Server connection with the lifetime of a single request.
/// Opened read-only, encryption off with the server certificate trusted
/// (the databases this fronts use self-signed certs).
pub struct MssqlBackend {
    client: Mutex<Option<TdsClient>>,
    schema: String,
}

impl MssqlBackend {
    pub async fn connect(datasource: &DatasourceConfig) -> Result<Self> {
        let mut config = Config::new();
        config.host(&datasource.host);
        config.port(datasource.port);
        config.database(&datasource.database);
        config.authentication(AuthMethod::sql_server(
            &datasource.username,
            &datasource.password,
        ));
        config.readonly(true);
        config.encryption(EncryptionLevel::NotSupported);
        config.trust_cert();

        let tcp = TcpStream::connect(config.get_addr()).await?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write()).await?;
        info!(
            "Connected to {}:{}/{}",
            datasource.host, datasource.port, datasource.database
        );

        Ok(Self {
            client: Mutex::new(Some(client)),
            schema: datasource.schema.clone(),
        })
    }
}

#[async_trait]
impl SqlBackend for MssqlBackend {
    async fn run_query(&self, sql: &str) -> Result<String> {
        debug!("Running query: {}", sql);
        let mut guard = self.client.lock().await;
        let client = guard
            .as_mut()
            .ok_or_else(|| anyhow!("connection already closed"))?;

        let stream = client.simple_query(sql).await?;
        let results = stream.into_results().await?;

        let rows: Vec<Value> = results
            .into_iter()
            .flatten()
            .map(row_to_json)
            .collect();

        Ok(serde_json::to_string(&rows)?)
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut guard = self.client.lock().await;
        let client = guard
            .as_mut()
            .ok_or_else(|| anyhow!("connection already closed"))?;

        let stream = client
            .query(
                "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
                 WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_SCHEMA = @P1 \
                 ORDER BY TABLE_NAME",
                &[&self.schema.as_str()],
            )
            .await?;
        let rows = stream.into_first_result().await?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get::<&str, _>(0).map(|s| s.to_string()))
            .collect())
    }

    async fn describe_table(&self, table: &str) -> Result<String> {
        let mut guard = self.client.lock().await;
        let client = guard
            .as_mut()
            .ok_or_else(|| anyhow!("connection already closed"))?;

        let stream = client
            .query(
                "SELECT COLUMN_NAME, DATA_TYPE FROM INFORMATION_SCHEMA.COLUMNS \
                 WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2 \
                 ORDER BY ORDINAL_POSITION",
                &[&self.schema.as_str(), &table],
            )
            .await?;
        let rows = stream.into_first_result().await?;

        if rows.is_empty() {
            return Ok(format!("no such table: {}", table));
        }

        let columns: Vec<Value> = rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "column": row.get::<&str, _>(0).unwrap_or_default(),
                    "type": row.get::<&str, _>(1).unwrap_or_default(),
                })
            })
            .collect();

        Ok(serde_json::to_string(&columns)?)
    }

    async fn close(&self) -> Result<()> {
        let client = self.client.lock().await.take();
        if let Some(client) = client {
            client.close().await?;
            info!("Database connection closed");
        }
        Ok(())
    }
}

fn row_to_json(row: Row) -> Value {
    let names: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    let mut object = serde_json::Map::new();
    for (name, data) in names.into_iter().zip(row.into_iter()) {
        object.insert(name, column_to_json(data));
    }
    Value::Object(object)
}

fn column_to_json(data: ColumnData<'_>) -> Value {
    match data {
        ColumnData::U8(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::Bit(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::String(v) => v
            .map(|s| Value::String(s.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Guid(v) => v
            .map(|g| Value::String(g.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::Numeric(v) => v.map(|n| Value::from(f64::from(n))).unwrap_or(Value::Null),
        // Dates, binary and the rest show up rarely in answers; a debug
        // rendering keeps them readable for the model.
        other => Value::String(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_values_render_as_json() {
        assert_eq!(column_to_json(ColumnData::I32(Some(9))), Value::from(9));
        assert_eq!(column_to_json(ColumnData::I32(None)), Value::Null);
        assert_eq!(
            column_to_json(ColumnData::String(Some("pedido".into()))),
            Value::from("pedido")
        );
        assert_eq!(column_to_json(ColumnData::Bit(Some(true))), Value::from(true));
    }
}

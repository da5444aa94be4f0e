//! Redis Backend Module
//!
//! `CacheBackend` implementation over a shared, lazily established Redis
//! connection.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::cache::backend::{effective_ttl, BackendError, BackendResult, CacheBackend};

/// Upper bound for establishing the connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound for a single command round trip
const COMMAND_TIMEOUT: Duration = Duration::from_secs(1);

/// Reconnect attempts made by the manager before a call gives up
const CONNECT_RETRIES: usize = 1;

/// Keys requested per SCAN round trip
const SCAN_BATCH: usize = 250;

// == Redis Backend ==
/// Redis transport.
///
/// The connection is opened on first use, once, and shared by every caller.
/// A failed attempt leaves the gate empty so the next call retries.
pub struct RedisBackend {
    client: Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisBackend {
    /// Creates a backend for the given URL without connecting.
    pub fn new(url: &str) -> BackendResult<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> BackendResult<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(CONNECT_RETRIES)
                    .set_connection_timeout(CONNECT_TIMEOUT)
                    .set_response_timeout(COMMAND_TIMEOUT);
                let manager = with_timeout(
                    CONNECT_TIMEOUT,
                    ConnectionManager::new_with_config(self.client.clone(), config),
                )
                .await?;
                info!("Connected to Redis");
                Ok::<_, BackendError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

async fn with_timeout<T, F>(limit: Duration, fut: F) -> BackendResult<T>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(BackendError::from),
        Err(_) => Err(BackendError::Timeout(limit)),
    }
}

/// Escapes glob metacharacters so the prefix matches literally.
fn glob_escape(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = with_timeout(COMMAND_TIMEOUT, conn.get(key)).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> BackendResult<()> {
        let mut conn = self.connection().await?;
        let ttl_secs = effective_ttl(ttl).as_secs();
        with_timeout(COMMAND_TIMEOUT, conn.set_ex::<_, _, ()>(key, value, ttl_secs)).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> BackendResult<bool> {
        let mut conn = self.connection().await?;
        let deleted: i64 = with_timeout(COMMAND_TIMEOUT, conn.del(key)).await?;
        Ok(deleted > 0)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> BackendResult<Vec<String>> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", glob_escape(prefix));

        // SCAN instead of KEYS so a large keyspace never blocks the server
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = with_timeout(
                COMMAND_TIMEOUT,
                redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async(&mut conn),
            )
            .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(pattern = %pattern, count = keys.len(), "Scanned Redis keys");
        Ok(keys)
    }

    async fn is_connected(&self) -> bool {
        let Ok(mut conn) = self.connection().await else {
            return false;
        };
        let pong: BackendResult<String> =
            with_timeout(COMMAND_TIMEOUT, redis::cmd("PING").query_async(&mut conn)).await;
        pong.is_ok()
    }

    async fn info(&self) -> BackendResult<String> {
        let mut conn = self.connection().await?;
        let info: String =
            with_timeout(COMMAND_TIMEOUT, redis::cmd("INFO").query_async(&mut conn)).await?;
        Ok(info)
    }
}

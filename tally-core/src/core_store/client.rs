//! Remote key-value store client
//!
//! One client owns one lazily-established connection, shared behind a
//! mutex. Every failed attempt discards the handle so the next attempt
//! dials fresh; a fixed backoff separates attempts and the last error
//! propagates once the retry budget is spent.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::StoreConfig;

use super::errors::{StoreError, StoreResult};
use super::resp::{encode_command, read_reply, Reply};
use super::Store;

type Connection = BufStream<TcpStream>;

pub struct RemoteStore {
    config: StoreConfig,
    conn: Mutex<Option<Connection>>,
}

impl RemoteStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(None),
        }
    }

    /// Plain lookup; store trouble propagates to the caller
    pub async fn fetch(&self, key: &str) -> StoreResult<Option<String>> {
        match self.execute(&["GET", key]).await? {
            Reply::Bulk(value) => Ok(Some(value)),
            Reply::Nil => Ok(None),
            other => Err(StoreError::Protocol(format!(
                "unexpected GET reply: {other:?}"
            ))),
        }
    }

    /// Write a value that expires after `ttl`
    pub async fn put_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let seconds = ttl.as_secs().to_string();
        match self.execute(&["SETEX", key, &seconds, value]).await? {
            Reply::Simple(_) => Ok(()),
            other => Err(StoreError::Protocol(format!(
                "unexpected SETEX reply: {other:?}"
            ))),
        }
    }

    /// Run one command under the retry policy. The connection lock is held
    /// across the whole operation, so attempts from concurrent calls never
    /// interleave on the wire.
    async fn execute(&self, args: &[&str]) -> StoreResult<Reply> {
        let mut conn = self.conn.lock().await;
        let attempts = self.config.retries.max(1);
        let mut last_err = None;

        for attempt in 1..=attempts {
            match self.attempt(&mut conn, args).await {
                Ok(reply) => return Ok(reply),
                Err(err) => {
                    debug!(
                        attempt,
                        command = args.first().copied().unwrap_or(""),
                        error = %err,
                        "store attempt failed"
                    );
                    *conn = None;
                    last_err = Some(err);
                    if attempt < attempts {
                        sleep(self.config.retry_backoff).await;
                    }
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| StoreError::Protocol("retry loop made no attempt".to_string())))
    }

    /// One attempt: connect when there is no live handle, write the
    /// command, read one reply. `-ERR` answers count as failed attempts.
    async fn attempt(&self, conn: &mut Option<Connection>, args: &[&str]) -> StoreResult<Reply> {
        if conn.is_none() {
            *conn = Some(self.connect().await?);
        }
        let Some(stream) = conn.as_mut() else {
            return Err(StoreError::Protocol("connection slot is empty".to_string()));
        };

        let limit = self.config.timeout;
        timeout(limit, stream.write_all(&encode_command(args)))
            .await
            .map_err(|_| StoreError::Timeout(limit))??;
        timeout(limit, stream.flush())
            .await
            .map_err(|_| StoreError::Timeout(limit))??;
        let reply = timeout(limit, read_reply(stream))
            .await
            .map_err(|_| StoreError::Timeout(limit))??;

        match reply {
            Reply::Error(message) => Err(StoreError::Server(message)),
            other => Ok(other),
        }
    }

    async fn connect(&self) -> StoreResult<Connection> {
        let addr = self.config.addr();
        let limit = self.config.timeout;
        let stream = timeout(limit, TcpStream::connect(&addr))
            .await
            .map_err(|_| StoreError::Timeout(limit))??;
        let mut conn = BufStream::new(stream);

        if self.config.db != 0 {
            timeout(limit, self.select_db(&mut conn))
                .await
                .map_err(|_| StoreError::Timeout(limit))??;
        }

        debug!(%addr, "store connection established");
        Ok(conn)
    }

    async fn select_db(&self, conn: &mut Connection) -> StoreResult<()> {
        let db = self.config.db.to_string();
        conn.write_all(&encode_command(&["SELECT", &db])).await?;
        conn.flush().await?;
        match read_reply(conn).await? {
            Reply::Simple(_) => Ok(()),
            Reply::Error(message) => Err(StoreError::Server(message)),
            other => Err(StoreError::Protocol(format!(
                "unexpected SELECT reply: {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl Store for RemoteStore {
    async fn cache_get(&self, key: &str) -> Option<String> {
        match self.fetch(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "cache read failed, treating as absent");
                None
            }
        }
    }

    async fn cache_set(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(err) = self.put_with_ttl(key, value, ttl).await {
            warn!(key, error = %err, "cache write failed, skipping");
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.fetch(key).await
    }
}

//! Redis service for visitor sessions

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
    session_ttl_seconds: u64,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str, session_ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self {
            client,
            session_ttl_seconds,
        })
    }

    /// Count one more visit for a session and return how many visits came
    /// before this one. Concurrent requests of a session may race; that is fine.
    pub async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = format!("session:{}:num_visits", session_id);
        let visits: i64 = conn.incr(&key, 1).await?;
        conn.expire::<_, ()>(&key, self.session_ttl_seconds as i64).await?;

        Ok(visits - 1)
    }

    /// Check Redis connectivity
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

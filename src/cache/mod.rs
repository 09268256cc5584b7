//! Redis connectivity

use crate::error::Result;
use redis::aio::ConnectionManager;
use tracing::info;

#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = client.get_connection_manager().await?;
        let cache = Self { manager };
        cache.ping().await?;
        info!("Redis connection established");
        Ok(cache)
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

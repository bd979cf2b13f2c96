use redis::AsyncCommands;

/// Redis-backed response cache. Every operation is best effort: a Redis
/// outage degrades to cache-off behavior instead of failing the request.
#[derive(Clone)]
pub struct ResponseCache {
    client: Option<redis::Client>,
}

impl ResponseCache {
    pub fn from_env() -> Self {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        match redis::Client::open(url.as_str()) {
            Ok(client) => Self {
                client: Some(client),
            },
            Err(e) => {
                eprintln!("WARNING: Invalid REDIS_URL ({}), caching disabled", e);
                Self { client: None }
            }
        }
    }

    /// A cache that never hits. Used by tests and as the fallback when
    /// Redis is unreachable.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    async fn connection(&self) -> Option<redis::aio::MultiplexedConnection> {
        let client = self.client.as_ref()?;
        match client.get_multiplexed_async_connection().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                eprintln!("Redis connection error: {}. Proceeding without cache.", e);
                None
            }
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection().await?;
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                eprintln!("Redis GET error for {}: {}", key, e);
                None
            }
        }
    }

    pub async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) {
        let Some(mut conn) = self.connection().await else {
            return;
        };
        if let Err(e) = conn.set_ex::<_, _, ()>(key, value, ttl_secs).await {
            eprintln!("Redis SETEX error for {}: {}. Could not cache result.", key, e);
        }
    }

    pub async fn delete(&self, key: &str) {
        let Some(mut conn) = self.connection().await else {
            return;
        };
        if let Err(e) = conn.del::<_, ()>(key).await {
            eprintln!("Redis DEL error for {}: {}", key, e);
        }
    }
}

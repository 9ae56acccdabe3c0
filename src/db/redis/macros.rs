/// Read-through caching around an async computation.
///
/// Looks the key up in the cache first and returns the cached value on a hit. On a miss,
/// or when no cache is configured, the block is awaited, its value is queued for a
/// background write, and the value is returned. A failing cache read is logged and treated
/// as a miss so that Redis trouble never fails the caller.
///
/// # Arguments
/// * `$cache`: an `Option<&Cache>`.
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: time-to-live of the written value, in seconds.
/// * `$block`: future producing an `AppResult` of the value.
///
/// # Example
/// ```rust,ignore
/// let summary: Option<String> = cached!(self.cache.as_ref(), key, TTL, async move {
///     fetch_summary().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let cache: Option<&$crate::db::Cache> = $cache;
        let key: $crate::db::CacheKey = $key;

        let hit = match cache {
            Some(cache) => match cache.get_from_cache(&key).await {
                Ok(hit) => hit,
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                    None
                }
            },
            None => None,
        };

        match hit {
            Some(value) => Ok(value),
            None => match $block.await {
                Ok(value) => {
                    if let Some(cache) = cache {
                        cache.set_in_background(&key, &value, $ttl);
                    }
                    Ok(value)
                }
                Err(e) => Err(e),
            },
        }
    }};
}

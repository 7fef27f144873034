use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::SqlitePool;
use std::time::Duration;

/// true  => employee code is TAKEN
/// false => employee code is AVAILABLE (usually we store only taken)
pub static CODE_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

#[inline]
fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Mark a single employee code as taken
pub async fn mark_taken(code: &str) {
    CODE_CACHE.insert(normalize(code), true).await;
}

/// Check if an employee code is taken
pub async fn is_taken(code: &str) -> bool {
    CODE_CACHE.get(&normalize(code)).await.unwrap_or(false)
}

/// Forget a code, e.g. after the employee record is deleted
pub async fn invalidate(code: &str) {
    CODE_CACHE.invalidate(&normalize(code)).await;
}

/// Batch mark employee codes as taken
async fn batch_mark(codes: &[String]) {
    let futures: Vec<_> = codes
        .iter()
        .map(|c| CODE_CACHE.insert(normalize(c), true))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load codes of RECENTLY hired employees into the in-memory cache (batched)
pub async fn warmup_code_cache(pool: &SqlitePool, days: u32, batch_size: usize) -> Result<()> {
    let cutoff = format!("-{} days", days);

    let mut stream = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT employee_code
        FROM employees
        WHERE hire_date >= date('now', ?)
        ORDER BY hire_date DESC
        "#,
    )
    .bind(&cutoff)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (code,) = row?;
        batch.push(code);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    log::info!(
        "Employee code cache warmup complete: {} codes (last {} days)",
        total_count,
        days
    );

    Ok(())
}

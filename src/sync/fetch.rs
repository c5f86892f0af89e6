use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::model::record::Record;
use crate::store::RecordStore;

/// Fetch every record of a collection, following `next_cursor` until the last page.
///
/// Sleeps `delay` between consecutive requests. Any failed page aborts the whole
/// fetch; there is no retry, a 429 is as fatal as any other status.
pub async fn fetch_all<S: RecordStore + ?Sized>(
    store: &S,
    collection_id: &str,
    delay: Duration,
) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store.query(collection_id, cursor.as_deref()).await?;
        pages += 1;
        records.extend(page.results);

        cursor = match (page.has_more, page.next_cursor) {
            (true, Some(next)) => Some(next),
            (true, None) => {
                warn!(
                    collection_id,
                    pages,
                    records = records.len(),
                    "has_more set without next_cursor; stopping early"
                );
                break;
            }
            (false, _) => break,
        };
        tokio::time::sleep(delay).await;
    }

    debug!(collection_id, pages, records = records.len(), "fetched collection");
    Ok(records)
}

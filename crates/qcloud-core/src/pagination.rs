//! Fixed-size window pagination over `[start, end)` record ranges.
//!
//! Pages are requested one after another starting at zero; the first page
//! shorter than the page size ends the sequence. The server is assumed not to
//! reorder or mutate the recordset between calls.

use std::future::Future;

use tracing::debug;

use crate::error::Result;
use crate::ValidationError;

/// Largest window the API serves in one call.
pub const MAX_PAGE_SIZE: usize = 100;

/// Rejects windows the API would refuse, before any network call.
pub fn check_window(start: usize, end: usize) -> std::result::Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::InvertedPageWindow { start, end });
    }
    if end - start > MAX_PAGE_SIZE {
        return Err(ValidationError::PageWindowTooLarge {
            start,
            end,
            max: MAX_PAGE_SIZE,
        });
    }
    Ok(())
}

/// Fetches every page through `fetch(start, end)` and concatenates them in request order.
pub async fn paginate<T, F, Fut>(page_size: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ValidationError::InvalidPageSize {
            size: page_size,
            max: MAX_PAGE_SIZE,
        }
        .into());
    }

    let mut records = Vec::new();
    let mut start = 0;
    loop {
        let end = start + page_size;
        let page = fetch(start, end).await?;
        let page_len = page.len();
        debug!(start, end, page_len, "fetched page");
        records.extend(page);

        if page_len < page_size {
            return Ok(records);
        }
        start = end;
    }
}

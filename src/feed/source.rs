use async_trait::async_trait;

use crate::api::ApiError;

use super::cursor::{Cursor, CursorStrategy};
use super::types::LogPage;

/// Where log pages come from. `cursor` is `None` for the first page.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch_page(
        &self,
        strategy: &dyn CursorStrategy,
        cursor: Option<&Cursor>,
    ) -> Result<LogPage, ApiError>;
}

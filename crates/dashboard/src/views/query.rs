use checkpointz_cache::QueryState;

use super::{LOADING, SOMETHING_WENT_WRONG};
use crate::render::{notice, Component, RenderContext, RenderError};

/// Renders `view` once the query has data. Cached data keeps rendering
/// through later failures.
pub struct QueryView<'a, T, F> {
    name: &'static str,
    state: &'a QueryState<T>,
    view: F,
}

impl<'a, T, F> QueryView<'a, T, F> {
    pub fn new(name: &'static str, state: &'a QueryState<T>, view: F) -> Self {
        Self { name, state, view }
    }
}

impl<T, F> Component for QueryView<'_, T, F>
where
    F: Fn(&T, &RenderContext) -> Result<String, RenderError>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        match self.state.data() {
            Some(data) => (self.view)(data, ctx),
            None if self.state.is_error() => Ok(notice(ctx, SOMETHING_WENT_WRONG)),
            None => Ok(notice(ctx, LOADING)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::anyhow;
    use checkpointz_cache::QueryStatus;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn ctx() -> RenderContext {
        RenderContext::plain_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn render(state: &QueryState<u64>) -> String {
        QueryView::new("number", state, |value: &u64, _: &RenderContext| {
            Ok(format!("value {value}\n"))
        })
        .render(&ctx())
        .unwrap()
    }

    #[test]
    fn test_pending_shows_loading() {
        assert_eq!(render(&QueryState::pending()), "  Loading...\n");
    }

    #[test]
    fn test_error_without_data() {
        let state = QueryState {
            status: QueryStatus::Error,
            error: Some(Arc::new(anyhow!("connection refused"))),
            ..QueryState::pending()
        };

        assert_eq!(render(&state), "  Something went wrong\n");
    }

    #[test]
    fn test_error_with_previous_data() {
        let state = QueryState {
            status: QueryStatus::Error,
            data: Some(Arc::new(7)),
            error: Some(Arc::new(anyhow!("timeout"))),
            ..QueryState::pending()
        };

        assert_eq!(render(&state), "value 7\n");
    }

    #[test]
    fn test_success() {
        let state = QueryState {
            status: QueryStatus::Success,
            data: Some(Arc::new(42)),
            ..QueryState::pending()
        };

        assert_eq!(render(&state), "value 42\n");
    }
}

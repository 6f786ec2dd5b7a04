use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::render::{Component, RenderContext};

pub const FALLBACK_TITLE: &str = "uhhh";
pub const FALLBACK_MESSAGE: &str = "Something went wrong...";

/// Keeps a failing component from taking the rest of the screen down with
/// it. Render errors and panics both collapse into the fallback block.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorBoundary;

impl ErrorBoundary {
    pub fn render(&self, component: &dyn Component, ctx: &RenderContext) -> String {
        match panic::catch_unwind(AssertUnwindSafe(|| component.render(ctx))) {
            Ok(Ok(out)) => out,
            Ok(Err(err)) => {
                error!(component = component.name(), error = %err, "component failed to render");
                fallback(ctx)
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|message| message.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(component = component.name(), panic = %message, "component panicked");
                fallback(ctx)
            }
        }
    }
}

pub fn fallback(ctx: &RenderContext) -> String {
    format!("{}\n{FALLBACK_MESSAGE}\n", ctx.bold(FALLBACK_TITLE))
}

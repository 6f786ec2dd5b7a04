use std::fmt::Write;

use checkpointz_types::{checkpoint::Checkpoint, status::Status};
use crossterm::style::Color;

use crate::{
    render::{printable, Component, RenderContext, RenderError},
    utils::truncate_hash,
};

pub const TAGLINE: &str = "An Ethereum beacon chain checkpoint sync provider";
pub const EPOCH_PLACEHOLDER: &str = "0000000";
pub const ROOT_PLACEHOLDER: &str = "0x000000...000000";

/// Finalized and justified checkpoints currently served.
pub struct Hero<'a> {
    status: Option<&'a Status>,
}

impl<'a> Hero<'a> {
    pub fn new(status: Option<&'a Status>) -> Self {
        Self { status }
    }

    fn card(
        out: &mut String,
        ctx: &RenderContext,
        title: &str,
        checkpoint: Option<&Checkpoint>,
    ) -> Result<(), RenderError> {
        let epoch = checkpoint.map_or_else(|| EPOCH_PLACEHOLDER.to_string(), |c| c.epoch.to_string());
        let root = checkpoint
            .map(|c| c.root.as_str())
            .filter(|root| !root.is_empty())
            .map_or_else(|| ROOT_PLACEHOLDER.to_string(), |root| truncate_hash(Some(root)));

        writeln!(out, "{}", ctx.paint(title, Color::Magenta))?;
        writeln!(out, "  Epoch:      {epoch}")?;
        writeln!(out, "  Block Root: {}", printable(&root))?;
        Ok(())
    }
}

impl Component for Hero<'_> {
    fn name(&self) -> &'static str {
        "hero"
    }

    fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let finality = self.status.and_then(|status| status.finality.as_ref());
        let mut out = String::new();
        writeln!(out, "{}", ctx.bold(TAGLINE))?;
        writeln!(out)?;
        Self::card(
            &mut out,
            ctx,
            "Latest Finalized",
            finality.and_then(|f| f.finalized.as_ref()),
        )?;
        Self::card(
            &mut out,
            ctx,
            "Latest Justified",
            finality.and_then(|f| f.current_justified.as_ref()),
        )?;
        Ok(out)
    }
}

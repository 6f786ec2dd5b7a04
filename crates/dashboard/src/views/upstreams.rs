use std::fmt::Write;

use checkpointz_types::{checkpoint::Checkpoint, status::Status, upstream::Upstream};
use crossterm::style::Color;

use crate::{
    filter::TableSearch,
    render::{Cell, Component, RenderContext, RenderError, TextTable},
};

const HEADERS: [&str; 6] = [
    "Name",
    "Status",
    "Finalized Epoch",
    "Finalized Block Root",
    "Justified Epoch",
    "Justified Block Root",
];

pub struct UpstreamTable<'a> {
    rows: Vec<&'a Upstream>,
    search: &'a str,
}

impl<'a> UpstreamTable<'a> {
    pub fn new(status: &'a Status, search: &'a TableSearch) -> Self {
        Self {
            rows: search.apply(status.upstreams()),
            search: search.as_str(),
        }
    }
}

fn epoch_cell(checkpoint: Option<&Checkpoint>) -> Cell {
    checkpoint
        .map(|checkpoint| checkpoint.epoch.to_string())
        .unwrap_or_default()
        .into()
}

impl Component for UpstreamTable<'_> {
    fn name(&self) -> &'static str {
        "upstreams"
    }

    fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let mut table = TextTable::new(HEADERS);
        for upstream in &self.rows {
            let finality = upstream.finality.as_ref();
            let finalized = finality.and_then(|f| f.finalized.as_ref());
            let justified = finality.and_then(|f| f.current_justified.as_ref());
            let health = if upstream.healthy {
                Cell::colored("Healthy", Color::Green)
            } else {
                Cell::colored("Unhealthy", Color::Red)
            };
            table.push_row(vec![
                upstream.name.as_str().into(),
                health,
                epoch_cell(finalized),
                ctx.root(finalized.map(|c| c.root.as_str())),
                epoch_cell(justified),
                ctx.root(justified.map(|c| c.root.as_str())),
            ]);
        }

        let mut out = String::new();
        writeln!(out, "{}", ctx.bold("Upstreams"))?;
        if !self.search.is_empty() {
            writeln!(out, "Search: {}", self.search)?;
        }
        out.push_str(&table.render(ctx)?);
        if table.is_empty() {
            writeln!(out, "No upstreams found")?;
        }
        Ok(out)
    }
}

use std::fmt::Write;

use checkpointz_types::{primitives::Epoch, slot::BeaconSlot};
use crossterm::style::Color;

use crate::{
    filter::TableSearch,
    render::{time_ago, Cell, Component, RenderContext, RenderError, TextTable},
};

const HEADERS: [&str; 5] = ["Epoch", "Slot", "Time", "State Root", "Block Root"];
const SERVING_FLAG: &str = "⚑";

/// Historical checkpoints. The row whose epoch is the one currently served
/// as finalized gets a flag.
pub struct CheckpointsTable<'a> {
    rows: Vec<&'a BeaconSlot>,
    latest_finalized_epoch: Option<Epoch>,
    search: &'a str,
}

impl<'a> CheckpointsTable<'a> {
    pub fn new(
        slots: &'a [BeaconSlot],
        latest_finalized_epoch: Option<Epoch>,
        search: &'a TableSearch,
    ) -> Self {
        Self {
            rows: search.apply(slots),
            latest_finalized_epoch,
            search: search.as_str(),
        }
    }
}

impl Component for CheckpointsTable<'_> {
    fn name(&self) -> &'static str {
        "checkpoints"
    }

    fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let mut table = TextTable::new(HEADERS);
        for slot in &self.rows {
            let epoch = match slot.epoch {
                Some(epoch) if Some(epoch) == self.latest_finalized_epoch => {
                    Cell::colored(format!("{epoch} {SERVING_FLAG}"), Color::Magenta)
                }
                Some(epoch) => epoch.to_string().into(),
                None => Cell::from(""),
            };
            let time = slot
                .time
                .as_ref()
                .map(|time| time_ago(time.start_time, ctx.now))
                .unwrap_or_default();
            table.push_row(vec![
                epoch,
                slot.slot.to_string().into(),
                time.into(),
                ctx.root(slot.state_root.as_deref()),
                ctx.root(slot.block_root.as_deref()),
            ]);
        }

        let mut out = String::new();
        writeln!(out, "{}", ctx.bold("Historical Checkpoints"))?;
        if !self.search.is_empty() {
            writeln!(out, "Search: {}", self.search)?;
        }
        out.push_str(&table.render(ctx)?);
        if table.is_empty() {
            writeln!(out, "No checkpoints found")?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use checkpointz_types::slot::SlotTime;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn ctx() -> RenderContext {
        RenderContext::plain_at(Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap())
    }

    fn slots() -> Vec<BeaconSlot> {
        let now = ctx().now;
        vec![
            BeaconSlot {
                slot: 529056,
                block_root: Some("0x13b4cc5f0000000000000000000000000000000000000000000000000000aaaa".to_string()),
                state_root: Some("0x854ca984298e6a0d9fc098b4e37f1b28727e545a8e4d3106188fda3587d14cdb".to_string()),
                epoch: Some(16533),
                time: Some(SlotTime {
                    start_time: now - Duration::minutes(6),
                    end_time: now - Duration::minutes(6) + Duration::seconds(12),
                }),
            },
            BeaconSlot {
                slot: 529024,
                block_root: None,
                state_root: None,
                epoch: Some(16532),
                time: Some(SlotTime {
                    start_time: now - Duration::minutes(13),
                    end_time: now - Duration::minutes(13) + Duration::seconds(12),
                }),
            },
        ]
    }

    #[test]
    fn test_latest_finalized_is_flagged() {
        let slots = slots();
        let search = TableSearch::default();

        let out = CheckpointsTable::new(&slots, Some(16532), &search)
            .render(&ctx())
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Historical Checkpoints");
        assert!(lines[3].starts_with("16533    529056  6 minutes ago"));
        assert!(lines[3].contains("0x854ca9...d14cdb"));
        assert_eq!(lines[4], "16532 ⚑  529024  13 minutes ago");
    }

    #[test]
    fn test_search_by_slot() {
        let slots = slots();
        let search = TableSearch::new("529024");

        let out = CheckpointsTable::new(&slots, None, &search)
            .render(&ctx())
            .unwrap();

        assert!(out.contains("529024"));
        assert!(!out.contains("529056"));
        assert!(!out.contains(SERVING_FLAG));
    }

    #[test]
    fn test_empty() {
        let search = TableSearch::default();

        let out = CheckpointsTable::new(&[], None, &search).render(&ctx()).unwrap();

        assert!(out.ends_with("No checkpoints found\n"));
    }
}

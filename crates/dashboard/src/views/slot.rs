use std::fmt::Write;

use checkpointz_types::slot::SlotDetail;

use super::SOMETHING_WENT_WRONG;
use crate::{
    render::{notice, printable, time_ago, Component, RenderContext, RenderError},
    utils::hex_to_ascii,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GraffitiFormat {
    #[default]
    Ascii,
    Hex,
}

/// Full details of one historical slot.
pub struct SlotView<'a> {
    detail: &'a SlotDetail,
    graffiti: GraffitiFormat,
}

impl<'a> SlotView<'a> {
    pub fn new(detail: &'a SlotDetail, graffiti: GraffitiFormat) -> Self {
        Self { detail, graffiti }
    }
}

impl Component for SlotView<'_> {
    fn name(&self) -> &'static str {
        "slot"
    }

    fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let Some(versioned) = self.detail.block.as_ref() else {
            return Ok(notice(ctx, SOMETHING_WENT_WRONG));
        };
        let block = versioned.signed_block();
        let message = &block.message;

        let time = self
            .detail
            .time
            .as_ref()
            .map(|time| {
                format!(
                    "{} ({})",
                    time_ago(time.start_time, ctx.now),
                    time.start_time.format("%B %-d, %Y %-I:%M:%S %p")
                )
            })
            .unwrap_or_default();
        let graffiti = match self.graffiti {
            GraffitiFormat::Hex => message.body.graffiti.clone(),
            // zero padding would otherwise reach the terminal as NULs
            GraffitiFormat::Ascii => hex_to_ascii(Some(&message.body.graffiti))
                .trim_end_matches('\0')
                .to_string(),
        };
        let epoch = self
            .detail
            .epoch
            .map(|epoch| epoch.to_string())
            .unwrap_or_default();

        let fields = [
            ("Epoch", epoch),
            ("Slot", message.slot.to_string()),
            ("Time", time),
            ("Proposer", message.proposer_index.to_string()),
            ("Block Root", versioned.block_hash().unwrap_or_default().to_string()),
            ("Parent Root", message.parent_root.clone()),
            ("State Root", message.state_root.clone()),
            ("Signature", block.signature.clone()),
            ("Randao Reveal", message.body.randao_reveal.clone()),
            ("Graffiti", graffiti),
        ];

        let mut out = String::new();
        writeln!(
            out,
            "{} ({})",
            ctx.bold(&format!("Slot {}", message.slot)),
            versioned.fork_name()
        )?;
        for (label, value) in fields {
            writeln!(
                out,
                "{} {}",
                ctx.bold(&format!("{label:<14}")),
                printable(&value)
            )?;
        }
        Ok(out)
    }
}

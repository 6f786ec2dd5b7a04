use std::fmt::Write;

use checkpointz_types::status::Status;
use crossterm::style::Color;

use crate::render::{printable, Component, RenderContext, RenderError};

pub struct Footer<'a> {
    status: Option<&'a Status>,
}

impl<'a> Footer<'a> {
    pub fn new(status: Option<&'a Status>) -> Self {
        Self { status }
    }
}

impl Component for Footer<'_> {
    fn name(&self) -> &'static str {
        "footer"
    }

    fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let version = self
            .status
            .and_then(|status| status.version.as_ref())
            .and_then(|version| version.full.as_deref());
        let brand = self.status.and_then(|status| status.brand_name.as_deref());

        let mut out = String::new();
        write!(out, "powered by {}", ctx.paint("Checkpointz", Color::Magenta))?;
        if let Some(version) = version {
            write!(out, " {}", printable(version))?;
        }
        writeln!(out)?;
        if let Some(brand) = brand {
            writeln!(out, "{}", ctx.bold(brand))?;
        }
        Ok(out)
    }
}

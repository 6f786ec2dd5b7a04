use std::fmt::Write;

use checkpointz_types::status::Status;
use crossterm::style::Color;

use crate::{
    render::{Component, RenderContext, RenderError},
    utils::majority_network_name,
};

const UNKNOWN: &str = "unknown";

pub struct Header<'a> {
    status: Option<&'a Status>,
    is_loading: bool,
}

impl<'a> Header<'a> {
    pub fn new(status: Option<&'a Status>, is_loading: bool) -> Self {
        Self { status, is_loading }
    }

    fn network(&self) -> String {
        self.status
            .and_then(|status| majority_network_name(status.upstreams()))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn operating_mode(&self) -> &'static str {
        self.status
            .and_then(|status| status.operating_mode)
            .map_or(UNKNOWN, |mode| mode.as_str())
    }

    fn brand(&self) -> Option<&'a str> {
        self.status.and_then(|status| status.brand_name.as_deref())
    }
}

impl Component for Header<'_> {
    fn name(&self) -> &'static str {
        "header"
    }

    fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let mut out = String::new();
        match self.brand() {
            Some(brand) => writeln!(out, "{}", ctx.bold(brand))?,
            None if !self.is_loading => {
                writeln!(out, "{}", ctx.paint("Checkpointz", Color::Magenta))?
            }
            None => writeln!(out)?,
        }
        writeln!(
            out,
            "Network: {}  |  Operation Mode: {}",
            ctx.bold(&self.network()),
            ctx.bold(self.operating_mode())
        )?;
        Ok(out)
    }
}

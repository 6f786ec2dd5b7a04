use std::{borrow::Cow, fmt};

use itertools::Itertools;

/// Identifies one cached resource: a scope plus optional ordered parameters,
/// e.g. `beacon_slot{slot=42}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    scope: Cow<'static, str>,
    params: Vec<(Cow<'static, str>, String)>,
}

impl QueryKey {
    pub fn new(scope: impl Into<Cow<'static, str>>) -> Self {
        Self {
            scope: scope.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<Cow<'static, str>>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scope)?;
        if !self.params.is_empty() {
            let params = self
                .params
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .join(",");
            write!(f, "{{{params}}}")?;
        }
        Ok(())
    }
}

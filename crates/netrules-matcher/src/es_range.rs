//! Elasticsearch `range` clauses covering a network spec.

use crate::network_spec::NetworkSpec;
use serde::Serialize;
use serde_json::{json, Value};
use std::net::IpAddr;

/// Address field queried when none is configured
pub const DEFAULT_ES_FIELD: &str = "client.ip";

/// Inclusive bounds of a range clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EsBounds {
    pub gte: IpAddr,
    pub lte: IpAddr,
}

impl NetworkSpec {
    pub fn es_bounds(&self) -> EsBounds {
        EsBounds {
            gte: self.first(),
            lte: self.last(),
        }
    }

    /// `{"range": {<field>: {"gte": <first>, "lte": <last>}}}`
    pub fn es_range(&self, field: &str) -> Value {
        json!({
            "range": {
                field: self.es_bounds()
            }
        })
    }
}

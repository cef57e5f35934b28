use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An opaque, role-specific concrete allocation payload: ticket, lease, or
/// unit count, depending on which actor produced it. The engine never
/// inspects its contents; it only carries it between policy and plugin calls
/// and validates its presence/absence at the right lifecycle edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcreteSet {
    pub payload: serde_json::Value,
}

impl ConcreteSet {
    pub fn new(payload: serde_json::Value) -> Self {
        ConcreteSet { payload }
    }
}

/// Abstract resource parameters plus an optional concrete realization.
///
/// `concrete` is `None` for every request and for an approved ticket that
/// has not yet been redeemed; it is `Some` once a lease (or, on the broker
/// side, a ticket) has actually been produced by the resource plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    pub resource_type: String,
    pub units: u64,
    pub request_properties: HashMap<String, String>,
    pub resource_properties: HashMap<String, String>,
    pub concrete: Option<ConcreteSet>,
}

impl ResourceSet {
    pub fn new(resource_type: impl Into<String>, units: u64) -> Self {
        ResourceSet {
            resource_type: resource_type.into(),
            units,
            request_properties: HashMap::new(),
            resource_properties: HashMap::new(),
            concrete: None,
        }
    }

    pub fn with_concrete(mut self, concrete: ConcreteSet) -> Self {
        self.concrete = Some(concrete);
        self
    }

    pub fn is_concrete(&self) -> bool {
        self.concrete.is_some()
    }
}

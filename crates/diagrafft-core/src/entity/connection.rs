//! Connection lines between connectors.

use crate::connector::ConnectorId;
use serde::{Deserialize, Serialize};

/// A straight connection. Its geometry is the position of its two endpoint connectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub start: ConnectorId,
    pub end: ConnectorId,
}

impl Connection {
    pub fn new(start: ConnectorId, end: ConnectorId) -> Self {
        Self { start, end }
    }
}

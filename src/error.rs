use crate::graph::NodeIndex;

/// Errors of the graph algorithms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Terminal index out of range or pointing at a tombstone.
    #[error("Invalid terminal node index: {0}")]
    InvalidTerminal(NodeIndex),

    /// Two terminals have no path between them in the host graph.
    #[error("Terminals {from} and {to} are not connected in the host graph")]
    UnreachableTerminals { from: NodeIndex, to: NodeIndex },
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    GraphFileUnreadable,
    GmlSyntax,
    GraphNotDirected,
    InvalidGraph,
    NodeNotFound,
    EffectNotIdentified,
    UnsupportedQuery,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::GraphFileUnreadable => "E1001",
            Self::GmlSyntax => "E1002",
            Self::GraphNotDirected => "E1003",
            Self::InvalidGraph => "E1004",
            Self::NodeNotFound => "E2001",
            Self::EffectNotIdentified => "E3001",
            Self::UnsupportedQuery => "E3002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::GraphFileUnreadable => "Graph file could not be read",
            Self::GmlSyntax => "GML syntax error",
            Self::GraphNotDirected => "Graph is not directed",
            Self::InvalidGraph => "Invalid causal graph",
            Self::NodeNotFound => "Node not found",
            Self::EffectNotIdentified => "Effect not identified",
            Self::UnsupportedQuery => "Unsupported identification query",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::GraphFileUnreadable => Some("Check the path and read permissions."),
            Self::GmlSyntax => Some("Fix the GML near the reported offset and retry."),
            Self::GraphNotDirected => Some("Add `directed 1` to the graph block."),
            Self::InvalidGraph => {
                Some("Node ids and labels must be unique and edges must reference declared nodes.")
            }
            Self::NodeNotFound => Some("Use a node label exactly as declared in the graph."),
            Self::EffectNotIdentified => Some("Call identify_effect before querying the identifier."),
            Self::UnsupportedQuery => {
                Some("Frontdoor search supports a single treatment and a single outcome.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by graph loading, path queries and the built-in identifier.
#[derive(Debug, thiserror::Error)]
pub enum CausewayError {
    /// The graph file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The GML text is malformed.
    #[error("GML syntax error at byte {offset}: {reason}")]
    GmlSyntax { offset: usize, reason: String },

    /// The GML graph does not declare `directed 1`.
    #[error("graph is not directed")]
    Undirected,

    /// The graph is structurally unusable (duplicate ids, dangling edges, cycles).
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// A node name was not found in the graph.
    #[error("node not found in graph: {0}")]
    NodeNotFound(String),

    /// The identifier was queried before `identify_effect` ran.
    #[error("effect has not been identified yet")]
    NotIdentified,

    /// The identifier does not support this query shape.
    #[error("unsupported identification query: {0}")]
    Unsupported(String),
}

impl CausewayError {
    /// The stable [`ErrorCode`] for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::GraphFileUnreadable,
            Self::GmlSyntax { .. } => ErrorCode::GmlSyntax,
            Self::Undirected => ErrorCode::GraphNotDirected,
            Self::InvalidGraph(_) => ErrorCode::InvalidGraph,
            Self::NodeNotFound(_) => ErrorCode::NodeNotFound,
            Self::NotIdentified => ErrorCode::EffectNotIdentified,
            Self::Unsupported(_) => ErrorCode::UnsupportedQuery,
        }
    }

    /// Remediation hint, falling back to the code's summary.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or_else(|| code.message()).to_string()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Free-form node configuration. Nested lookup tables and templates live here.
pub type Metadata = Map<String, Value>;

/// A stored workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Workflow {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: vec![],
            edges: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }
}

/// One executable step in a graph.
///
/// The type tag is an open string: the registry decides at run time whether
/// a handler exists for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        node_type: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            position: Position::default(),
            data: NodeData {
                label: label.into(),
                ..NodeData::default()
            },
        }
    }

    /// Replace the metadata bag. Non-object values are ignored.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        if let Value::Object(map) = metadata {
            self.data.metadata = map;
        }
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.data.description = description.into();
        self
    }
}

/// Canvas coordinates. Presentation only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Metadata,
}

/// A directed connection between two nodes.
///
/// Only `source`, `target` and `source_handle` matter for execution; the
/// rest is styling carried through for the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
    /// Branch handle used to pick among a condition node's outgoing edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_style: Option<Value>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Set the branch handle.
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attach editor styling (edge type, animation, stroke).
    pub fn styled(mut self, edge_type: &str, animated: bool, style: Value) -> Self {
        self.edge_type = Some(edge_type.to_string());
        self.animated = animated;
        self.style = Some(style);
        self
    }

    pub fn with_label_style(mut self, style: Value) -> Self {
        self.label_style = Some(style);
        self
    }
}

/// Caller-supplied comparison for condition nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionInput {
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub threshold: f64,
}

impl ConditionInput {
    pub fn new(operator: impl Into<String>, threshold: f64) -> Self {
        Self {
            operator: operator.into(),
            threshold,
        }
    }
}

/// The five recognized relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    GreaterThan,
    LessThan,
    Equals,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::Equals,
        Operator::GreaterThanOrEqual,
        Operator::LessThanOrEqual,
    ];

    /// Parse an operator token. Returns `None` for anything unrecognized.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "greater_than" => Some(Self::GreaterThan),
            "less_than" => Some(Self::LessThan),
            "equals" => Some(Self::Equals),
            "greater_than_or_equal" => Some(Self::GreaterThanOrEqual),
            "less_than_or_equal" => Some(Self::LessThanOrEqual),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Equals => "equals",
            Self::GreaterThanOrEqual => "greater_than_or_equal",
            Self::LessThanOrEqual => "less_than_or_equal",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Equals => "=",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThanOrEqual => "<=",
        }
    }

    /// Human-readable form, e.g. "greater than or equal to".
    pub fn label(&self) -> &'static str {
        match self {
            Self::GreaterThan => "greater than",
            Self::LessThan => "less than",
            Self::Equals => "equal to",
            Self::GreaterThanOrEqual => "greater than or equal to",
            Self::LessThanOrEqual => "less than or equal to",
        }
    }

    /// Compare `value` against `threshold` after rounding both to one
    /// decimal place. The rounding masks binary representation error
    /// (0.1 + 0.2 equals 0.3 here); it is not a precision guarantee.
    pub fn evaluate(&self, value: f64, threshold: f64) -> bool {
        let v = round_tenths(value);
        let t = round_tenths(threshold);
        match self {
            Self::GreaterThan => v > t,
            Self::LessThan => v < t,
            Self::Equals => v == t,
            Self::GreaterThanOrEqual => v >= t,
            Self::LessThanOrEqual => v <= t,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

fn round_tenths(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Unique, opaque run identifier.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(pub String);

impl ExecutionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
}

/// Successful output of a node handler.
///
/// `message` is a separate field so every step output carries one.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutput {
    pub message: String,
    pub data: Map<String, Value>,
}

impl NodeOutput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: Map::new(),
        }
    }

    /// Add a field to the output bag.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Flatten into the serialized output map, `message` included.
    pub fn into_map(self) -> Map<String, Value> {
        let mut map = self.data;
        map.insert("message".to_string(), Value::String(self.message));
        map
    }
}

/// The recorded outcome of executing one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    pub step_number: usize,
    pub node_id: String,
    pub node_type: String,
    /// Same value as `node_type`, kept for clients that read `type`.
    #[serde(rename = "type", default)]
    pub step_type: String,
    pub label: String,
    pub status: StepStatus,
    /// Elapsed milliseconds.
    pub duration: u64,
    pub output: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionStep {
    pub fn message(&self) -> Option<&str> {
        self.output.get("message").and_then(|v| v.as_str())
    }
}

/// Final artifact of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResults {
    pub execution_id: ExecutionId,
    pub status: RunStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Wall-clock milliseconds for the whole run.
    pub total_duration: u64,
    pub steps: Vec<ExecutionStep>,
}

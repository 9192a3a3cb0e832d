use crate::serialization::Value;

/// A node of the intermediate tree built from the token stream.
#[derive(Debug, PartialEq, Clone)]
pub enum AstNode {
    Object(ObjectNode),
    Array(ArrayNode),
    Set(SetNode),
    Scalar(Value),
}

/// The container kinds a delimiter can open or close.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ContainerKind {
    Object,
    Array,
    Set,
}

impl AstNode {
    pub fn empty(kind: ContainerKind) -> AstNode {
        match kind {
            ContainerKind::Object => AstNode::Object(ObjectNode::default()),
            ContainerKind::Array => AstNode::Array(ArrayNode::default()),
            ContainerKind::Set => AstNode::Set(SetNode::default()),
        }
    }

    /// `None` for scalars.
    pub fn kind(&self) -> Option<ContainerKind> {
        match self {
            AstNode::Object(_) => Some(ContainerKind::Object),
            AstNode::Array(_) => Some(ContainerKind::Array),
            AstNode::Set(_) => Some(ContainerKind::Set),
            AstNode::Scalar(_) => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct ObjectNode {
    pub edges: Vec<(String, AstNode)>,
    /// A key that has been read but whose value has not.
    pub pending_key: Option<String>,
}

impl ObjectNode {
    /// Binds under `key`. A key that is already bound keeps its position and
    /// takes the new value.
    pub fn bind(&mut self, key: String, value: AstNode) {
        match self.edges.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.edges.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&AstNode> {
        self.edges.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct ArrayNode {
    pub edges: Vec<AstNode>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct SetNode {
    pub edges: Vec<AstNode>,
}

impl SetNode {
    /// Adds `node` unless an equal scalar is already present. Containers are
    /// always added here and deduplicated once converted.
    pub fn add(&mut self, node: AstNode) {
        if let AstNode::Scalar(value) = &node {
            let duplicate = self.edges.iter().any(|existing| match existing {
                AstNode::Scalar(other) => other.same_value(value),
                _ => false,
            });
            if duplicate {
                return;
            }
        }
        self.edges.push(node);
    }
}

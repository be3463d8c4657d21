use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;

use crate::{
    error::RuntimeError,
    interpreter::{lexer::Token, value::Value},
};

/// Shared handle to a syntax tree node.
///
/// Nodes are shared between the parser that builds them and the evaluation
/// tasks that walk them, so the tree hands out reference-counted handles.
pub type NodeRef = Arc<Node>;

/// The type of a syntax tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// A leaf holding a single [`Value`].
    Value,
    /// A parenthesized form `( … )`; the only form that invokes a function.
    Expression,
    /// A bracketed form `[ … ]`.
    List,
    /// A braced form `{ … }` holding interleaved keys and values.
    Map,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Value => "value",
            Self::Expression => "expression",
            Self::List => "list",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// An element of the abstract syntax tree.
///
/// Container nodes own their children; the parent pointer is a weak
/// back-reference for lookup only. Every node built by the parser keeps the
/// token that opened it, for error messages — only the synthetic root list
/// has no token.
#[derive(Debug)]
pub struct Node {
    node_type: NodeType,
    token:     Option<Token>,
    value:     Option<Value>,
    children:  RwLock<Vec<NodeRef>>,
    parent:    OnceLock<Weak<Node>>,
}

impl Node {
    fn build(node_type: NodeType, token: Option<Token>, value: Option<Value>) -> NodeRef {
        Arc::new(Self { node_type,
                        token,
                        value,
                        children: RwLock::new(Vec::new()),
                        parent: OnceLock::new() })
    }

    /// Creates an orphaned leaf node holding the given value.
    #[must_use]
    pub fn new(token: Option<Token>, value: Value) -> NodeRef {
        Self::build(NodeType::Value, token, Some(value))
    }

    /// Creates an orphaned node of type "expression".
    #[must_use]
    pub fn expression(token: Option<Token>) -> NodeRef {
        Self::build(NodeType::Expression, token, None)
    }

    /// Creates an orphaned node of type "list".
    #[must_use]
    pub fn list(token: Option<Token>) -> NodeRef {
        Self::build(NodeType::List, token, None)
    }

    /// Creates an orphaned node of type "map".
    #[must_use]
    pub fn map(token: Option<Token>) -> NodeRef {
        Self::build(NodeType::Map, token, None)
    }

    /// Returns the type of the node.
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Returns the token that opened the node.
    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Returns the value carried by a leaf node.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Returns handles to the children of a container node.
    #[must_use]
    pub fn children(&self) -> Vec<NodeRef> {
        self.children.read().clone()
    }

    /// Returns the parent of the node, when it has one and the parent is
    /// still alive.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.get().and_then(Weak::upgrade)
    }

    /// Returns true if the node is a leaf.
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self.node_type, NodeType::Value)
    }

    /// Returns true if the node can hold children.
    #[must_use]
    pub const fn is_vector(&self) -> bool {
        !self.is_value()
    }

    /// Appends a child node to a container node.
    ///
    /// # Errors
    /// Returns [`RuntimeError::NotAContainer`] when called on a leaf.
    pub fn push(self: &Arc<Self>, child: NodeRef) -> Result<(), RuntimeError> {
        if !self.is_vector() {
            return Err(RuntimeError::NotAContainer);
        }
        let _ = child.parent.set(Arc::downgrade(self));
        self.children.write().push(child);
        Ok(())
    }

    /// Appends a new leaf to the node and returns it.
    ///
    /// # Errors
    /// Returns [`RuntimeError::NotAContainer`] when called on a leaf.
    pub fn push_value(self: &Arc<Self>,
                      token: Option<Token>,
                      value: Value)
                      -> Result<NodeRef, RuntimeError> {
        let node = Self::new(token, value);
        self.push(Arc::clone(&node))?;
        Ok(node)
    }

    /// Appends a new expression node and returns it.
    ///
    /// # Errors
    /// Returns [`RuntimeError::NotAContainer`] when called on a leaf.
    pub fn push_expression(self: &Arc<Self>,
                           token: Option<Token>)
                           -> Result<NodeRef, RuntimeError> {
        let node = Self::expression(token);
        self.push(Arc::clone(&node))?;
        Ok(node)
    }

    /// Appends a new list node and returns it.
    ///
    /// # Errors
    /// Returns [`RuntimeError::NotAContainer`] when called on a leaf.
    pub fn push_list(self: &Arc<Self>, token: Option<Token>) -> Result<NodeRef, RuntimeError> {
        let node = Self::list(token);
        self.push(Arc::clone(&node))?;
        Ok(node)
    }

    /// Appends a new map node and returns it.
    ///
    /// # Errors
    /// Returns [`RuntimeError::NotAContainer`] when called on a leaf.
    pub fn push_map(self: &Arc<Self>, token: Option<Token>) -> Result<NodeRef, RuntimeError> {
        let node = Self::map(token);
        self.push(Arc::clone(&node))?;
        Ok(node)
    }

    /// Renders the node back to source text.
    ///
    /// Encoding is the inverse of parsing modulo whitespace collapsing and
    /// sign normalization: lists and maps keep their delimiters,
    /// expressions keep their parentheses at every nesting level except
    /// the outermost, and the synthetic root prints its forms separated by
    /// single spaces.
    #[must_use]
    pub fn encode(&self) -> String {
        self.encode_level(0)
    }

    fn encode_level(&self, level: usize) -> String {
        let join = |items: &[NodeRef]| {
            items.iter()
                 .map(|child| child.encode_level(level + 1))
                 .collect::<Vec<_>>()
                 .join(" ")
        };

        match self.node_type {
            NodeType::Value => self.value
                                   .as_ref()
                                   .map(ToString::to_string)
                                   .unwrap_or_default(),
            NodeType::List => {
                let inner = join(&self.children.read());
                if level == 0 && self.token.is_none() {
                    // Synthetic root: bare top-level forms.
                    inner
                } else {
                    format!("[{inner}]")
                }
            },
            NodeType::Map => format!("{{{}}}", join(&self.children.read())),
            NodeType::Expression => {
                let inner = join(&self.children.read());
                if level == 0 {
                    inner
                } else {
                    format!("({inner})")
                }
            },
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        if self.node_type != other.node_type || self.value != other.value {
            return false;
        }
        let ours = self.children.read();
        let theirs = other.children.read();
        ours.len() == theirs.len() && ours.iter().zip(theirs.iter()).all(|(a, b)| **a == **b)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_vector() {
            write!(f, "({})[{}]", self.node_type, self.children.read().len())
        } else {
            match &self.value {
                Some(value) => write!(f, "({}): {value}", self.node_type),
                None => write!(f, "({})", self.node_type),
            }
        }
    }
}

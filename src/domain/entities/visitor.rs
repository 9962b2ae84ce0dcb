//! Inputs to a single resolution.

/// Raw visitor headers as forwarded by the edge agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorContext {
    pub ip: String,
    pub user_agent: String,
    pub referer: String,
}

/// One click to resolve.
///
/// `node_id` is empty when the edge node did not identify itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    pub alias: String,
    pub node_id: String,
    pub domain: Option<String>,
    pub visitor: VisitorContext,
}

impl ResolveRequest {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            ..Self::default()
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = node_id.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_visitor(mut self, visitor: VisitorContext) -> Self {
        self.visitor = visitor;
        self
    }
}

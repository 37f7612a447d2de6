use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
}

/// A named GraphQL document plus the root field its result lives under
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub root_field: &'static str,
    pub kind: OperationKind,
    pub document: &'static str,
    /// Issued without a session (login, register). An auth rejection here is
    /// a bad credential, not an expired session.
    pub public: bool,
}

impl Operation {
    pub const fn query(name: &'static str, root_field: &'static str, document: &'static str) -> Self {
        Self {
            name,
            root_field,
            kind: OperationKind::Query,
            document,
            public: false,
        }
    }

    pub const fn mutation(name: &'static str, root_field: &'static str, document: &'static str) -> Self {
        Self {
            name,
            root_field,
            kind: OperationKind::Mutation,
            document,
            public: false,
        }
    }

    pub const fn public(self) -> Self {
        Self { public: true, ..self }
    }

    pub fn is_mutation(&self) -> bool {
        self.kind == OperationKind::Mutation
    }
}

/// Shared types used across the codebase

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric identifier used by catalog, inventory, purchasing and sales records.
/// The API returns `ID` scalars as strings and `Int` fields as numbers; both
/// deserialize into this type through [`id`].
pub type Id = i64;

/// Roles a signed-in user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Vendedor,
    Almacenista,
}

/// Protected resources, one per entity area of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    Productos,
    Ventas,
    Inventario,
    Usuarios,
    Clientes,
    Almacenes,
    Categorias,
    UnidadesMedida,
    Proveedores,
    Compras,
}

/// Actions that can be performed on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind}: '{value}'")]
pub struct ParseNameError {
    pub kind: &'static str,
    pub value: String,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Vendedor, Role::Almacenista];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Vendedor => "VENDEDOR",
            Role::Almacenista => "ALMACENISTA",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Productos,
        Resource::Ventas,
        Resource::Inventario,
        Resource::Usuarios,
        Resource::Clientes,
        Resource::Almacenes,
        Resource::Categorias,
        Resource::UnidadesMedida,
        Resource::Proveedores,
        Resource::Compras,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Productos => "PRODUCTOS",
            Resource::Ventas => "VENTAS",
            Resource::Inventario => "INVENTARIO",
            Resource::Usuarios => "USUARIOS",
            Resource::Clientes => "CLIENTES",
            Resource::Almacenes => "ALMACENES",
            Resource::Categorias => "CATEGORIAS",
            Resource::UnidadesMedida => "UNIDADES_MEDIDA",
            Resource::Proveedores => "PROVEEDORES",
            Resource::Compras => "COMPRAS",
        }
    }
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "VIEW",
            Action::Create => "CREATE",
            Action::Edit => "EDIT",
            Action::Delete => "DELETE",
        }
    }
}

impl FromStr for Role {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ParseNameError { kind: "role", value: s.to_string() })
    }
}

impl FromStr for Resource {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|resource| resource.as_str() == s)
            .ok_or_else(|| ParseNameError { kind: "resource", value: s.to_string() })
    }
}

impl FromStr for Action {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseNameError { kind: "action", value: s.to_string() })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serde helpers for identifiers that arrive either as `"12"` or `12`
pub mod id {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    impl RawId {
        fn into_id<E: serde::de::Error>(self) -> Result<Id, E> {
            match self {
                RawId::Number(n) => Ok(n),
                RawId::Text(s) => s
                    .trim()
                    .parse()
                    .map_err(|_| E::custom(format!("invalid identifier '{}'", s))),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Id, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawId::deserialize(deserializer)?.into_id()
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Id>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<RawId>::deserialize(deserializer)? {
                Some(raw) => raw.into_id().map(Some),
                None => Ok(None),
            }
        }
    }
}

//! Static permission table.
//!
//! Every `(resource, action)` pair has an entry; an empty entry means only
//! `ADMIN` may perform it. `ADMIN` is allowed before the table is consulted.

use crate::types::{Action, Resource, Role};

use crate::types::Role::{Almacenista, Vendedor};

const NOBODY: &[Role] = &[];
const SELLERS: &[Role] = &[Vendedor];
const STOCKKEEPERS: &[Role] = &[Almacenista];
const STAFF: &[Role] = &[Vendedor, Almacenista];

/// Roles (besides `ADMIN`) allowed to perform `action` on `resource`
pub fn allowed_roles(resource: Resource, action: Action) -> &'static [Role] {
    use Action::*;
    use Resource::*;

    match (resource, action) {
        (Usuarios, _) => NOBODY,
        (_, Delete) => NOBODY,

        (Ventas | Clientes, View | Create | Edit) => SELLERS,

        (Productos | Inventario | Almacenes | Categorias | UnidadesMedida, View) => STAFF,
        (Productos | Inventario | Almacenes | Categorias | UnidadesMedida, Create | Edit) => STOCKKEEPERS,

        (Proveedores | Compras, View | Create | Edit) => STOCKKEEPERS,
    }
}

/// Whether `role` may perform `action` on `resource`
pub fn permits(role: Role, resource: Resource, action: Action) -> bool {
    if role.is_admin() {
        return true;
    }
    allowed_roles(resource, action).contains(&role)
}

/// Lookup by name. Unknown resource or action names are denied to everyone
/// except `ADMIN`.
pub fn permits_named(role: Role, resource: &str, action: &str) -> bool {
    if role.is_admin() {
        return true;
    }
    match (resource.parse::<Resource>(), action.parse::<Action>()) {
        (Ok(resource), Ok(action)) => permits(role, resource, action),
        _ => false,
    }
}

/// Every pair `role` is granted, in table order
pub fn grants(role: Role) -> Vec<(Resource, Action)> {
    Resource::ALL
        .into_iter()
        .flat_map(|resource| Action::ALL.into_iter().map(move |action| (resource, action)))
        .filter(|&(resource, action)| permits(role, resource, action))
        .collect()
}

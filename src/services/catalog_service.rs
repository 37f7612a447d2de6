//! Catalog CRUD for products, categories, units of measure, warehouses,
//! suppliers and clients.
//!
//! Each entity describes its GraphQL operations and argument shape through
//! [`CatalogEntity`]; [`CatalogService`] runs them the same way for all.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ClientError;
use crate::gateway::{Gateway, Operation};
use crate::models::{
    Category, CategoryInput, Client, ClientInput, DeletePayload, Payload, Product, ProductInput, Supplier,
    SupplierInput, UnitInput, UnitOfMeasure, Warehouse, WarehouseInput,
};
use crate::types::{Id, Resource};

/// The five operations every catalog entity supports
#[derive(Debug, Clone, Copy)]
pub struct CrudOperations {
    pub list: Operation,
    pub get: Operation,
    pub create: Operation,
    pub update: Operation,
    pub delete: Operation,
}

pub trait CatalogEntity: DeserializeOwned + Serialize + Send + 'static {
    type Input: Serialize + DeserializeOwned + Send + Sync;

    /// Permission resource guarding this entity
    const RESOURCE: Resource;
    const LABEL: &'static str;
    const OPERATIONS: CrudOperations;
    /// Answers come wrapped as `{ <entity>, error }` and `{ success, error }`
    const ENVELOPED: bool = false;

    fn id(&self) -> Id;
    fn display_name(&self) -> String;

    fn create_variables(input: &Self::Input) -> Result<Value, ClientError>;
    fn update_variables(id: Id, input: &Self::Input) -> Result<Value, ClientError>;
}

fn object(value: impl Serialize) -> Result<serde_json::Map<String, Value>, ClientError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ClientError::InvalidInput(format!("expected an object, got {}", other))),
    }
}

macro_rules! product_fields {
    () => {
        r#"
            id
            nombre
            descripcion
            precio
            urlImagen
            categoria { id nombre }
            unidadMedida { id nombre abreviatura }
            stocks { id cantidad estado almacen { id nombre } }"#
    };
}

impl CatalogEntity for Product {
    type Input = ProductInput;

    const RESOURCE: Resource = Resource::Productos;
    const LABEL: &'static str = "product";
    const OPERATIONS: CrudOperations = CrudOperations {
        list: Operation::query(
            "GetProductos",
            "productos",
            concat!("query GetProductos {\n  productos {", product_fields!(), "\n  }\n}"),
        ),
        get: Operation::query(
            "GetProducto",
            "producto",
            concat!("query GetProducto($id: ID!) {\n  producto(id: $id) {", product_fields!(), "\n  }\n}"),
        ),
        create: Operation::mutation(
            "CrearProducto",
            "crearProducto",
            concat!(
                "mutation CrearProducto($input: ProductoInput!) {\n  crearProducto(input: $input) {",
                product_fields!(),
                "\n  }\n}"
            ),
        ),
        update: Operation::mutation(
            "ActualizarProducto",
            "actualizarProducto",
            concat!(
                "mutation ActualizarProducto($id: ID!, $input: ProductoInput!) {\n  actualizarProducto(id: $id, input: $input) {",
                product_fields!(),
                "\n  }\n}"
            ),
        ),
        delete: Operation::mutation(
            "EliminarProducto",
            "eliminarProducto",
            "mutation EliminarProducto($id: ID!) {\n  eliminarProducto(id: $id)\n}",
        ),
    };

    fn id(&self) -> Id {
        self.id
    }

    fn display_name(&self) -> String {
        self.nombre.clone().unwrap_or_else(|| format!("#{}", self.id))
    }

    fn create_variables(input: &ProductInput) -> Result<Value, ClientError> {
        Ok(json!({ "input": input }))
    }

    fn update_variables(id: Id, input: &ProductInput) -> Result<Value, ClientError> {
        Ok(json!({ "id": id, "input": input }))
    }
}

impl CatalogEntity for Category {
    type Input = CategoryInput;

    const RESOURCE: Resource = Resource::Categorias;
    const LABEL: &'static str = "category";
    const OPERATIONS: CrudOperations = CrudOperations {
        list: Operation::query(
            "GetCategorias",
            "categorias",
            r#"query GetCategorias {
  categorias {
    id
    nombre
    descripcion
    productos { id nombre }
  }
}"#,
        ),
        get: Operation::query(
            "GetCategoria",
            "categoria",
            r#"query GetCategoria($id: ID!) {
  categoria(id: $id) {
    id
    nombre
    descripcion
    productos { id nombre }
  }
}"#,
        ),
        create: Operation::mutation(
            "CrearCategoria",
            "crearCategoria",
            r#"mutation CrearCategoria($nombre: String!, $descripcion: String) {
  crearCategoria(nombre: $nombre, descripcion: $descripcion) {
    id
    nombre
    descripcion
  }
}"#,
        ),
        update: Operation::mutation(
            "ActualizarCategoria",
            "actualizarCategoria",
            r#"mutation ActualizarCategoria($id: ID!, $nombre: String!, $descripcion: String) {
  actualizarCategoria(id: $id, nombre: $nombre, descripcion: $descripcion) {
    id
    nombre
    descripcion
  }
}"#,
        ),
        delete: Operation::mutation(
            "EliminarCategoria",
            "eliminarCategoria",
            "mutation EliminarCategoria($id: ID!) {\n  eliminarCategoria(id: $id)\n}",
        ),
    };

    fn id(&self) -> Id {
        self.id
    }

    fn display_name(&self) -> String {
        self.nombre.clone()
    }

    fn create_variables(input: &CategoryInput) -> Result<Value, ClientError> {
        Ok(Value::Object(object(input)?))
    }

    fn update_variables(id: Id, input: &CategoryInput) -> Result<Value, ClientError> {
        let mut vars = object(input)?;
        vars.insert("id".into(), json!(id));
        Ok(Value::Object(vars))
    }
}

impl CatalogEntity for UnitOfMeasure {
    type Input = UnitInput;

    const RESOURCE: Resource = Resource::UnidadesMedida;
    const LABEL: &'static str = "unit of measure";
    const OPERATIONS: CrudOperations = CrudOperations {
        list: Operation::query(
            "GetUnidadesMedida",
            "unidadesMedida",
            r#"query GetUnidadesMedida {
  unidadesMedida {
    id
    nombre
    abreviatura
    productos { id nombre }
  }
}"#,
        ),
        get: Operation::query(
            "GetUnidadMedida",
            "unidadMedida",
            r#"query GetUnidadMedida($id: ID!) {
  unidadMedida(id: $id) {
    id
    nombre
    abreviatura
    productos { id nombre }
  }
}"#,
        ),
        create: Operation::mutation(
            "CrearUnidadMedida",
            "crearUnidadMedida",
            r#"mutation CrearUnidadMedida($nombre: String!, $abreviatura: String!) {
  crearUnidadMedida(nombre: $nombre, abreviatura: $abreviatura) {
    id
    nombre
    abreviatura
  }
}"#,
        ),
        update: Operation::mutation(
            "ActualizarUnidadMedida",
            "actualizarUnidadMedida",
            r#"mutation ActualizarUnidadMedida($id: ID!, $nombre: String!, $abreviatura: String!) {
  actualizarUnidadMedida(id: $id, nombre: $nombre, abreviatura: $abreviatura) {
    id
    nombre
    abreviatura
  }
}"#,
        ),
        delete: Operation::mutation(
            "EliminarUnidadMedida",
            "eliminarUnidadMedida",
            "mutation EliminarUnidadMedida($id: ID!) {\n  eliminarUnidadMedida(id: $id)\n}",
        ),
    };

    fn id(&self) -> Id {
        self.id
    }

    fn display_name(&self) -> String {
        match &self.abreviatura {
            Some(abbr) => format!("{} ({})", self.nombre, abbr),
            None => self.nombre.clone(),
        }
    }

    fn create_variables(input: &UnitInput) -> Result<Value, ClientError> {
        Ok(Value::Object(object(input)?))
    }

    fn update_variables(id: Id, input: &UnitInput) -> Result<Value, ClientError> {
        let mut vars = object(input)?;
        vars.insert("id".into(), json!(id));
        Ok(Value::Object(vars))
    }
}

impl CatalogEntity for Warehouse {
    type Input = WarehouseInput;

    const RESOURCE: Resource = Resource::Almacenes;
    const LABEL: &'static str = "warehouse";
    const OPERATIONS: CrudOperations = CrudOperations {
        list: Operation::query(
            "GetAlmacenes",
            "almacenes",
            r#"query GetAlmacenes {
  almacenes {
    id
    nombre
    ubicacion
    stocks { id cantidad estado producto { id nombre } }
  }
}"#,
        ),
        get: Operation::query(
            "GetAlmacen",
            "almacen",
            r#"query GetAlmacen($id: ID!) {
  almacen(id: $id) {
    id
    nombre
    ubicacion
    stocks { id cantidad estado producto { id nombre } }
  }
}"#,
        ),
        create: Operation::mutation(
            "CrearAlmacen",
            "crearAlmacen",
            r#"mutation CrearAlmacen($nombre: String!, $ubicacion: String!) {
  crearAlmacen(nombre: $nombre, ubicacion: $ubicacion) {
    id
    nombre
    ubicacion
  }
}"#,
        ),
        update: Operation::mutation(
            "ActualizarAlmacen",
            "actualizarAlmacen",
            r#"mutation ActualizarAlmacen($id: ID!, $nombre: String!, $ubicacion: String!) {
  actualizarAlmacen(id: $id, nombre: $nombre, ubicacion: $ubicacion) {
    id
    nombre
    ubicacion
  }
}"#,
        ),
        delete: Operation::mutation(
            "EliminarAlmacen",
            "eliminarAlmacen",
            "mutation EliminarAlmacen($id: ID!) {\n  eliminarAlmacen(id: $id)\n}",
        ),
    };

    fn id(&self) -> Id {
        self.id
    }

    fn display_name(&self) -> String {
        self.nombre.clone()
    }

    fn create_variables(input: &WarehouseInput) -> Result<Value, ClientError> {
        Ok(Value::Object(object(input)?))
    }

    fn update_variables(id: Id, input: &WarehouseInput) -> Result<Value, ClientError> {
        let mut vars = object(input)?;
        vars.insert("id".into(), json!(id));
        Ok(Value::Object(vars))
    }
}

macro_rules! supplier_payload {
    () => {
        r#"
            proveedor { id nombre nit direccion telefono email }
            error { message code }"#
    };
}

impl CatalogEntity for Supplier {
    type Input = SupplierInput;

    const RESOURCE: Resource = Resource::Proveedores;
    const LABEL: &'static str = "supplier";
    const ENVELOPED: bool = true;
    const OPERATIONS: CrudOperations = CrudOperations {
        list: Operation::query(
            "GetProveedores",
            "proveedores",
            "query GetProveedores {\n  proveedores { id nombre nit direccion telefono email }\n}",
        ),
        get: Operation::query(
            "GetProveedor",
            "proveedor",
            concat!("query GetProveedor($id: Int!) {\n  proveedor(id: $id) {", supplier_payload!(), "\n  }\n}"),
        ),
        create: Operation::mutation(
            "CrearProveedor",
            "crearProveedor",
            concat!(
                "mutation CrearProveedor($input: ProveedorInput!) {\n  crearProveedor(input: $input) {",
                supplier_payload!(),
                "\n  }\n}"
            ),
        ),
        update: Operation::mutation(
            "ActualizarProveedor",
            "actualizarProveedor",
            concat!(
                "mutation ActualizarProveedor($id: Int!, $input: ProveedorUpdateInput!) {\n  actualizarProveedor(id: $id, input: $input) {",
                supplier_payload!(),
                "\n  }\n}"
            ),
        ),
        delete: Operation::mutation(
            "EliminarProveedor",
            "eliminarProveedor",
            "mutation EliminarProveedor($id: Int!) {\n  eliminarProveedor(id: $id) {\n    success\n    error { message code }\n  }\n}",
        ),
    };

    fn id(&self) -> Id {
        self.id
    }

    fn display_name(&self) -> String {
        self.nombre.clone()
    }

    fn create_variables(input: &SupplierInput) -> Result<Value, ClientError> {
        Ok(json!({ "input": input }))
    }

    fn update_variables(id: Id, input: &SupplierInput) -> Result<Value, ClientError> {
        let mut fields = object(input)?;
        fields.remove("nit");
        Ok(json!({ "id": id, "input": fields }))
    }
}

macro_rules! client_fields {
    () => {
        r#"
            id
            nombre
            apellido
            email
            ci
            telefono
            direccion
            tipo_cliente
            fecha_registro"#
    };
}

impl CatalogEntity for Client {
    type Input = ClientInput;

    const RESOURCE: Resource = Resource::Clientes;
    const LABEL: &'static str = "client";
    const OPERATIONS: CrudOperations = CrudOperations {
        list: Operation::query(
            "GetClientes",
            "clientes",
            concat!("query GetClientes {\n  clientes {", client_fields!(), "\n  }\n}"),
        ),
        get: Operation::query(
            "GetCliente",
            "cliente",
            concat!("query GetCliente($id: Int!) {\n  cliente(id: $id) {", client_fields!(), "\n  }\n}"),
        ),
        create: Operation::mutation(
            "CrearCliente",
            "crearCliente",
            concat!(
                "mutation CrearCliente($createClienteInput: CreateClienteInput!) {\n  crearCliente(createClienteInput: $createClienteInput) {",
                client_fields!(),
                "\n  }\n}"
            ),
        ),
        update: Operation::mutation(
            "ActualizarCliente",
            "actualizarCliente",
            concat!(
                "mutation ActualizarCliente($updateClienteInput: UpdateClienteInput!) {\n  actualizarCliente(updateClienteInput: $updateClienteInput) {",
                client_fields!(),
                "\n  }\n}"
            ),
        ),
        delete: Operation::mutation(
            "EliminarCliente",
            "eliminarCliente",
            "mutation EliminarCliente($id: Float!) {\n  eliminarCliente(id: $id)\n}",
        ),
    };

    fn id(&self) -> Id {
        self.id
    }

    fn display_name(&self) -> String {
        self.full_name()
    }

    fn create_variables(input: &ClientInput) -> Result<Value, ClientError> {
        Ok(json!({ "createClienteInput": input }))
    }

    fn update_variables(id: Id, input: &ClientInput) -> Result<Value, ClientError> {
        let mut fields = object(input)?;
        fields.insert("id".into(), json!(id));
        Ok(json!({ "updateClienteInput": fields }))
    }
}

pub const UPDATE_PRODUCT_PRICE: Operation = Operation::mutation(
    "ActualizarPrecioProducto",
    "actualizarPrecioProducto",
    r#"mutation ActualizarPrecioProducto($id: ID!, $precio: Float!) {
  actualizarPrecioProducto(id: $id, precio: $precio) {
    id
    precio
  }
}"#,
);

/// Result of `actualizarPrecioProducto`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceChange {
    #[serde(deserialize_with = "crate::types::id::deserialize")]
    pub id: Id,
    pub precio: Decimal,
}

pub struct CatalogService {
    gateway: Gateway,
}

impl CatalogService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list<E: CatalogEntity>(&self) -> Result<Vec<E>, ClientError> {
        let items: Option<Vec<E>> = self.gateway.execute(&E::OPERATIONS.list, json!({})).await?;
        Ok(items.unwrap_or_default())
    }

    /// `Ok(None)` when no record has that id
    pub async fn get<E: CatalogEntity>(&self, id: Id) -> Result<Option<E>, ClientError> {
        let vars = json!({ "id": id });
        if E::ENVELOPED {
            let payload: Option<Payload<E>> = self.gateway.execute(&E::OPERATIONS.get, vars).await?;
            match payload {
                Some(payload) => payload.into_result(),
                None => Ok(None),
            }
        } else {
            self.gateway.execute(&E::OPERATIONS.get, vars).await
        }
    }

    pub async fn create<E: CatalogEntity>(&self, input: &E::Input) -> Result<E, ClientError> {
        let vars = E::create_variables(input)?;
        let created = self.mutate_one::<E>(&E::OPERATIONS.create, vars).await?;
        tracing::info!("Created {} {}", E::LABEL, created.id());
        Ok(created)
    }

    pub async fn update<E: CatalogEntity>(&self, id: Id, input: &E::Input) -> Result<E, ClientError> {
        let vars = E::update_variables(id, input)?;
        let updated = self.mutate_one::<E>(&E::OPERATIONS.update, vars).await?;
        tracing::info!("Updated {} {}", E::LABEL, id);
        Ok(updated)
    }

    /// Whether the API reports the record as deleted
    pub async fn delete<E: CatalogEntity>(&self, id: Id) -> Result<bool, ClientError> {
        let vars = json!({ "id": id });
        let deleted = if E::ENVELOPED {
            let payload: DeletePayload = self.gateway.execute(&E::OPERATIONS.delete, vars).await?;
            payload.into_result()?
        } else {
            let value: Value = self.gateway.execute(&E::OPERATIONS.delete, vars).await?;
            match value {
                Value::Bool(ok) => ok,
                Value::Null => false,
                _ => true,
            }
        };
        if deleted {
            tracing::info!("Deleted {} {}", E::LABEL, id);
        }
        Ok(deleted)
    }

    pub async fn update_product_price(&self, id: Id, precio: Decimal) -> Result<PriceChange, ClientError> {
        if precio < Decimal::ZERO {
            return Err(ClientError::InvalidInput("price cannot be negative".into()));
        }
        self.gateway
            .execute(&UPDATE_PRODUCT_PRICE, json!({ "id": id, "precio": precio }))
            .await
    }

    async fn mutate_one<E: CatalogEntity>(&self, op: &Operation, vars: Value) -> Result<E, ClientError> {
        if E::ENVELOPED {
            let payload: Payload<E> = self.gateway.execute(op, vars).await?;
            payload.into_item(E::LABEL)
        } else {
            self.gateway.execute(op, vars).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway_as, ScriptedTransport};
    use crate::types::Role;

    #[tokio::test]
    async fn test_flat_argument_entities() {
        let transport = ScriptedTransport::new();
        transport.data(
            "ActualizarAlmacen",
            json!({ "actualizarAlmacen": { "id": "3", "nombre": "Norte", "ubicacion": "Av. Banzer" } }),
        );
        let catalog = CatalogService::new(gateway_as(Role::Admin, transport.clone()));

        let input = WarehouseInput {
            nombre: "Norte".into(),
            ubicacion: "Av. Banzer".into(),
        };
        let updated: Warehouse = catalog.update(3, &input).await.unwrap();
        assert_eq!(updated.id, 3);
        assert_eq!(
            transport.variables("ActualizarAlmacen")[0],
            json!({ "id": 3, "nombre": "Norte", "ubicacion": "Av. Banzer" })
        );
    }

    #[tokio::test]
    async fn test_supplier_envelopes() {
        let transport = ScriptedTransport::new();
        transport.data(
            "ActualizarProveedor",
            json!({ "actualizarProveedor": { "proveedor": null, "error": { "message": "Proveedor no encontrado", "code": "NOT_FOUND" } } }),
        );
        transport.data(
            "EliminarProveedor",
            json!({ "eliminarProveedor": { "success": true, "error": null } }),
        );
        let catalog = CatalogService::new(gateway_as(Role::Almacenista, transport.clone()));

        let input = SupplierInput {
            nombre: "Aceros".into(),
            nit: Some("123".into()),
            direccion: None,
            telefono: None,
            email: None,
        };
        let err = catalog.update::<Supplier>(8, &input).await.unwrap_err();
        assert_eq!(err.to_string(), "Proveedor no encontrado");
        // NIT is immutable and never sent on update
        assert_eq!(
            transport.variables("ActualizarProveedor")[0],
            json!({ "id": 8, "input": { "nombre": "Aceros" } })
        );

        assert!(catalog.delete::<Supplier>(8).await.unwrap());
    }

    #[tokio::test]
    async fn test_client_update_merges_id_into_input() {
        let transport = ScriptedTransport::new();
        transport.data(
            "ActualizarCliente",
            json!({ "actualizarCliente": { "id": 4, "nombre": "Ana", "tipo_cliente": "EMPRESA" } }),
        );
        let catalog = CatalogService::new(gateway_as(Role::Vendedor, transport.clone()));

        let input = ClientInput {
            nombre: "Ana".into(),
            apellido: None,
            email: None,
            ci: None,
            telefono: None,
            direccion: None,
            tipo_cliente: "EMPRESA".into(),
        };
        catalog.update::<Client>(4, &input).await.unwrap();
        assert_eq!(
            transport.variables("ActualizarCliente")[0],
            json!({ "updateClienteInput": { "id": 4, "nombre": "Ana", "tipo_cliente": "EMPRESA" } })
        );
    }

    #[tokio::test]
    async fn test_get_missing_and_plain_delete() {
        let transport = ScriptedTransport::new();
        transport.data("GetProducto", json!({ "producto": null }));
        transport.data("EliminarProducto", json!({ "eliminarProducto": true }));
        let catalog = CatalogService::new(gateway_as(Role::Admin, transport));

        assert!(catalog.get::<Product>(99).await.unwrap().is_none());
        assert!(catalog.delete::<Product>(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_negative_price_rejected_locally() {
        let transport = ScriptedTransport::new();
        let catalog = CatalogService::new(gateway_as(Role::Admin, transport.clone()));

        let err = catalog.update_product_price(1, Decimal::from(-1)).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert!(transport.requests().is_empty());
    }
}

// CRUD operations over any Sea-ORM entity implementing `CrudResource`

pub mod crud_operations;
pub mod lookup;
pub mod policy;
pub mod traits;

// Re-export commonly used items
pub use crud_operations::CrudService;
pub use policy::{CrudPolicy, Method};
pub use traits::{CrudResource, ResourceColumn};

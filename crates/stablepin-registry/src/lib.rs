mod catalog_store;
mod repository_state;
mod repository_store;

pub use catalog_store::{parse_catalog_snapshot, CatalogStore};
pub use repository_state::RoleOverrides;
pub use repository_store::{RepositoryConfig, RepositoryStore};

pub(crate) use repository_state::{
    parse_repository_state_file, validate_package_name, validate_repository_name,
    validate_repository_url, RepositoryStateFile,
};

pub mod deletion_validator;
pub mod dependency_lookup;

pub use deletion_validator::{DeletionValidator, DeletionVerdict, DependentData};
pub use dependency_lookup::{DependencyLookup, LookupError, PermissionDependencies, RoleDependencies};

pub mod form;
pub mod reconcile;
pub mod record;
pub mod tables;
pub mod validate;

pub use form::{AffiliationForm, FieldError, PrefillReport};
pub use reconcile::{NameParts, Reconciler, decode_birth_date, normalize_gender, split_name};
pub use record::{CanonicalRecord, Gender, NOT_DETECTED, RawExtraction, detected};
pub use tables::{ReferenceTables, TablesError};
pub use validate::{FieldKind, ValidationError};

//! Type representation, factory/canonicalizer, and the polar-type machinery
//! shared by the flow-sensitive and constraint-based inference paths.

pub mod bisubstitution;
pub mod equality;
pub mod factory;
pub mod format;
pub mod polar;
pub mod ty;

pub use bisubstitution::{BiunifyError, Bisubstitution};
pub use equality::structural_eq;
pub use factory::TypeFactory;
pub use format::format_type;
pub use ty::{Param, Polarity, PropertyType, Ty, TyData, TyIdent, TyKind, TypeVarId};

//! Ladybug DataType - Measurement categories and unit conversion
//!
//! Every measurement category (temperature, area, energy flux, ...) is a
//! [`DataType`] carrying its accepted unit labels, default SI and IP units
//! and a star-shaped conversion table pivoting through one canonical unit.
//!
//! The global [`DATA_TYPES`] registry resolves types by name, by unit, or by
//! both; unknown name/unit pairs resolve to generic types with identity
//! conversion instead of failing.

mod error;
mod factor;
mod category;
mod datatype;
mod registry;

pub use error::{DataTypeError, UnitSystem};
pub use factor::{ConversionEntry, ConversionTable, TableKind, UnitFactor};
pub use category::Category;
pub use datatype::{
    is_data_type_record, ConversionRecord, DataType, DataTypeKind, DataTypeRecord, UnitConversion,
    DATA_TYPE_MARKER,
};
pub use registry::{DataTypes, DATA_TYPES};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Category, DataType, DataTypeError, DataTypes, UnitConversion, DATA_TYPES};
}

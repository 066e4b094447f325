//! Registry of built-in data types, indexed by name and by unit label

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use tracing::{debug, warn};
use crate::category::Category;
use crate::datatype::{DataType, UnitConversion};
use crate::DataTypeError;

/// Global registry of the built-in categories
pub static DATA_TYPES: LazyLock<DataTypes> = LazyLock::new(DataTypes::new);

type GenericKey = (String, Option<String>);

/// Catalog of data types with name and unit indexes
pub struct DataTypes {
    base_types: Vec<Arc<DataType>>,
    by_name: HashMap<String, Arc<DataType>>,
    by_unit: HashMap<String, Arc<DataType>>,
    /// Append-only cache of synthesized generic types. Grows with every
    /// distinct unknown (name, unit) pair passed to `type_by_name_and_unit`.
    generics: RwLock<HashMap<GenericKey, Arc<DataType>>>,
}

impl DataTypes {
    /// Registry holding every built-in category
    pub fn new() -> Self {
        Self::with_types(Category::ALL.into_iter().map(DataType::builtin))
    }

    /// Registry over an arbitrary ordered set of types
    pub fn with_types(types: impl IntoIterator<Item = DataType>) -> Self {
        let mut registry = DataTypes {
            base_types: Vec::new(),
            by_name: HashMap::new(),
            by_unit: HashMap::new(),
            generics: RwLock::new(HashMap::new()),
        };
        for data_type in types {
            registry.register(data_type);
        }
        debug!(
            types = registry.base_types.len(),
            units = registry.by_unit.len(),
            "data type registry built"
        );
        registry
    }

    fn register(&mut self, data_type: DataType) {
        let data_type = Arc::new(data_type);

        if let Entry::Vacant(slot) = self.by_name.entry(data_type.name().to_string()) {
            slot.insert(Arc::clone(&data_type));
        } else {
            warn!(name = data_type.name(), "data type name registered twice; keeping the first");
        }

        for unit in data_type.units() {
            match self.by_unit.entry(unit.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(&data_type));
                }
                Entry::Occupied(existing) => {
                    warn!(
                        unit = unit.as_str(),
                        kept = existing.get().name(),
                        ignored = data_type.name(),
                        "unit label shared by two data types; first registration wins"
                    );
                }
            }
        }

        self.base_types.push(data_type);
    }

    /// Registered types in registration order
    pub fn base_types(&self) -> &[Arc<DataType>] {
        &self.base_types
    }

    pub fn names(&self) -> Vec<&str> {
        self.base_types.iter().map(|t| t.name()).collect()
    }

    /// Exact, case-sensitive name lookup
    pub fn type_by_name(&self, name: &str) -> Result<Arc<DataType>, DataTypeError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| DataTypeError::TypeNotFound(format!("no data type named '{}'", name)))
    }

    /// Exact unit-label lookup across all registered types
    pub fn type_by_unit(&self, unit: &str) -> Result<Arc<DataType>, DataTypeError> {
        self.by_unit
            .get(unit)
            .cloned()
            .ok_or_else(|| DataTypeError::TypeNotFound(format!("no data type accepts unit '{}'", unit)))
    }

    /// Resolve a name and unit, synthesizing a generic type when the pair
    /// is not a registered type with that unit. Never fails.
    pub fn type_by_name_and_unit(&self, name: &str, unit: Option<&str>) -> Arc<DataType> {
        if let Some(data_type) = self.by_name.get(name) {
            if unit.map_or(true, |u| data_type.is_unit_acceptable(u)) {
                return Arc::clone(data_type);
            }
        }
        self.generic(name, unit)
    }

    /// Like [`DataTypes::type_by_name_and_unit`] but never grows the generic
    /// cache: an unseen pair yields a fresh, unshared generic type. Use this
    /// for lookups driven by untrusted input in long-lived processes.
    pub fn describe_by_name_and_unit(&self, name: &str, unit: Option<&str>) -> Arc<DataType> {
        if let Some(data_type) = self.by_name.get(name) {
            if unit.map_or(true, |u| data_type.is_unit_acceptable(u)) {
                return Arc::clone(data_type);
            }
        }
        let key: GenericKey = (name.to_string(), unit.map(str::to_string));
        if let Some(cached) = self.generics.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            return Arc::clone(cached);
        }
        Arc::new(DataType::new_generic(name, unit))
    }

    fn generic(&self, name: &str, unit: Option<&str>) -> Arc<DataType> {
        let key: GenericKey = (name.to_string(), unit.map(str::to_string));

        if let Some(cached) = self.generics.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            return Arc::clone(cached);
        }

        debug!(name, unit, "synthesizing generic data type");
        let mut generics = self.generics.write().unwrap_or_else(PoisonError::into_inner);
        let entry = generics
            .entry(key)
            .or_insert_with(|| Arc::new(DataType::new_generic(name, unit)));
        Arc::clone(entry)
    }

    /// Number of generic types synthesized so far
    pub fn generic_count(&self) -> usize {
        self.generics.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// One line per registered type listing its units
    pub fn all_possible_units(&self) -> String {
        self.base_types
            .iter()
            .map(|t| t.units_summary())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for DataTypes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::DataTypeKind;
    use crate::factor::{ConversionEntry, ConversionTable, TableKind, UnitFactor};

    #[test]
    fn test_all_possible_units() {
        let listing = DATA_TYPES.all_possible_units();
        assert_eq!(listing.split('\n').count(), DATA_TYPES.base_types().len());
        assert_eq!(DATA_TYPES.base_types().len(), Category::ALL.len());
        assert!(listing.starts_with("Temperature: C, F, K\n"));
        assert!(listing.ends_with("VolumeFlowRate: m3/s, ft3/s, L/s, cfm, gpm, mL/s, fl oz/s"));
    }

    #[test]
    fn test_type_by_name() {
        for name in DATA_TYPES.names() {
            let data_type = DATA_TYPES.type_by_name(name).unwrap();
            assert!(data_type.is_data_type());
            assert_eq!(data_type.name(), name);
        }
        assert!(matches!(DATA_TYPES.type_by_name("temperature"), Err(DataTypeError::TypeNotFound(_))));
        assert!(matches!(DATA_TYPES.type_by_name("Temp"), Err(DataTypeError::TypeNotFound(_))));
    }

    #[test]
    fn test_type_by_unit() {
        for data_type in DATA_TYPES.base_types() {
            for unit in data_type.units() {
                let found = DATA_TYPES.type_by_unit(unit).unwrap();
                assert!(found.is_data_type());
                assert!(Arc::ptr_eq(&found, data_type), "unit {} resolved to {}", unit, found);
            }
        }
        assert_eq!(DATA_TYPES.type_by_unit("Btu/h-ft2").unwrap().name(), "EnergyFlux");
        assert!(matches!(DATA_TYPES.type_by_unit("widgets"), Err(DataTypeError::TypeNotFound(_))));
    }

    #[test]
    fn test_type_by_name_and_unit() {
        for data_type in DATA_TYPES.base_types() {
            for unit in data_type.units() {
                let found = DATA_TYPES.type_by_name_and_unit(data_type.name(), Some(unit));
                assert!(found.is_data_type());
                assert!(Arc::ptr_eq(&found, data_type));
            }
            let found = DATA_TYPES.type_by_name_and_unit(data_type.name(), None);
            assert!(Arc::ptr_eq(&found, data_type));
        }
    }

    #[test]
    fn test_unitless_type() {
        let registry = DataTypes::new();
        let test_type = registry.type_by_name_and_unit("Test Type", None);
        assert!(test_type.is_data_type());
        assert!(test_type.is_unitless());
        assert_eq!(test_type.name(), "Test Type");
    }

    #[test]
    fn test_generic_type() {
        let registry = DataTypes::new();
        let test_type = registry.type_by_name_and_unit("Test Type", Some("widgets"));
        assert!(test_type.is_data_type());
        assert!(test_type.is_unit_acceptable("widgets"));
        assert_eq!(test_type.kind(), DataTypeKind::Generic);
        assert_eq!(test_type.si_unit(), None);
    }

    #[test]
    fn test_known_name_with_foreign_unit_is_generic() {
        let registry = DataTypes::new();
        let odd = registry.type_by_name_and_unit("Temperature", Some("Rankine"));
        assert!(odd.is_generic());
        assert_eq!(odd.name(), "Temperature");
        assert_eq!(odd.units(), ["Rankine".to_string()]);
        // the built-in is untouched
        assert_eq!(registry.type_by_name("Temperature").unwrap().units().len(), 3);
    }

    #[test]
    fn test_generic_cache_is_shared() {
        let registry = DataTypes::new();
        let first = registry.type_by_name_and_unit("Test Type", Some("widgets"));
        let second = registry.type_by_name_and_unit("Test Type", Some("widgets"));
        assert!(Arc::ptr_eq(&first, &second));
        registry.type_by_name_and_unit("Test Type", None);
        assert_eq!(registry.generic_count(), 2);
        // built-in hits never touch the cache
        registry.type_by_name_and_unit("Mass", Some("kg"));
        assert_eq!(registry.generic_count(), 2);
    }

    #[test]
    fn test_describe_does_not_grow_cache() {
        let registry = DataTypes::new();
        let described = registry.describe_by_name_and_unit("Test Type", Some("widgets"));
        assert!(described.is_generic());
        assert_eq!(described.units(), ["widgets".to_string()]);
        assert_eq!(registry.generic_count(), 0);

        assert_eq!(registry.describe_by_name_and_unit("Mass", Some("kg")).name(), "Mass");
        assert_eq!(registry.generic_count(), 0);

        // an already cached generic is returned as is
        let cached = registry.type_by_name_and_unit("Test Type", Some("widgets"));
        let described = registry.describe_by_name_and_unit("Test Type", Some("widgets"));
        assert!(Arc::ptr_eq(&cached, &described));
        assert_eq!(registry.generic_count(), 1);
    }

    #[test]
    fn test_concurrent_synthesis() {
        let registry = DataTypes::new();
        let found: Vec<Arc<DataType>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.type_by_name_and_unit("Flow Count", Some("cars"))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(registry.generic_count(), 1);
        assert!(found.iter().all(|t| Arc::ptr_eq(t, &found[0])));
    }

    #[test]
    fn test_shared_unit_label_first_registration_wins() {
        let table = ConversionTable::new(TableKind::Multiplicative, vec![
            ConversionEntry::new("m", UnitFactor::IDENTITY),
            ConversionEntry::new("ftm", UnitFactor::times(0.546807)),
        ]).unwrap();
        let depth = DataType::custom("Depth", table, Some("m"), Some("ftm")).unwrap();
        let registry = DataTypes::with_types([DataType::builtin(Category::Distance), depth]);

        assert_eq!(registry.type_by_unit("m").unwrap().name(), "Distance");
        assert_eq!(registry.type_by_unit("ftm").unwrap().name(), "Depth");
        assert_eq!(registry.all_possible_units().lines().count(), 2);
    }
}

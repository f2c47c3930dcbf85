//! Complex type strategies.
//!
//! A strategy decides how types that have no builtin XML Schema equivalent are
//! represented in the `types` section:
//!
//! - [`DefaultComplexType`]: records become `xsd:complexType` with `xsd:all`,
//!   enums become string restrictions, arrays collapse to `soap-enc:Array`
//! - [`ArrayOfTypeSequence`]: like the default for records, but `T[]`, `T[][]`, ...
//!   become a chain of `ArrayOf...` types holding an unbounded `item` sequence
//! - [`ArrayOfTypeComplex`]: SOAP-encoded `ArrayOf<T>` restrictions, one level deep
//! - [`AnyType`]: every complex type is `xsd:anyType`

pub mod complex;
pub mod default;
pub mod sequence;

pub use complex::ArrayOfTypeComplex;
pub use default::DefaultComplexType;
pub use sequence::ArrayOfTypeSequence;

use crate::config::StrategySetting;
use crate::error::{Error, Result};
use crate::type_resolver::{ComplexTypeStrategy, TypeExpr, TypeResolver};
use crate::wsdl::Wsdl;
use log::debug;

/// Maps every complex type to `xsd:anyType`
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyType;

impl ComplexTypeStrategy for AnyType {
    fn name(&self) -> &'static str {
        "any"
    }

    fn add_complex_type(
        &self,
        _resolver: &TypeResolver<'_>,
        _wsdl: &mut Wsdl,
        _ty: &TypeExpr,
    ) -> Result<String> {
        Ok("xsd:anyType".to_string())
    }
}

/// Instantiate a strategy by its configuration name
pub fn by_name(name: &str) -> Result<Box<dyn ComplexTypeStrategy>> {
    debug!("Selecting complex type strategy: {}", name);
    let strategy: Box<dyn ComplexTypeStrategy> = match name.to_ascii_lowercase().as_str() {
        "default" | "defaultcomplextype" => Box::new(DefaultComplexType),
        "sequence" | "arrayoftypesequence" => Box::new(ArrayOfTypeSequence),
        "complex" | "arrayoftypecomplex" => Box::new(ArrayOfTypeComplex),
        "any" | "anytype" => Box::new(AnyType),
        _ => {
            return Err(Error::Configuration(format!(
                "Unknown complex type strategy '{}', expected one of: default, sequence, complex, any",
                name
            )))
        }
    };
    Ok(strategy)
}

/// Instantiate the strategy a configuration value selects
pub fn from_setting(setting: &StrategySetting) -> Result<Box<dyn ComplexTypeStrategy>> {
    match setting {
        StrategySetting::Enabled(true) => Ok(Box::new(DefaultComplexType)),
        StrategySetting::Enabled(false) => Ok(Box::new(AnyType)),
        StrategySetting::Named(name) => by_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_setting() {
        assert_eq!(from_setting(&StrategySetting::Enabled(true)).unwrap().name(), "default");
        assert_eq!(from_setting(&StrategySetting::Enabled(false)).unwrap().name(), "any");
        assert_eq!(
            from_setting(&StrategySetting::Named("ArrayOfTypeSequence".to_string()))
                .unwrap()
                .name(),
            "sequence"
        );
    }

    #[test]
    fn test_unknown_strategy_name() {
        let err = by_name("flat").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}

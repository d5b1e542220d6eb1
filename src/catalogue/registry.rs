//! Manually maintained in-memory catalogue
//!
//! `RegistryCatalogue` is the simplest [`Catalogue`]: callers register presets,
//! operations and subtype edges up front, and every lookup returns them in
//! insertion order. Useful for tests and for hosts that generate the registry
//! ahead of time instead of introspecting at runtime.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    Catalogue, LiteralValue, NullFilter, OperationHandle, Preset, TypeName, Visibility,
    VisibilityPolicy,
};

/// A constructing operation registered with a [`RegistryCatalogue`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    name: String,
    declaring_type: TypeName,
    result_type: TypeName,
    parameter_types: Vec<TypeName>,
    receiver: Option<TypeName>,
    visibility: Visibility,
}

impl Operation {
    /// Constructor of `ty`: no receiver, produces `ty`
    pub fn constructor(ty: impl Into<TypeName>, parameter_types: Vec<TypeName>) -> Self {
        let ty = ty.into();
        Self {
            name: "new".to_string(),
            declaring_type: ty.clone(),
            result_type: ty,
            parameter_types,
            receiver: None,
            visibility: Visibility::Public,
        }
    }

    /// Static factory declared on `declaring_type` producing `result_type`
    pub fn factory(
        declaring_type: impl Into<TypeName>,
        name: &str,
        parameter_types: Vec<TypeName>,
        result_type: impl Into<TypeName>,
    ) -> Self {
        Self {
            name: name.to_string(),
            declaring_type: declaring_type.into(),
            result_type: result_type.into(),
            parameter_types,
            receiver: None,
            visibility: Visibility::Public,
        }
    }

    /// Instance method on `declaring_type` producing `result_type`
    pub fn method(
        declaring_type: impl Into<TypeName>,
        name: &str,
        parameter_types: Vec<TypeName>,
        result_type: impl Into<TypeName>,
    ) -> Self {
        let declaring_type = declaring_type.into();
        Self {
            name: name.to_string(),
            receiver: Some(declaring_type.clone()),
            declaring_type,
            result_type: result_type.into(),
            parameter_types,
            visibility: Visibility::Public,
        }
    }

    /// Constructor of `ty` that needs an enclosing instance of `enclosing`
    pub fn inner_constructor(
        enclosing: impl Into<TypeName>,
        ty: impl Into<TypeName>,
        parameter_types: Vec<TypeName>,
    ) -> Self {
        let ty = ty.into();
        Self {
            name: "new".to_string(),
            declaring_type: ty.clone(),
            result_type: ty,
            parameter_types,
            receiver: Some(enclosing.into()),
            visibility: Visibility::Public,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn result_type(&self) -> &TypeName {
        &self.result_type
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl OperationHandle for Operation {
    fn declaring_type(&self) -> &TypeName {
        &self.declaring_type
    }

    fn parameter_types(&self) -> &[TypeName] {
        &self.parameter_types
    }

    fn needs_receiver(&self) -> bool {
        self.receiver.is_some()
    }

    fn signature(&self) -> String {
        self.to_string()
    }

    fn receiver_type(&self) -> &TypeName {
        self.receiver.as_ref().unwrap_or(&self.declaring_type)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.parameter_types.iter().map(TypeName::as_str).collect();
        match &self.receiver {
            Some(receiver) => write!(
                f,
                "{}#{}.{}({}) -> {}",
                receiver,
                self.declaring_type,
                self.name,
                params.join(", "),
                self.result_type
            ),
            None => write!(
                f,
                "{}.{}({}) -> {}",
                self.declaring_type,
                self.name,
                params.join(", "),
                self.result_type
            ),
        }
    }
}

/// In-memory catalogue with insertion-ordered lookups
#[derive(Debug, Clone, Default)]
pub struct RegistryCatalogue {
    presets: HashMap<TypeName, Vec<Preset>>,
    operations: HashMap<TypeName, Vec<Operation>>,
    subtypes: HashMap<TypeName, Vec<TypeName>>,
}

impl RegistryCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_preset(&mut self, ty: impl Into<TypeName>, preset: Preset) -> &mut Self {
        self.presets.entry(ty.into()).or_default().push(preset);
        self
    }

    pub fn add_literal(&mut self, ty: impl Into<TypeName>, value: LiteralValue) -> &mut Self {
        self.add_preset(ty, Preset::Literal(value))
    }

    pub fn add_variable(&mut self, ty: impl Into<TypeName>, name: &str) -> &mut Self {
        self.add_preset(ty, Preset::Variable(name.to_string()))
    }

    /// Register `operation` as a way to produce its result type
    pub fn add_operation(&mut self, operation: Operation) -> &mut Self {
        log::debug!("Registering operation {}", operation);
        self.operations
            .entry(operation.result_type.clone())
            .or_default()
            .push(operation);
        self
    }

    /// Record that `subtype` is a subtype of `supertype`
    pub fn add_subtype(
        &mut self,
        supertype: impl Into<TypeName>,
        subtype: impl Into<TypeName>,
    ) -> &mut Self {
        let subtype = subtype.into();
        let known = self.subtypes.entry(supertype.into()).or_default();
        if !known.contains(&subtype) {
            known.push(subtype);
        }
        self
    }

    /// Every type mentioned anywhere in the registry, sorted by name
    pub fn known_types(&self) -> Vec<TypeName> {
        let mut types: Vec<TypeName> = self
            .presets
            .keys()
            .chain(self.operations.keys())
            .chain(self.subtypes.keys())
            .chain(self.subtypes.values().flatten())
            .cloned()
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

impl Catalogue for RegistryCatalogue {
    type Operation = Operation;

    fn literals_for(&self, ty: &TypeName, filter: NullFilter) -> Vec<Preset> {
        self.presets
            .get(ty)
            .map(|presets| {
                presets
                    .iter()
                    .filter(|preset| filter.admits(preset))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn constructing_operations_for(
        &self,
        ty: &TypeName,
        visibility: VisibilityPolicy,
    ) -> Vec<Operation> {
        self.operations
            .get(ty)
            .map(|operations| {
                operations
                    .iter()
                    .filter(|operation| visibility.permits(operation.visibility))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn subtypes_of(&self, ty: &TypeName) -> Vec<TypeName> {
        self.subtypes.get(ty).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> RegistryCatalogue {
        let mut registry = RegistryCatalogue::new();
        registry
            .add_literal("int", LiteralValue::Integer(0))
            .add_literal("int", LiteralValue::Integer(1))
            .add_literal("Point", LiteralValue::Null)
            .add_variable("Point", "origin")
            .add_operation(Operation::constructor(
                "Point",
                vec![TypeName::from("int"), TypeName::from("int")],
            ))
            .add_operation(
                Operation::factory("Point", "parse", vec![TypeName::from("String")], "Point")
                    .with_visibility(Visibility::Package),
            )
            .add_subtype("Shape", "Point")
            .add_subtype("Shape", "Point");
        registry
    }

    #[test]
    fn test_literals_are_filtered_and_ordered() {
        let registry = sample_registry();
        let point = TypeName::from("Point");

        assert_eq!(
            registry.literals_for(&point, NullFilter::Admit),
            vec![
                Preset::Literal(LiteralValue::Null),
                Preset::Variable("origin".to_string())
            ]
        );
        assert_eq!(
            registry.literals_for(&point, NullFilter::Forbid),
            vec![Preset::Variable("origin".to_string())]
        );
        assert!(registry
            .literals_for(&TypeName::from("Missing"), NullFilter::Admit)
            .is_empty());
    }

    #[test]
    fn test_operations_respect_visibility() {
        let registry = sample_registry();
        let point = TypeName::from("Point");

        let public = registry.constructing_operations_for(&point, VisibilityPolicy::PublicOnly);
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].name(), "new");

        let package =
            registry.constructing_operations_for(&point, VisibilityPolicy::IncludePackage);
        assert_eq!(package.len(), 2);
        assert_eq!(package[1].name(), "parse");
    }

    #[test]
    fn test_subtypes_deduplicated() {
        let registry = sample_registry();
        assert_eq!(
            registry.subtypes_of(&TypeName::from("Shape")),
            vec![TypeName::from("Point")]
        );
        assert_eq!(
            registry.known_types(),
            vec![
                TypeName::from("Point"),
                TypeName::from("Shape"),
                TypeName::from("int")
            ]
        );
    }

    #[test]
    fn test_operation_handle_accessors() {
        let method = Operation::method("List", "head", vec![], "int");
        assert!(method.needs_receiver());
        assert_eq!(method.arity(), 0);
        assert_eq!(method.receiver_type(), &TypeName::from("List"));
        assert_eq!(method.signature(), "List#List.head() -> int");

        let inner = Operation::inner_constructor("Outer", "Inner", vec![TypeName::from("int")]);
        assert!(inner.needs_receiver());
        assert_eq!(inner.receiver_type(), &TypeName::from("Outer"));
        assert_eq!(inner.declaring_type(), &TypeName::from("Inner"));
        assert_eq!(inner.signature(), "Outer#Inner.new(int) -> Inner");

        let ctor = Operation::constructor("Point", vec![TypeName::from("int")]);
        assert!(!ctor.needs_receiver());
        assert_eq!(ctor.signature(), "Point.new(int) -> Point");
    }
}

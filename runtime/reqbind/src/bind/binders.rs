use crate::coerce::{CoercionError, FromParam};
use crate::reflect::{ParamDescriptor, RegionKind};
use crate::request::{ContextValue, ContextValues, PathValues, QueryValues};

use super::BindError;

/// Looks up and coerces the value of a single parameter.
///
/// There is one implementation per parameter region.
pub trait ParamBinder {
    fn bind<T>(&self, param: &ParamDescriptor) -> Result<T, BindError>
    where
        T: FromParam + Default + Clone + Send + Sync + 'static;

    /// Look up a value that is handed over as it is, without coercion.
    ///
    /// `Ok(None)` means that the value is absent and the parameter is optional.
    fn bind_typed<T>(&self, param: &ParamDescriptor) -> Result<Option<T>, BindError>
    where
        T: Clone + Send + Sync + 'static;
}

/// Binds path parameters.
///
/// An empty value is treated as absent.
pub struct PathBinder<'a> {
    values: &'a PathValues,
}

impl<'a> PathBinder<'a> {
    pub fn new(values: &'a PathValues) -> Self {
        Self { values }
    }
}

impl ParamBinder for PathBinder<'_> {
    fn bind<T>(&self, param: &ParamDescriptor) -> Result<T, BindError>
    where
        T: FromParam + Default + Clone + Send + Sync + 'static,
    {
        match self.values.get(param.alias()).filter(|v| !v.is_empty()) {
            Some(value) => T::from_param(value)
                .map_err(|e| BindError::coercion(RegionKind::Path, param.alias(), param.field(), e)),
            None => absent(RegionKind::Path, param),
        }
    }

    fn bind_typed<T>(&self, param: &ParamDescriptor) -> Result<Option<T>, BindError>
    where
        T: Clone + Send + Sync + 'static,
    {
        Err(untyped(RegionKind::Path, param))
    }
}

/// Binds query parameters.
///
/// A key that is present, even without values, is never missing.
pub struct QueryBinder<'a> {
    values: &'a QueryValues,
}

impl<'a> QueryBinder<'a> {
    pub fn new(values: &'a QueryValues) -> Self {
        Self { values }
    }
}

impl ParamBinder for QueryBinder<'_> {
    fn bind<T>(&self, param: &ParamDescriptor) -> Result<T, BindError>
    where
        T: FromParam + Default + Clone + Send + Sync + 'static,
    {
        match self.values.get(param.alias()) {
            Some(values) => T::from_params(values).map_err(|e| {
                BindError::coercion(RegionKind::Query, param.alias(), param.field(), e)
            }),
            None => absent(RegionKind::Query, param),
        }
    }

    fn bind_typed<T>(&self, param: &ParamDescriptor) -> Result<Option<T>, BindError>
    where
        T: Clone + Send + Sync + 'static,
    {
        Err(untyped(RegionKind::Query, param))
    }
}

/// Binds context values.
///
/// Textual values are coerced, typed values must match the declared type exactly.
pub struct ContextBinder<'a> {
    values: &'a ContextValues,
}

impl<'a> ContextBinder<'a> {
    pub fn new(values: &'a ContextValues) -> Self {
        Self { values }
    }
}

impl ParamBinder for ContextBinder<'_> {
    fn bind<T>(&self, param: &ParamDescriptor) -> Result<T, BindError>
    where
        T: FromParam + Default + Clone + Send + Sync + 'static,
    {
        match self.values.get(param.alias()) {
            Some(ContextValue::Text(text)) => T::from_param(text).map_err(|e| {
                BindError::coercion(RegionKind::Context, param.alias(), param.field(), e)
            }),
            Some(value) => downcast(param, value),
            None => absent(RegionKind::Context, param),
        }
    }

    fn bind_typed<T>(&self, param: &ParamDescriptor) -> Result<Option<T>, BindError>
    where
        T: Clone + Send + Sync + 'static,
    {
        match self.values.get(param.alias()) {
            // Textual values can only be bound to a `String`.
            Some(value) => downcast(param, value).map(Some),
            None if param.is_optional() => Ok(None),
            None => Err(BindError::missing(RegionKind::Context, param.alias(), param.field())),
        }
    }
}

fn downcast<T>(param: &ParamDescriptor, value: &ContextValue) -> Result<T, BindError>
where
    T: Clone + 'static,
{
    value
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| BindError::TypeMismatch {
            alias: param.alias().to_owned(),
            field: param.field(),
            expected: param.type_name(),
            actual: value.type_name(),
        })
}

/// Path and query values are always textual.
fn untyped(region: RegionKind, param: &ParamDescriptor) -> BindError {
    BindError::UnsupportedType {
        region,
        alias: param.alias().to_owned(),
        field: param.field(),
        source: CoercionError::UnsupportedType {
            type_name: param.type_name(),
        },
    }
}

fn absent<T: Default>(region: RegionKind, param: &ParamDescriptor) -> Result<T, BindError> {
    if param.is_optional() {
        Ok(T::default())
    } else {
        Err(BindError::missing(region, param.alias(), param.field()))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::reflect::{BindingPlan, ParamDecl, RegionDecl, ShapeDecl};

    struct Shape;

    /// Resolve a single parameter declaration into its descriptor.
    fn descriptor<T: FromParam>(kind: RegionKind, field: &'static str, tag: &'static str) -> ParamDescriptor {
        let decl = ShapeDecl::<Shape>::new().region(RegionDecl::with_params::<()>(
            kind,
            "region",
            vec![ParamDecl::new::<T>(field, tag)],
        ));
        let plan = BindingPlan::from_decl(decl).unwrap();
        plan.region(kind).unwrap().params()[0].clone()
    }

    #[test]
    fn path_values_are_coerced() {
        let id = Uuid::new_v4();
        let values: PathValues = [("id", id.to_string())].into_iter().collect();
        let binder = PathBinder::new(&values);
        let param = descriptor::<Uuid>(RegionKind::Path, "id", "id");
        assert_eq!(binder.bind::<Uuid>(&param).unwrap(), id);
    }

    #[test]
    fn malformed_path_values_reference_alias_and_field() {
        let values: PathValues = [("id", "not-a-uuid")].into_iter().collect();
        let binder = PathBinder::new(&values);
        let param = descriptor::<Uuid>(RegionKind::Path, "ID", "id");
        let err = binder.bind::<Uuid>(&param).unwrap_err();
        assert_eq!(err.alias(), Some("id"));
        assert_eq!(err.field(), Some("ID"));
        match &err {
            BindError::InvalidValue { source, .. } => {
                assert!(matches!(source, crate::coerce::CoercionError::Malformed { value, .. } if value == "not-a-uuid"));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_path_values_are_absent() {
        let values: PathValues = [("id", "")].into_iter().collect();
        let binder = PathBinder::new(&values);

        let required = descriptor::<u32>(RegionKind::Path, "id", "id");
        let err = binder.bind::<u32>(&required).unwrap_err();
        insta::assert_snapshot!(err, @"Missing required path parameter `id` (field `id`)");

        let optional = descriptor::<u32>(RegionKind::Path, "id", "id,optional");
        assert_eq!(binder.bind::<u32>(&optional).unwrap(), 0);
    }

    #[test]
    fn missing_query_params() {
        let values = QueryValues::new();
        let binder = QueryBinder::new(&values);

        let required = descriptor::<String>(RegionKind::Query, "title", "");
        let err = binder.bind::<String>(&required).unwrap_err();
        insta::assert_snapshot!(err, @"Missing required query parameter `title` (field `title`)");

        let optional = descriptor::<String>(RegionKind::Query, "status", "status,optional");
        assert_eq!(binder.bind::<String>(&optional).unwrap(), "");
    }

    #[test]
    fn present_but_empty_query_lists_are_empty_sequences() {
        let mut values = QueryValues::new();
        values.insert_empty("tag");
        let binder = QueryBinder::new(&values);
        let param = descriptor::<Vec<String>>(RegionKind::Query, "tags", "tag");
        assert!(binder.bind::<Vec<String>>(&param).unwrap().is_empty());
        // Scalars read an empty list as an empty string.
        let param = descriptor::<String>(RegionKind::Query, "title", "tag");
        assert_eq!(binder.bind::<String>(&param).unwrap(), "");
    }

    #[test]
    fn query_sequences_preserve_order() {
        let mut values = QueryValues::new();
        for v in ["a", "b", "c"] {
            values.append("tag", v);
        }
        let binder = QueryBinder::new(&values);
        let param = descriptor::<Vec<String>>(RegionKind::Query, "tags", "tag");
        assert_eq!(binder.bind::<Vec<String>>(&param).unwrap(), vec!["a", "b", "c"]);

        let param = descriptor::<String>(RegionKind::Query, "first", "tag");
        assert_eq!(binder.bind::<String>(&param).unwrap(), "a");
    }

    #[test]
    fn textual_context_values_are_coerced() {
        let mut values = ContextValues::new();
        values.insert_text("user_id", "42");
        let binder = ContextBinder::new(&values);
        let param = descriptor::<u64>(RegionKind::Context, "user", "user_id");
        assert_eq!(binder.bind::<u64>(&param).unwrap(), 42);
    }

    #[test]
    fn typed_context_values_must_match_exactly() {
        let mut values = ContextValues::new();
        values.insert_typed("names", vec!["Ada".to_string(), "Grace".to_string()]);
        let binder = ContextBinder::new(&values);

        let param = descriptor::<Vec<String>>(RegionKind::Context, "names", "names");
        assert_eq!(
            binder.bind::<Vec<String>>(&param).unwrap(),
            vec!["Ada".to_string(), "Grace".to_string()]
        );

        let param = descriptor::<Vec<u32>>(RegionKind::Context, "names", "names");
        let err = binder.bind::<Vec<u32>>(&param).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
        assert_eq!(err.region(), Some(RegionKind::Context));
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Session {
        user_id: u64,
    }

    fn typed_descriptor<T: 'static>(field: &'static str, tag: &'static str) -> ParamDescriptor {
        let decl = ShapeDecl::<Shape>::new().region(RegionDecl::with_params::<()>(
            RegionKind::Context,
            "region",
            vec![ParamDecl::typed::<T>(field, tag).nullable()],
        ));
        let plan = BindingPlan::from_decl(decl).unwrap();
        plan.region(RegionKind::Context).unwrap().params()[0].clone()
    }

    #[test]
    fn typed_context_values_are_bound_without_coercion() {
        let mut values = ContextValues::new();
        values.insert_typed("session", Session { user_id: 7 });
        values.insert_text("greeting", "hi");
        let binder = ContextBinder::new(&values);

        let param = typed_descriptor::<Session>("session", "");
        assert_eq!(
            binder.bind_typed::<Session>(&param).unwrap(),
            Some(Session { user_id: 7 })
        );

        let param = typed_descriptor::<String>("greeting", "");
        assert_eq!(binder.bind_typed::<String>(&param).unwrap().as_deref(), Some("hi"));

        let param = typed_descriptor::<Session>("greeting", "");
        let err = binder.bind_typed::<Session>(&param).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { field: "greeting", .. }));
    }

    #[test]
    fn absent_typed_context_values() {
        let values = ContextValues::new();
        let binder = ContextBinder::new(&values);

        let param = typed_descriptor::<Session>("session", "optional");
        assert_eq!(binder.bind_typed::<Session>(&param).unwrap(), None);

        let param = typed_descriptor::<Session>("session", "");
        let err = binder.bind_typed::<Session>(&param).unwrap_err();
        insta::assert_snapshot!(err, @"Missing required context value `session` (field `session`)");
    }

    #[test]
    fn path_values_are_never_typed() {
        let values: PathValues = [("id", "1")].into_iter().collect();
        let binder = PathBinder::new(&values);
        let param = descriptor::<u64>(RegionKind::Path, "id", "id");
        let err = binder.bind_typed::<u64>(&param).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedType { region: RegionKind::Path, .. }));
    }

    #[test]
    fn missing_context_values() {
        let values = ContextValues::new();
        let binder = ContextBinder::new(&values);

        let param = descriptor::<String>(RegionKind::Context, "user", "user");
        let err = binder.bind::<String>(&param).unwrap_err();
        assert!(matches!(err, BindError::MissingContextValue(ref p) if p.alias == "user"));

        let param = descriptor::<Option<String>>(RegionKind::Context, "user", "user,optional");
        assert_eq!(binder.bind::<Option<String>>(&param).unwrap(), None);
    }
}

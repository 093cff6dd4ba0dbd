use reqbind::bind::{BindError, bind};
use reqbind::reflect::{BindingPlan, PlanError, RegionKind};
use reqbind::request::{ContextValues, PathValues, QueryValues};
use reqbind::{FromParam, Params, RequestShape};
use uuid::Uuid;

#[derive(Debug, Default, Params)]
pub struct TodoPath {
    #[param("id,desc=The todo identifier")]
    pub id: Uuid,
}

#[derive(Debug, Default, Params)]
pub struct Filters {
    #[param("status,optional")]
    pub status: String,
    #[param("page,optional")]
    pub page: Option<u32>,
    #[param("tag,optional")]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Params)]
pub struct Caller {
    #[param("user")]
    pub user: String,
    #[param("names,optional")]
    pub names: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct NewTodo {
    pub title: String,
}

#[derive(Debug, RequestShape)]
pub struct ListTodos {
    #[bind(path)]
    pub path: TodoPath,
    #[bind(query)]
    pub filters: Filters,
    #[bind(context)]
    pub caller: Caller,
    pub not_bound: u8,
}

#[derive(Debug, RequestShape)]
pub struct CreateTodo {
    #[bind(body)]
    pub body: NewTodo,
}

#[derive(Debug, RequestShape)]
pub struct Nothing {
    pub untouched: Vec<String>,
}

fn path(pairs: &[(&str, &str)]) -> PathValues {
    pairs.iter().copied().collect()
}

fn query(plan: &BindingPlan<ListTodos>, raw: &str) -> QueryValues {
    QueryValues::parse(raw, plan.aliases(RegionKind::Query))
}

fn caller(user: &str) -> ContextValues {
    let mut context = ContextValues::new();
    context.insert_text("user", user);
    context
}

fn bind_list(path_values: PathValues, raw_query: &str, context: ContextValues) -> Result<ListTodos, BindError> {
    let plan = BindingPlan::<ListTodos>::build().unwrap();
    let query = query(&plan, raw_query);
    bind(&plan, std::io::empty(), &path_values, &query, &context)
}

#[test]
fn shapes_without_regions_bind_to_their_default() {
    let plan = BindingPlan::<Nothing>::build().unwrap();
    let bound = bind(
        &plan,
        std::io::empty(),
        &PathValues::new(),
        &QueryValues::new(),
        &ContextValues::new(),
    )
    .unwrap();
    assert!(bound.untouched.is_empty());
}

#[test]
fn all_parameter_regions_are_bound() {
    let id = Uuid::new_v4();
    let bound = bind_list(
        path(&[("id", id.to_string().as_str())]),
        "status=done&page=2&tag=a&tag=b&ignored=1",
        caller("ferris"),
    )
    .unwrap();
    assert_eq!(bound.path.id, id);
    assert_eq!(bound.filters.status, "done");
    assert_eq!(bound.filters.page, Some(2));
    assert_eq!(bound.filters.tags, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(bound.caller.user, "ferris");
    assert!(bound.caller.names.is_empty());
    assert_eq!(bound.not_bound, 0);
}

#[test]
fn optional_parameters_default_when_absent() {
    let bound = bind_list(
        path(&[("id", Uuid::new_v4().to_string().as_str())]),
        "",
        caller("ferris"),
    )
    .unwrap();
    assert_eq!(bound.filters.status, "");
    assert_eq!(bound.filters.page, None);
    assert!(bound.filters.tags.is_empty());
}

#[test]
fn an_empty_query_value_is_still_a_value() {
    let bound = bind_list(
        path(&[("id", Uuid::new_v4().to_string().as_str())]),
        "status=",
        caller("ferris"),
    )
    .unwrap();
    assert_eq!(bound.filters.status, "");
}

#[test]
fn missing_path_parameters_are_reported_with_their_alias() {
    let err = bind_list(PathValues::new(), "", caller("ferris")).unwrap_err();
    assert!(matches!(err, BindError::MissingPathParam(_)));
    assert_eq!(err.alias(), Some("id"));
    insta::assert_snapshot!(err, @"Missing required path parameter `id` (field `id`)");
}

#[test]
fn empty_path_values_count_as_missing() {
    let err = bind_list(path(&[("id", "")]), "", caller("ferris")).unwrap_err();
    assert!(matches!(err, BindError::MissingPathParam(_)));
}

#[test]
fn missing_context_values_are_reported_with_their_alias() {
    let err = bind_list(
        path(&[("id", Uuid::new_v4().to_string().as_str())]),
        "",
        ContextValues::new(),
    )
    .unwrap_err();
    assert!(matches!(err, BindError::MissingContextValue(_)));
    insta::assert_snapshot!(err, @"Missing required context value `user` (field `user`)");
}

#[test]
fn malformed_uuids_are_rejected() {
    let err = bind_list(path(&[("id", "not-a-uuid")]), "", caller("ferris")).unwrap_err();
    let BindError::InvalidValue { region, .. } = &err else {
        panic!("Expected an invalid value, got {err:?}");
    };
    assert_eq!(*region, RegionKind::Path);
    assert_eq!(err.alias(), Some("id"));
    assert_eq!(err.field(), Some("id"));
    assert!(
        err.to_string()
            .starts_with("Invalid path parameter `id` (field `id`): `not-a-uuid` is not a valid UUID")
    );
}

#[test]
fn malformed_integers_are_rejected() {
    let err = bind_list(
        path(&[("id", Uuid::new_v4().to_string().as_str())]),
        "page=two",
        caller("ferris"),
    )
    .unwrap_err();
    insta::assert_snapshot!(err, @"Invalid query parameter `page` (field `page`): `two` is not a valid integer: invalid digit found in string");
}

#[test]
fn typed_context_values_are_handed_over_as_is() {
    let mut context = caller("ferris");
    context.insert_typed("names", vec!["Alice".to_string(), "Bob".to_string()]);
    let bound = bind_list(path(&[("id", Uuid::new_v4().to_string().as_str())]), "", context).unwrap();
    assert_eq!(bound.caller.names, vec!["Alice".to_string(), "Bob".to_string()]);
}

#[test]
fn typed_context_values_must_have_the_declared_type() {
    let mut context = ContextValues::new();
    context.insert_typed("user", 42u64);
    let err = bind_list(path(&[("id", Uuid::new_v4().to_string().as_str())]), "", context).unwrap_err();
    assert!(matches!(err, BindError::TypeMismatch { field: "user", .. }));
    assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

pub struct Database {
    pub url: String,
}

#[derive(Params)]
pub struct Session {
    #[param("user", typed)]
    pub user: User,
    #[param("db,optional", typed)]
    pub db: Option<std::sync::Arc<Database>>,
    #[param("trace,optional")]
    pub trace: Option<String>,
}

#[derive(RequestShape)]
pub struct Whoami {
    #[bind(context)]
    pub session: Session,
}

fn bind_whoami(context: ContextValues) -> Result<Whoami, BindError> {
    let plan = BindingPlan::<Whoami>::build().unwrap();
    bind(&plan, std::io::empty(), &PathValues::new(), &QueryValues::new(), &context)
}

#[test]
fn plain_structs_are_bound_from_typed_context_values() {
    let user = User {
        id: 7,
        name: "ferris".into(),
    };
    let mut context = ContextValues::new();
    context.insert_typed("user", user.clone());
    context.insert_typed(
        "db",
        std::sync::Arc::new(Database {
            url: "postgres://localhost".into(),
        }),
    );

    let bound = bind_whoami(context).unwrap();
    assert_eq!(bound.session.user, user);
    assert_eq!(bound.session.db.unwrap().url, "postgres://localhost");
    assert_eq!(bound.session.trace, None);
}

#[test]
fn optional_typed_context_values_can_be_absent() {
    let mut context = ContextValues::new();
    context.insert_typed(
        "user",
        User {
            id: 1,
            name: "carol".into(),
        },
    );
    let bound = bind_whoami(context).unwrap();
    assert!(bound.session.db.is_none());
}

#[test]
fn required_typed_context_values_must_be_present() {
    let err = bind_whoami(ContextValues::new()).err().unwrap();
    insta::assert_snapshot!(err, @"Missing required context value `user` (field `user`)");
}

#[test]
fn typed_context_values_are_not_coerced() {
    let mut context = ContextValues::new();
    context.insert_text("user", "7");
    let err = bind_whoami(context).err().unwrap();
    assert!(matches!(err, BindError::TypeMismatch { field: "user", actual: "alloc::string::String", .. }));
}

#[test]
fn the_body_is_decoded_as_json() {
    let plan = BindingPlan::<CreateTodo>::build().unwrap();
    let bound = bind(
        &plan,
        br#"{"title": "Buy milk"}"#.as_slice(),
        &PathValues::new(),
        &QueryValues::new(),
        &ContextValues::new(),
    )
    .unwrap();
    assert_eq!(bound.body.title, "Buy milk");
}

#[test]
fn malformed_bodies_are_rejected() {
    let plan = BindingPlan::<CreateTodo>::build().unwrap();
    let err = bind(
        &plan,
        b"{not json".as_slice(),
        &PathValues::new(),
        &QueryValues::new(),
        &ContextValues::new(),
    )
    .unwrap_err();
    assert!(matches!(err, BindError::Body { field: "body", .. }));
    assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
}

#[derive(Debug, Default, Clone, PartialEq, FromParam)]
pub enum Status {
    #[default]
    Open,
    Done,
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Status::Open),
            "done" => Ok(Status::Done),
            other => Err(format!("unknown status `{other}`")),
        }
    }
}

#[derive(Debug, Default, Params)]
pub struct StatusFilter {
    #[param("status,optional")]
    pub status: Option<Status>,
}

#[derive(Debug, RequestShape)]
pub struct FilterByStatus {
    #[bind(query)]
    pub query: StatusFilter,
}

#[test]
fn custom_types_decode_themselves() {
    let plan = BindingPlan::<FilterByStatus>::build().unwrap();
    let bind_query = |raw: &str| {
        let query = QueryValues::parse(raw, plan.aliases(RegionKind::Query));
        bind(
            &plan,
            std::io::empty(),
            &PathValues::new(),
            &query,
            &ContextValues::new(),
        )
    };

    assert_eq!(bind_query("").unwrap().query.status, None);
    assert_eq!(bind_query("status=done").unwrap().query.status, Some(Status::Done));
    let err = bind_query("status=closed").unwrap_err();
    insta::assert_snapshot!(
        err.to_string().replace(std::any::type_name::<Status>(), "Status"),
        @"Invalid query parameter `status` (field `status`): `closed` is not a valid Status: unknown status `closed`"
    );
}

#[derive(Debug, Default, Params)]
pub struct BadTag {
    #[param("id,sometimes")]
    pub id: u64,
}

#[derive(Debug, Default, Params)]
pub struct ListInPath {
    #[param("ids")]
    pub ids: Vec<u64>,
}

#[derive(Debug, RequestShape)]
pub struct Misconfigured {
    #[bind(path)]
    pub path: ListInPath,
    #[bind(query)]
    pub first: BadTag,
    #[bind(query)]
    pub second: BadTag,
}

#[test]
fn all_declaration_mistakes_are_reported_at_once() {
    let errors = BindingPlan::<Misconfigured>::build().unwrap_err();
    let errors: Vec<_> = errors.iter().collect();
    assert_eq!(errors.len(), 3);
    assert!(matches!(
        errors[0],
        PlanError::UnsupportedParamType { kind: RegionKind::Path, field: "ids", .. }
    ));
    assert!(matches!(errors[1], PlanError::InvalidTag { region: "first", field: "id", .. }));
    assert!(matches!(
        errors[2],
        PlanError::DuplicateRegion { kind: RegionKind::Query, first: "first", second: "second" }
    ));
}

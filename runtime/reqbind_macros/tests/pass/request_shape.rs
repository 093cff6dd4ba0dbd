use reqbind::pipeline::{Context, OnBindError, Validate};
use reqbind::reflect::{BindingPlan, RegionKind};
use reqbind::bind::BindError;
use reqbind::{Error, Params, RequestShape};

#[derive(Default, Params)]
pub struct TodoPath {
    #[param("id")]
    pub id: uuid::Uuid,
}

#[derive(Default, Params)]
pub struct Filters {
    #[param("status,optional")]
    pub status: String,
    #[param]
    pub limit: Option<u32>,
    pub not_a_param: bool,
}

impl Validate for Filters {
    fn validate(&self, _ctx: &mut Context<'_>) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(serde::Deserialize)]
pub struct Patch {
    pub title: Option<String>,
}

#[derive(RequestShape)]
#[request(validate, on_bind_error)]
pub struct UpdateTodo {
    #[bind(query, validate)]
    pub filters: Filters,
    #[bind(path)]
    pub path: Box<TodoPath>,
    #[bind(body)]
    pub body: Patch,
    pub unbound: Vec<u8>,
}

impl Validate for UpdateTodo {
    fn validate(&self, _ctx: &mut Context<'_>) -> Result<(), Error> {
        Ok(())
    }
}

impl OnBindError for UpdateTodo {
    fn on_bind_error(_ctx: &mut Context<'_>, error: BindError) -> Option<Error> {
        Some(Error::internal(error.to_string()))
    }
}

#[derive(RequestShape)]
pub struct Empty {}

fn main() {
    let plan = BindingPlan::<UpdateTodo>::build().unwrap();
    assert_eq!(plan.regions().len(), 3);
    assert!(plan.region(RegionKind::Query).unwrap().validator().is_some());
    assert!(plan.validator().is_some());
    assert!(plan.bind_error_hook().is_some());

    let plan = BindingPlan::<Empty>::build().unwrap();
    assert_eq!(plan.regions().len(), 0);
}

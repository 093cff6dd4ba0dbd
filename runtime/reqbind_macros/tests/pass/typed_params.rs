use std::sync::Arc;

use reqbind::coerce::ParamKind;
use reqbind::reflect::{BindingPlan, RegionKind};
use reqbind::{Params, RequestShape};

#[derive(Clone)]
pub struct User {
    pub id: u64,
}

pub struct Pool;

#[derive(Params)]
pub struct Caller {
    #[param("user", typed)]
    pub user: User,
    #[param("pool,optional", typed)]
    pub pool: Option<Arc<Pool>>,
    #[param(typed)]
    pub tenant: std::option::Option<String>,
}

#[derive(RequestShape)]
pub struct Whoami {
    #[bind(context)]
    pub caller: Caller,
}

fn main() {
    let plan = BindingPlan::<Whoami>::build().unwrap();
    let params = plan.region(RegionKind::Context).unwrap().params();
    assert_eq!(params.len(), 3);
    assert!(params.iter().all(|p| p.kind() == ParamKind::Typed));
    assert!(params[1].is_optional());
}

#[derive(reqbind::Params)]
pub struct TodoPath {
    #[param(id)]
    pub id: u64,
}

fn main() {}

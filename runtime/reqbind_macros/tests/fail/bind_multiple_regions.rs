#[derive(reqbind::RequestShape)]
pub struct ListTodos {
    #[bind(path, query)]
    pub filters: String,
}

fn main() {}

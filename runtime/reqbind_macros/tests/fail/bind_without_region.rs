#[derive(reqbind::RequestShape)]
pub struct CreateTodo {
    #[bind]
    pub body: String,
    #[bind()]
    pub path: String,
}

fn main() {}

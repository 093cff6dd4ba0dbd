#[derive(reqbind::RequestShape)]
pub struct CreateTodo {
    #[bind(body)]
    #[bind(body)]
    pub body: String,
}

fn main() {}

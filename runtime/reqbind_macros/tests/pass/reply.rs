use reqbind::Reply;
use reqbind::pipeline::Context;
use reqbind::request::RequestHead;
use reqbind::response::{Render, RenderError, ResponseWriter};

#[derive(serde::Serialize, Reply)]
pub struct Todo {
    pub title: String,
}

#[derive(Reply)]
#[reply(text)]
pub struct Greeting(String);

impl std::fmt::Display for Greeting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hello, {}!", self.0)
    }
}

#[derive(Reply)]
#[reply(render)]
pub struct Teapot;

impl Render for Teapot {
    fn render(&self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        ctx.response().set_status(http::StatusCode::IM_A_TEAPOT);
        Ok(())
    }
}

fn main() {
    let head: RequestHead = http::Request::new(()).into_parts().0.into();

    let mut writer = ResponseWriter::new();
    Todo { title: "Buy milk".into() }
        .reply(&mut Context::new(&head, &mut writer))
        .unwrap();
    assert_eq!(&writer.body()[..], br#"{"title":"Buy milk"}"#);

    let mut writer = ResponseWriter::new();
    Greeting("Ferris".into())
        .reply(&mut Context::new(&head, &mut writer))
        .unwrap();
    assert_eq!(&writer.body()[..], b"Hello, Ferris!");

    let mut writer = ResponseWriter::new();
    Teapot.reply(&mut Context::new(&head, &mut writer)).unwrap();
    assert_eq!(writer.status(), http::StatusCode::IM_A_TEAPOT);
}

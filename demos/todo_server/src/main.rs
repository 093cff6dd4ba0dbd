use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context as _;
use hyper::body::Incoming;
use hyper_util::rt::TokioIo;
use reqbind::config::EndpointConfig;
use tokio::net::TcpListener;
use tracing_log_error::log_error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::router::Router;
use crate::todo::TodoStore;

mod errors;
mod router;
mod routes;
mod todo;

const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";

fn init_telemetry() {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqbind=debug,todo_server=debug"));
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    init_telemetry();

    let config_path = std::env::var_os("TODO_SERVER_CONFIG").map(PathBuf::from);
    let config = EndpointConfig::load(config_path.as_deref())?;
    let router = router::todo_api::<Incoming>(Arc::new(TodoStore::default()), config)?;

    let address: SocketAddr = std::env::var("TODO_SERVER_ADDRESS")
        .unwrap_or_else(|_| DEFAULT_ADDRESS.to_owned())
        .parse()
        .context("`TODO_SERVER_ADDRESS` is not a valid socket address")?;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind to {address}"))?;
    tracing::info!(%address, "Listening for incoming connections");

    // The router holds `!Send` routes, so every connection is served on this thread.
    let local = tokio::task::LocalSet::new();
    local.run_until(serve(listener, Rc::new(router))).await;
    Ok(())
}

async fn serve(listener: TcpListener, router: Rc<Router<Incoming>>) {
    let connection_handler = hyper_util::server::conn::auto::Builder::new(LocalExec);
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    log_error!(e, level: tracing::Level::WARN, "Failed to accept a connection");
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                return;
            }
        };
        let router = Rc::clone(&router);
        let connection_handler = connection_handler.clone();
        tokio::task::spawn_local(async move {
            let service = hyper::service::service_fn(move |request| {
                let router = Rc::clone(&router);
                async move {
                    let response = router.dispatch(request).await;
                    Ok::<_, Infallible>(response.into_http())
                }
            });
            if let Err(e) = connection_handler
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::warn!(%peer, error = %e, "Failed to serve a connection");
            }
        });
    }
}

/// An executor that can spawn `!Send` futures.
///
/// It must be used from within a `LocalSet`.
#[derive(Clone, Copy, Debug)]
struct LocalExec;

impl<F> hyper::rt::Executor<F> for LocalExec
where
    F: std::future::Future + 'static,
{
    fn execute(&self, fut: F) {
        tokio::task::spawn_local(fut);
    }
}

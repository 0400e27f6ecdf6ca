use barehttp::config::Config;
use barehttp::http::handler::{Handler, HandlerFuture};
use barehttp::http::request::Request;
use barehttp::http::writer::ResponseWriter;
use barehttp::server;

struct Hello;

impl Handler for Hello {
    fn call<'a>(&'a self, req: &'a mut Request, res: &'a mut ResponseWriter) -> HandlerFuture<'a> {
        Box::pin(async move {
            tracing::info!(method = %req.method(), target = %req.target(), "Request");
            res.set_header("Content-Type", "text/plain");
            res.write("hi there \n")?;
            res.end("Hello World")?;
            anyhow::Ok(())
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()>{
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    tokio::select! {
        res = server::listener::run(&cfg, Hello) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

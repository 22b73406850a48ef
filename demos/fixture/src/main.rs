use fernie::builtin::{inject, rescue, trace};
use fernie::handler::respond;
use fernie::{Context, Error, Reply, Request, Route, Router, Server, get, leaf, paths, stack};
use std::env;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone)]
struct User(&'static str);

async fn current_user(cx: Context, _: Request) -> fernie::Result {
    Ok(cx.get::<User>().map_or("anonymous", |user| user.0).into())
}

async fn create(_: Context, _: Request) -> fernie::Result {
    Err(Error::new("Another error"))
}

async fn destroy(_: Context, _: Request) -> fernie::Result {
    Err(Error::new("Sample error"))
}

fn routes() -> Route {
    let test = stack()
        .with(rescue(|_, _| Ok(Reply::status(404))))
        .with(inject(|_, _| User("test user")))
        .to(get(leaf(current_user))
            .post(
                stack()
                    .with(rescue(|_, _| Ok(Reply::status(401))))
                    .to(leaf(create)),
            )
            .patch(leaf(respond("sick")))
            .delete(leaf(destroy)));

    let nested = paths()
        .at("/test", leaf(respond("wew")))
        .at("/second", paths().at("/test", leaf(respond("wow"))));

    stack().with(trace()).to(paths()
        .at("/one", leaf(respond("single")))
        .at("/test", test)
        .at("/nested", nested))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fernie=debug,fixture=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let address = env::var("FERNIE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());

    match Server::new(Router::new(routes())).listen(address).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "server exited with an error");
            ExitCode::FAILURE
        }
    }
}

use mock_server::{app_with, serve, DirectoryData};
use tokio::net::TcpListener;

/// Serves the seeded directory on `127.0.0.1:$PORT` (default 3000).
/// `MOCK_EMPTY=1` starts with no users instead.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let data = match std::env::var("MOCK_EMPTY").as_deref() {
        Ok("1") | Ok("true") => DirectoryData::empty(),
        _ => DirectoryData::seeded(),
    };
    let users = data.users.len();

    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    let addr = listener.local_addr()?;
    println!("mock directory with {users} users listening on http://{addr}");

    let (router, _) = app_with(data);
    serve(listener, router).await
}

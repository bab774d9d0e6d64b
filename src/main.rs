use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Context;
use aws_sdk_s3::config::Credentials;
use repository::init_repository;
use tokio::net::TcpListener;
use toml::{map::Map, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let secrets = util::load_toml("Secrets.dev.toml")?;

    let conn_string = secret(&secrets, "DATABASE_URL")?;
    let repository = init_repository(&conn_string).await?;

    let access_key_id = secret(&secrets, "AWS_ACCESS_KEY_ID")?;
    let secret_access_key = secret(&secrets, "AWS_SECRET_ACCESS_KEY")?;
    let aws_url = secret(&secrets, "AWS_URL")?;
    let bucket = secret(&secrets, "BUCKET")?;
    let credentials =
        Credentials::new(access_key_id, secret_access_key, None, None, "");
    let cfg = aws_config::from_env()
        .endpoint_url(aws_url)
        .region("auto")
        .credentials_provider(credentials)
        .load()
        .await;
    let s3 = aws_sdk_s3::Client::new(&cfg);

    let jwt_secret = secret(&secrets, "JWT_SECRET")?;

    let router =
        api::serve(repository, s3, bucket, "Config.toml", jwt_secret).await?;

    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8000));
    let listener = TcpListener::bind(&address).await?;
    Ok(axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?)
}

fn secret(secrets: &Map<String, Value>, key: &str) -> anyhow::Result<String> {
    Ok(secrets
        .get(key)
        .and_then(|v| v.as_str())
        .with_context(|| {
            format!("{} was not found in Secrets.dev.toml", key)
        })?
        .to_string())
}

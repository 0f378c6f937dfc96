use std::sync::Arc;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "postgres:///plcmirror")]
    dsn: String,

    #[arg(long, default_value_t = 32)]
    max_connections: u32,

    #[arg(long, default_value = "[::]:8080")]
    listen: std::net::SocketAddr,

    #[arg(long)]
    metrics_listen: Option<std::net::SocketAddr>,

    #[arg(long, default_value = "https://plc.directory")]
    plcdirectory_host: String,

    /// Maximum age of the newest mirrored record before the mirror is
    /// considered stale.
    #[arg(long, default_value_t = 300)]
    max_delay_secs: i64,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    if let Some(metrics_listen) = args.metrics_listen {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(metrics_listen)
            .install()?;
    }

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(args.max_connections)
        .connect(&args.dsn)
        .await?;
    let store = plc_mirror::store::postgres::PgStore::new(pool);
    if args.migrate {
        store.migrate().await?;
    }
    let store: Arc<dyn plc_mirror::store::Store> = Arc::new(store);
    let tracker = Arc::new(plc_mirror::tracker::Tracker::new(store.clone()));

    let (trigger, shutdown) = plc_mirror::shutdown::channel();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
        tracing::info!("shutting down");
        trigger.trigger();
    });

    let mirror = tokio::spawn(
        plc_mirror::mirror::Mirror::new(
            store.clone(),
            Box::new(plc_mirror::export::HttpExport::new(
                reqwest::Client::new(),
                &args.plcdirectory_host,
            )),
            tracker.clone(),
            shutdown.clone(),
        )
        .run(),
    );

    let state = Arc::new(plc_mirror::AppState {
        resolver: plc_mirror::resolve::Resolver::new(
            store.clone(),
            tracker,
            time::Duration::seconds(args.max_delay_secs),
        ),
        store,
        shutdown: shutdown.clone(),
    });

    tracing::info!(listen = %args.listen, "serving");
    axum::Server::bind(&args.listen)
        .serve(plc_mirror::handlers::router(state).into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    mirror.await?;
    Ok(())
}

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use configuration::Config;
use database::DbRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub db_repo: DbRepository,
}

/// The main function to configure and run the web server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let db_pool = database::connect(
        config.database.max_connections,
        Duration::from_secs(config.database.acquire_timeout_secs),
    )
    .await?;
    database::run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool);

    let app_state = Arc::new(AppState { db_repo });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        // Disciplinas
        .route("/disciplinas", get(handlers::listar_disciplinas))
        .route(
            "/disciplina-por-id/:disciplina_id",
            get(handlers::consultar_disciplina_por_id),
        )
        .route(
            "/disciplina-por-semestre/:semestre",
            get(handlers::consultar_disciplinas_por_semestre),
        )
        .route("/inserir-disciplina/", post(handlers::inserir_disciplina))
        .route(
            "/atualizar-disciplina/:disciplina_id",
            put(handlers::atualizar_disciplina),
        )
        .route(
            "/deletar-disciplina/:disciplina_id",
            delete(handlers::deletar_disciplina),
        )
        // Enderecos
        .route(
            "/enderecos-por-id/:endereco_id",
            get(handlers::consultar_endereco_por_id),
        )
        .route(
            "/enderecos-por-estado/:estado",
            get(handlers::consultar_enderecos_por_estado),
        )
        .route("/inserir-endereco/", post(handlers::inserir_endereco))
        .route(
            "/atualizar-enderecos/:endereco_id",
            put(handlers::atualizar_endereco),
        )
        // Alunos
        .route("/consultar-alunos", get(handlers::consultar_alunos))
        .route("/aluno-por-id/:aluno_id", get(handlers::consultar_aluno_por_id))
        .route(
            "/alunos-por-nome/:nome",
            get(handlers::consultar_alunos_por_nome),
        )
        .route("/inserir-aluno/", post(handlers::inserir_aluno))
        .route("/atualizar-aluno/:aluno_id", put(handlers::atualizar_aluno))
        .route("/deletar-alunos/:aluno_id", delete(handlers::deletar_aluno))
        .route(
            "/aluno-detalhe-por-nome/:nome",
            get(handlers::detalhar_alunos_por_nome),
        )
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

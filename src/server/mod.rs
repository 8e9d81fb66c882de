//! HTTP boundary exposing the operations under `/api`

use actix_cors::Cors;
use actix_web::{
    dev::Server, error, get, http::StatusCode, post, web, App, HttpResponse, HttpServer,
    ResponseError,
};
use tracing::info;

use crate::api::{self, CsvToSqlRequest, ErrorBody, HandleNullsRequest, SqlSplitRequest};
use crate::config::Config;
use crate::error::TransformError;

impl ResponseError for TransformError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.outcome().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}

type HandlerResult = Result<HttpResponse, TransformError>;

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[post("/process-csv")]
async fn process_csv(config: web::Data<Config>, body: web::Bytes) -> HandlerResult {
    let response = api::inspect(&body, &config)?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/normalize-csv")]
async fn normalize_csv(config: web::Data<Config>, body: web::Bytes) -> HandlerResult {
    let response = api::normalize_csv(&body, &config)?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/handle-nulls")]
async fn handle_nulls(
    config: web::Data<Config>,
    req: web::Json<HandleNullsRequest>,
) -> HandlerResult {
    let response = api::process_nulls(&req, &config)?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/determine-datatypes")]
async fn determine_datatypes(config: web::Data<Config>, body: web::Bytes) -> HandlerResult {
    let response = api::determine_types(&body, &config)?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/csv-to-sql")]
async fn csv_to_sql(config: web::Data<Config>, req: web::Json<CsvToSqlRequest>) -> HandlerResult {
    let response = api::csv_to_sql(&req, &config)?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/sql-splitter")]
async fn sql_splitter(
    config: web::Data<Config>,
    req: web::Json<SqlSplitRequest>,
) -> HandlerResult {
    let response = api::sql_splitter(&req, &config)?;
    Ok(HttpResponse::Ok().json(response))
}

/// JSON body limits, with malformed bodies reported as `{"error": ...}` 400s
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let message = format!("Invalid request format: {}", err);
            let response = HttpResponse::BadRequest().json(ErrorBody::new(message));
            error::InternalError::from_response(err, response).into()
        })
}

/// Register the `/api` routes
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health)
            .service(process_csv)
            .service(normalize_csv)
            .service(handle_nulls)
            .service(determine_datatypes)
            .service(csv_to_sql)
            .service(sql_splitter),
    );
}

/// Bind the HTTP server; the returned future runs until shutdown
pub fn start_server(config: Config) -> std::io::Result<Server> {
    let addr = (config.host.clone(), config.port);
    let limit = config.max_upload_bytes;
    let state = web::Data::new(config);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(limit))
            .app_data(json_config(limit))
            .configure(routes)
    })
    .bind(addr.clone())?
    .run();

    info!(host = %addr.0, port = addr.1, "HTTP server listening");
    Ok(server)
}

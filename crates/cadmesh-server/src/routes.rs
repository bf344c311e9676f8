// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP routes
//!
//! - `GET /` service information
//! - `GET /health` liveness check
//! - `POST /convert` multipart upload (field `file`) converted to meshes

use crate::config::ServerConfig;
use crate::error::ApiError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use cadmesh_converter::{
    extension_of, CadFormat, ConversionMetadata, Converter, MeshData, SUPPORTED_EXTENSIONS,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Name used when the upload carries no file name
const DEFAULT_FILE_NAME: &str = "unknown.step";

/// Room left for multipart boundaries and headers above the upload limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    converter: Converter,
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(converter: Converter, config: ServerConfig) -> Self {
        Self {
            converter,
            config: Arc::new(config),
        }
    }
}

#[derive(Serialize)]
struct ServiceInfo {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    supported_formats: &'static [&'static str],
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

/// Successful conversion body
#[derive(Serialize)]
struct ConvertResponse {
    success: bool,
    meshes: Vec<MeshData>,
    metadata: ConversionMetadata,
    error: Option<String>,
}

/// Build the router over an existing state
pub fn router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/convert", post(convert))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Build the router with the built-in kernel
pub fn app(config: ServerConfig) -> Router {
    let converter = Converter::builtin(config.converter_options());
    log::info!(
        "Kernel: {}, deflection {} / {}, grouping {:?}",
        converter.kernel_name(),
        config.params.linear_deflection,
        config.params.angular_deflection,
        config.grouping
    );
    router(AppState::new(converter, config))
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "ok",
        service: "CAD Conversion API",
        version: env!("CARGO_PKG_VERSION"),
        supported_formats: &SUPPORTED_EXTENSIONS,
    })
}

async fn health() -> Json<Health> {
    Json(Health { status: "healthy" })
}

async fn convert(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let max_mb = state.config.max_upload_mb();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::multipart(e, max_mb))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();

        let extension = extension_of(&file_name);
        if CadFormat::from_extension(&extension).is_none() {
            return Err(ApiError::unsupported(&extension));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::multipart(e, max_mb))?;
        upload = Some((file_name, bytes));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Err(ApiError::bad_request("Missing multipart field 'file'"));
    };
    if bytes.len() > state.config.max_upload_bytes {
        return Err(ApiError::too_large(max_mb));
    }
    if bytes.is_empty() {
        return Err(ApiError::bad_request("Empty file received"));
    }

    log::info!("Converting {} ({} bytes)", file_name, bytes.len());

    let converter = state.converter.clone();
    let task = tokio::task::spawn_blocking(move || converter.convert(&bytes, &file_name));

    let conversion = match tokio::time::timeout(state.config.timeout, task).await {
        Err(_) => return Err(ApiError::timeout(state.config.timeout)),
        Ok(Err(join)) => return Err(ApiError::internal(format!("Conversion failed: {}", join))),
        Ok(Ok(result)) => result?,
    };

    Ok(Json(ConvertResponse {
        success: true,
        meshes: conversion.meshes,
        metadata: conversion.metadata,
        error: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use cadmesh_converter::ConverterOptions;
    use cadmesh_model::{BrepShape, CadKernel, Face, MeshParams, ReadStatus, ShapeReader};
    use serde_json::Value;
    use std::path::Path;
    use std::time::Duration;
    use tower::ServiceExt;

    const BOUNDARY: &str = "cadmesh-test-boundary";

    const TRIANGLE_STEP: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION((''),'2;1');
FILE_NAME('tri.step','',(''),(''),'','','');
FILE_SCHEMA(('CONFIG_CONTROL_DESIGN'));
ENDSEC;
DATA;
#1=CARTESIAN_POINT('',(0.,0.,0.));
#2=CARTESIAN_POINT('',(2.,0.,0.));
#3=CARTESIAN_POINT('',(0.,2.,0.));
#4=POLY_LOOP('',(#1,#2,#3));
#5=FACE_OUTER_BOUND('',#4,.T.);
#6=DIRECTION('',(0.,0.,1.));
#7=DIRECTION('',(1.,0.,0.));
#8=AXIS2_PLACEMENT_3D('',#1,#6,#7);
#9=PLANE('',#8);
#10=ADVANCED_FACE('',(#5),#9,.T.);
#11=OPEN_SHELL('',(#10));
#12=SHELL_BASED_SURFACE_MODEL('',(#11));
ENDSEC;
END-ISO-10303-21;
";

    /// Kernel whose reader blocks longer than any test timeout
    struct SlowKernel;
    struct SlowReader;
    struct EmptyShape;

    impl CadKernel for SlowKernel {
        fn name(&self) -> &str {
            "slow"
        }

        fn reader(&self, _format: CadFormat) -> Box<dyn ShapeReader> {
            Box::new(SlowReader)
        }
    }

    impl ShapeReader for SlowReader {
        fn format(&self) -> CadFormat {
            CadFormat::Step
        }

        fn read_file(&mut self, _path: &Path) -> ReadStatus {
            std::thread::sleep(Duration::from_millis(500));
            ReadStatus::Done
        }

        fn transfer_roots(&mut self) -> usize {
            0
        }

        fn one_shape(&mut self) -> Box<dyn BrepShape> {
            Box::new(EmptyShape)
        }
    }

    impl BrepShape for EmptyShape {
        fn tessellate(&mut self, _params: &MeshParams) -> bool {
            true
        }

        fn faces(&self) -> Vec<Face> {
            Vec::new()
        }
    }

    fn multipart_body(disposition: &str, content: &[u8]) -> Body {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; {}\r\n", disposition).as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        Body::from(body)
    }

    fn upload(file_name: &str, content: &[u8]) -> Request<Body> {
        let disposition = format!("name=\"file\"; filename=\"{}\"", file_name);
        upload_with(&disposition, content)
    }

    fn upload_with(disposition: &str, content: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(multipart_body(disposition, content))
            .unwrap()
    }

    async fn json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn assert_error(response: Response, status: StatusCode) -> Value {
        assert_eq!(response.status(), status);
        let body = json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], body["detail"]);
        body
    }

    #[tokio::test]
    async fn test_root_reports_service() {
        let response = app(ServerConfig::default())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "CAD Conversion API");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(
            body["supported_formats"],
            serde_json::json!([".step", ".stp", ".iges", ".igs"])
        );
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(ServerConfig::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await, serde_json::json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_convert_step_upload() {
        let response = app(ServerConfig::default())
            .oneshot(upload("tri.STEP", TRIANGLE_STEP.as_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["error"].is_null());
        assert_eq!(body["meshes"].as_array().unwrap().len(), 1);
        assert_eq!(body["meshes"][0]["name"], "Model");
        assert_eq!(body["metadata"]["partCount"], 1);
        assert_eq!(body["metadata"]["vertexCount"], 3);
        assert_eq!(body["metadata"]["faceCount"], 1);
    }

    #[tokio::test]
    async fn test_unsupported_extension_rejected() {
        let response = app(ServerConfig::default())
            .oneshot(upload("model.obj", b"v 0 0 0"))
            .await
            .unwrap();
        let body = assert_error(response, StatusCode::BAD_REQUEST).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Unsupported file format: .obj"));
    }

    #[tokio::test]
    async fn test_missing_file_name_defaults_to_step() {
        let response = app(ServerConfig::default())
            .oneshot(upload_with("name=\"file\"", b"definitely not STEP"))
            .await
            .unwrap();
        let body = assert_error(response, StatusCode::UNPROCESSABLE_ENTITY).await;
        assert!(body["detail"].as_str().unwrap().contains("STEP"));
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let response = app(ServerConfig::default())
            .oneshot(upload("empty.step", b""))
            .await
            .unwrap();
        let body = assert_error(response, StatusCode::BAD_REQUEST).await;
        assert_eq!(body["detail"], "Empty file received");
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let config = ServerConfig {
            max_upload_bytes: 16,
            ..ServerConfig::default()
        };
        let response = app(config)
            .oneshot(upload("big.step", TRIANGLE_STEP.as_bytes()))
            .await
            .unwrap();
        let body = assert_error(response, StatusCode::PAYLOAD_TOO_LARGE).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("File too large"));
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let response = app(ServerConfig::default())
            .oneshot(upload_with("name=\"attachment\"; filename=\"a.step\"", b"x"))
            .await
            .unwrap();
        assert_error(response, StatusCode::BAD_REQUEST).await;
    }

    #[tokio::test]
    async fn test_slow_conversion_times_out() {
        let config = ServerConfig {
            timeout: Duration::from_millis(50),
            ..ServerConfig::default()
        };
        let converter = Converter::new(Arc::new(SlowKernel), ConverterOptions::default());
        let response = router(AppState::new(converter, config))
            .oneshot(upload("slow.step", b"ISO-10303-21;"))
            .await
            .unwrap();
        assert_error(response, StatusCode::GATEWAY_TIMEOUT).await;
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let request = Request::get("/health")
            .header(header::ORIGIN, "https://viewer.example")
            .body(Body::empty())
            .unwrap();
        let response = app(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use loopgen::Vec2;
use loopgen::config::Params;
use loopgen::render;

const SCALE: usize = 16;
/// Largest grid side the server will generate.
const MAX_SIZE: usize = 256;

#[derive(Deserialize)]
struct GenerateRequest {
    seed: Option<u64>,
    size: Option<usize>,
    padding: Option<usize>,
    center_fill_p: Option<f64>,
    rim_fill_p: Option<f64>,
    max_attempts: Option<usize>,
}

#[derive(Serialize)]
struct GenerateResponse {
    layers: Vec<Layer>,
    path: Vec<Vec2>,
    loop_start: Vec2,
    size: usize,
    seed: u64,
    ms: f64,
}

#[derive(Serialize)]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

async fn generate_handler(
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let seed = req.seed.unwrap_or_else(rand::random);
    let size = req.size.unwrap_or(13);
    if size > MAX_SIZE {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("size {size} exceeds the limit of {MAX_SIZE}"),
        ));
    }

    let defaults = Params::default();
    let params = Params {
        padding: req.padding.unwrap_or(defaults.padding),
        center_fill_p: req.center_fill_p.unwrap_or(defaults.center_fill_p),
        rim_fill_p: req.rim_fill_p.unwrap_or(defaults.rim_fill_p),
        max_attempts: req.max_attempts.unwrap_or(defaults.max_attempts),
        ..defaults
    };

    tokio::task::spawn_blocking(move || -> Result<Json<GenerateResponse>, ApiError> {
        let t = std::time::Instant::now();
        let result = loopgen::generate(seed, size, &params)
            .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;
        let ms = t.elapsed().as_secs_f64() * 1000.0;

        let px = size * SCALE;
        let png = |rgba: Vec<u8>| {
            encode_png(&rgba, px, px).map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
        };
        let layers = vec![
            Layer {
                name: "tiles".into(),
                data_url: png(render::render_tiles(&result.tiles, SCALE))?,
            },
            Layer {
                name: "path".into(),
                data_url: png(render::render_path(&result.tiles, &result.path, SCALE))?,
            },
        ];

        Ok(Json(GenerateResponse {
            layers,
            path: result.path,
            loop_start: result.loop_start,
            size,
            seed,
            ms,
        }))
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?
}

#[tokio::main]
async fn main() {
    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .fallback_service(frontend)
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    eprintln!("loopgen server at http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind {}: {e}", addr);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}

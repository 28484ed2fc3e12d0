use std::path::PathBuf;

use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::errors::ApiError;
use super::multipart::UploadForm;
use super::response::{
    BatchResponse, ClassList, ClassesResponse, CombinedResponse, HealthResponse, LoadModelResponse,
    RootResponse, SingleAxisResponse,
};
use super::AppState;
use crate::axis::{Axis, AxisSelection, DAMAGE_CLASSES, DISASTER_CLASSES};
use crate::batch::BatchRequest;
use crate::errors::ClassifierError;

/// Runs CPU-bound work off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ClassifierError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?
        .map_err(ApiError::from)
}

/// GET /
pub async fn root_handler(State(state): State<AppState>) -> Json<RootResponse> {
    let registry = state.classifier.registry();
    Json(RootResponse {
        message: "Disaster Detection API is running",
        disaster_model_loaded: registry.is_loaded(Axis::Disaster),
        damage_model_loaded: registry.is_loaded(Axis::Damage),
        disaster_classes: &DISASTER_CLASSES,
        damage_classes: &DAMAGE_CLASSES,
    })
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.classifier.registry();
    let disaster = registry.status(Axis::Disaster);
    let damage = registry.status(Axis::Damage);
    let device = state.config.device_label();

    Json(HealthResponse {
        status: "healthy",
        disaster_model_loaded: disaster.loaded,
        damage_model_loaded: damage.loaded,
        disaster_model_input_size: disaster.resolution.map(|r| r.as_array()),
        damage_model_input_size: damage.resolution.map(|r| r.as_array()),
        supported_disaster_classes: &DISASTER_CLASSES,
        supported_damage_classes: &DAMAGE_CLASSES,
        damage_device: device.clone(),
        device,
    })
}

/// GET /classes
pub async fn classes_handler() -> Json<ClassesResponse> {
    Json(ClassesResponse {
        disaster: ClassList::for_axis(Axis::Disaster),
        damage: ClassList::for_axis(Axis::Damage),
    })
}

#[derive(Debug, Deserialize)]
pub struct LoadModelParams {
    pub axis: Option<String>,
    pub model_path: Option<PathBuf>,
}

/// POST /load-model?axis=<disaster|damage>&model_path=<path>
///
/// Loads or replaces one axis's model. Without `axis` the disaster model is loaded;
/// without `model_path` the configured path for the axis is used.
pub async fn load_model_handler(
    State(state): State<AppState>,
    Query(params): Query<LoadModelParams>,
) -> Result<Json<LoadModelResponse>, ApiError> {
    let axis = match params.axis.as_deref() {
        Some(value) => value.parse::<Axis>()?,
        None => Axis::Disaster,
    };
    let model_path = params
        .model_path
        .unwrap_or_else(|| state.config.model_path(axis).clone());

    info!(%axis, path = %model_path.display(), "load-model requested");
    let classifier = state.classifier.clone();
    let resolution = run_blocking(move || classifier.registry().load(axis, &model_path)).await?;

    Ok(Json(LoadModelResponse {
        message: format!("{axis} model loaded successfully"),
        axis,
        model_input_size: match axis {
            Axis::Disaster => Some(resolution.as_array()),
            Axis::Damage => None,
        },
    }))
}

async fn predict_single(
    state: AppState,
    axis: Axis,
    multipart: Multipart,
) -> Result<Json<SingleAxisResponse>, ApiError> {
    let upload = UploadForm::read(multipart).await?.into_single()?;
    upload.ensure_image()?;

    let classifier = state.classifier.clone();
    let filename = upload.filename.clone();
    let prediction = run_blocking(move || classifier.predict_upload(axis, &upload)).await?;

    Ok(Json(SingleAxisResponse::new(axis, filename, prediction)))
}

/// POST /predict-disaster (and the legacy POST /predict)
pub async fn predict_disaster_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SingleAxisResponse>, ApiError> {
    predict_single(state, Axis::Disaster, multipart).await
}

/// POST /predict-damage
pub async fn predict_damage_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SingleAxisResponse>, ApiError> {
    predict_single(state, Axis::Damage, multipart).await
}

/// POST /predict-both
pub async fn predict_both_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CombinedResponse>, ApiError> {
    let upload = UploadForm::read(multipart).await?.into_single()?;
    upload.ensure_image()?;

    let classifier = state.classifier.clone();
    let filename = upload.filename.clone();
    let results = run_blocking(move || classifier.predict_combined(&upload)).await?;

    Ok(Json(CombinedResponse::new(filename, results)))
}

/// POST /predict-batch
///
/// Up to ten `files` parts plus an optional `prediction_type` (`disaster`, `damage`, `both`).
pub async fn predict_batch_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let mode = form
        .prediction_type
        .unwrap_or_else(|| AxisSelection::default().name().to_string());
    let request = BatchRequest::parse(form.files, &mode)?;
    let selection = request.selection();

    let classifier = state.classifier.clone();
    let results = run_blocking(move || Ok(classifier.classify_batch(&request))).await?;

    Ok(Json(BatchResponse {
        success: true,
        prediction_type: selection,
        results,
    }))
}

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Classification outcome used to style a rendered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The label indicates fire.
    Fire,
    /// Any other label.
    Other,
}

impl Outcome {
    /// A label styles as fire exactly when it contains the substring `"Fire"`.
    pub fn from_label(label: &str) -> Self {
        if label.contains("Fire") {
            Self::Fire
        } else {
            Self::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Other => "other",
        }
    }
}

/// The image currently chosen by the user, awaiting submission.
///
/// Replaced wholesale on every new selection; never cleared automatically,
/// so resubmitting the same image is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedImage {
    /// Read an image from disk, deriving filename and MIME type from the path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("path has no file name: {}", path.display()))?;
        let bytes =
            fs::read(path).with_context(|| format!("cannot read image: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            mime: mime_for_path(path).to_string(),
            file_name,
            bytes,
        })
    }

    /// Build a selection from an in-memory payload (drops that carry bytes
    /// instead of a path). An empty MIME type is guessed from the filename.
    pub fn from_parts(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mut mime = mime.into();
        if mime.is_empty() {
            mime = mime_for_path(Path::new(&file_name)).to_string();
        }
        Self {
            path: PathBuf::from(&file_name),
            file_name,
            mime,
            bytes,
        }
    }
}

/// Whether a dropped payload should be accepted as an image.
///
/// A declared MIME type wins; without one (native drops carry only a path)
/// the filename extension decides.
pub fn is_image_payload(mime: &str, path: Option<&Path>) -> bool {
    if !mime.is_empty() {
        return mime.starts_with("image/");
    }
    path.is_some_and(is_supported_image)
}

/// MIME type for a path, by extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            matches!(
                ext.as_str(),
                "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp"
            )
        }
        None => false,
    }
}

/// Wire shape of a `/predict` response.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    success: bool,
    label: Option<String>,
    score: Option<f64>,
    image: Option<String>,
    error: Option<String>,
}

/// Parsed outcome of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// The server classified the image.
    Detected {
        label: String,
        score: Option<f64>,
        /// Server-side path of the stored upload, used for the analysis link.
        image: Option<String>,
    },
    /// The server refused the submission (`success: false`).
    Rejected { message: String },
}

/// Errors that end a submission before a prediction is obtained.
///
/// A `Rejected` prediction is not an error: the server answered, it just
/// said no.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Parse a `/predict` response body.
pub fn parse_prediction(body: &str) -> Result<Prediction, PredictError> {
    let resp: PredictResponse = serde_json::from_str(body)?;
    if resp.success {
        Ok(Prediction::Detected {
            label: resp.label.unwrap_or_default(),
            score: resp.score,
            image: resp.image,
        })
    } else {
        Ok(Prediction::Rejected {
            message: resp.error.unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

/// Blocking client for the predict endpoint.
#[derive(Debug, Clone)]
pub struct PredictClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl PredictClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::blocking::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit an image as a single-part multipart POST and parse the reply.
    ///
    /// One request per call: no retries, no client-side timeout beyond
    /// transport defaults, no cancellation.
    pub fn predict(&self, image: &SelectedImage) -> Result<Prediction, PredictError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)?;
        let form = Form::new().part("file", part);
        let url = format!("{}/predict", self.base_url);
        tracing::debug!(%url, file = %image.file_name, size = image.bytes.len(), "submitting image");
        // 4xx/5xx replies still carry a JSON body; parse regardless of status.
        let body = self.http.post(&url).multipart(form).send()?.text()?;
        tracing::debug!(len = body.len(), "predict response received");
        parse_prediction(&body)
    }
}

/// Final path segment of a server-side image path, split on `/` and `\`.
pub fn analysis_filename(image_path: &str) -> &str {
    image_path.rsplit(['/', '\\']).next().unwrap_or(image_path)
}

/// Relative link to the server's analysis page for an uploaded image.
pub fn analysis_link(image_path: &str) -> String {
    format!("/analysis/{}", urlencoding::encode(analysis_filename(image_path)))
}

/// Model score formatted for display.
pub fn format_score(score: f64) -> String {
    format!("{score:.3}")
}

/// Fire probability in percent, rounded to two decimals.
///
/// The model emits a sigmoid where low scores mean fire, so the probability
/// is the score's complement.
pub fn fire_probability(score: f64) -> f64 {
    ((1.0 - score) * 100.0 * 100.0).round() / 100.0
}

/// One completed submission, kept for the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub file: String,
    pub label: String,
    pub score: Option<f64>,
    pub outcome: Outcome,
    /// Local wall-clock time, preformatted by the caller.
    pub time: String,
}

/// Export the provided rows to CSV with headers:
/// file,label,score,outcome,time
pub fn export_csv(rows: &[PredictionRecord], path: impl AsRef<Path>) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["file", "label", "score", "outcome", "time"])?;

    for rec in rows {
        let score_field = rec.score.map(|s| format!("{s}")).unwrap_or_default();
        wtr.write_record([
            rec.file.as_str(),
            rec.label.as_str(),
            score_field.as_str(),
            rec.outcome.as_str(),
            rec.time.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

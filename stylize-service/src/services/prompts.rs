//! Style table and translation of a generate request into a provider task.

use crate::dtos::{present, GenerateRequest};
use crate::models::{JobKind, Transformation, TransformationStatus, UserAccount};
use crate::services::providers::{CreateTaskRequest, TaskInput};
use service_core::error::AppError;

/// Style used when the requested one is unknown.
pub const FALLBACK_STYLE: &str = "pixar";

/// `style` value that selects image-to-video generation.
pub const VIDEO_STYLE: &str = "video";

const DEFAULT_SUBJECT: &str = "a portrait of a person";
const DEFAULT_IMAGE_SIZE: &str = "1:1";
const DEFAULT_VIDEO_PROMPT: &str =
    "A cinematic video transformation of this image with smooth camera movement";
const DEFAULT_VIDEO_DURATION: &str = "5";
const DEFAULT_VIDEO_RESOLUTION: &str = "1080p";
const OUTPUT_FORMAT: &str = "png";
const PRO_RESOLUTION: &str = "1K";

pub const MODEL_GENERATE: &str = "google/nano-banana";
pub const MODEL_EDIT: &str = "google/nano-banana-edit";
pub const MODEL_PRO: &str = "nano-banana-pro";
pub const MODEL_VIDEO: &str = "wan/2-5-image-to-video";
pub const MODEL_VIDEO_PRO: &str = "wan/2-6-image-to-video";

const STYLE_PROMPTS: &[(&str, &str)] = &[
    (
        "neutral",
        "high quality professional photography, preserve all facial features and details, maintain original composition and style, realistic rendering, natural lighting",
    ),
    (
        "pixar",
        "turn this character into Pixar 3D animation style, preserve facial features and identity, smooth CGI rendering, expressive eyes, vibrant colors, Disney-Pixar quality, professional character design, maintain pose and composition",
    ),
    (
        "manga",
        "transform this character into Japanese manga style, preserve facial features and expression, black and white ink art, dynamic screentone shading, bold linework, expressive manga eyes, detailed hair strands, professional manga artist quality",
    ),
    (
        "anime",
        "convert this character into anime style, keep facial structure and identity, vibrant cel-shaded colors, detailed anime shading, beautiful character design, sharp linework, expressive anime eyes, studio-quality animation style",
    ),
    (
        "cartoon",
        "turn this character into modern cartoon style, preserve character likeness, bold clean outlines, flat vibrant colors, simplified features, playful expression, professional cartoon illustration",
    ),
    (
        "watercolor",
        "transform this portrait into watercolor painting, maintain facial features and expression, soft watercolor brushstrokes, flowing colors, artistic paper texture, dreamy atmospheric painting, traditional art style",
    ),
    (
        "oilpainting",
        "convert this portrait into classical oil painting, preserve facial structure and likeness, rich oil paint textures, masterful brushwork, renaissance painting technique, museum-quality portrait art, deep colors and lighting",
    ),
    (
        "sketch",
        "turn this portrait into detailed pencil sketch, keep facial features accurate, professional sketching technique, varied pencil strokes, artistic shading and hatching, hand-drawn illustration quality, graphite on paper look",
    ),
    (
        "comic",
        "transform this character into American comic book style, preserve character identity, bold ink outlines, vibrant comic colors, dramatic cel shading, superhero comic aesthetic, professional comic art quality",
    ),
    (
        "fantasy",
        "convert this character into fantasy art style, maintain facial features, magical ethereal atmosphere, epic fantasy painting, dramatic lighting, mystical elements, professional fantasy illustration, rich detailed rendering",
    ),
    (
        "cyberpunk",
        "turn this character into cyberpunk style, keep character likeness, neon lighting effects, futuristic tech elements, cyberpunk aesthetic, dramatic sci-fi atmosphere, high-tech urban background, professional digital art",
    ),
    (
        "retro",
        "transform this character into retro 80s style, preserve facial features, vibrant neon colors, synthwave aesthetic, vintage 80s vibe, nostalgic retro art style, bold graphic design, professional retro illustration",
    ),
];

/// Master prompt for `style`; unknown styles get the [`FALLBACK_STYLE`] prompt.
pub fn style_prompt(style: &str) -> &'static str {
    lookup(style)
        .or_else(|| lookup(FALLBACK_STYLE))
        .unwrap_or_default()
}

fn lookup(style: &str) -> Option<&'static str> {
    STYLE_PROMPTS
        .iter()
        .find(|(name, _)| *name == style)
        .map(|(_, prompt)| *prompt)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Text-to-image.
    Generate,
    /// Image-to-image on the supplied references.
    Edit,
    /// Premium model.
    Pro,
    /// Any other requested mode: directive prompt on the edit model, without image references.
    Other,
}

impl GenerationMode {
    fn resolve(mode: Option<&str>, has_images: bool) -> Self {
        match mode {
            Some("generate") => GenerationMode::Generate,
            Some("edit") => GenerationMode::Edit,
            Some("pro") => GenerationMode::Pro,
            Some(other) => {
                tracing::debug!(mode = %other, "Unrecognised generation mode");
                GenerationMode::Other
            }
            None if has_images => GenerationMode::Edit,
            None => GenerationMode::Generate,
        }
    }
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Generate => write!(f, "generate"),
            GenerationMode::Edit => write!(f, "edit"),
            GenerationMode::Pro => write!(f, "pro"),
            GenerationMode::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageJob {
    pub style: String,
    pub mode: GenerationMode,
    pub pro: bool,
    pub prompt: String,
    pub image_size: String,
    pub image_urls: Vec<String>,
    /// `imageUrl` as sent, kept on the transformation record.
    pub original_image_url: Option<String>,
}

impl ImageJob {
    pub fn model(&self) -> &'static str {
        if self.pro {
            MODEL_PRO
        } else if self.mode == GenerationMode::Generate {
            MODEL_GENERATE
        } else {
            MODEL_EDIT
        }
    }

    pub fn input(&self) -> TaskInput {
        if self.pro {
            TaskInput::Pro {
                prompt: self.prompt.clone(),
                aspect_ratio: self.image_size.clone(),
                resolution: PRO_RESOLUTION.to_string(),
                output_format: OUTPUT_FORMAT.to_string(),
            }
        } else if self.mode == GenerationMode::Edit {
            TaskInput::Edit {
                prompt: self.prompt.clone(),
                image_urls: self.image_urls.clone(),
                output_format: OUTPUT_FORMAT.to_string(),
                image_size: self.image_size.clone(),
            }
        } else {
            TaskInput::Generate {
                prompt: self.prompt.clone(),
                output_format: OUTPUT_FORMAT.to_string(),
                image_size: self.image_size.clone(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoJob {
    pub pro: bool,
    pub prompt: String,
    pub image_url: String,
    pub duration: String,
    pub resolution: String,
}

impl VideoJob {
    pub fn model(&self) -> &'static str {
        if self.pro {
            MODEL_VIDEO_PRO
        } else {
            MODEL_VIDEO
        }
    }

    pub fn input(&self) -> TaskInput {
        TaskInput::Video {
            prompt: self.prompt.clone(),
            image_url: self.image_url.clone(),
            duration: self.duration.clone(),
            resolution: self.resolution.clone(),
            // Only the standard video model expands prompts.
            enable_prompt_expansion: (!self.pro).then_some(true),
        }
    }
}

/// A validated generation request, ready to submit.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Image(ImageJob),
    Video(VideoJob),
}

impl Job {
    pub fn plan(style: &str, request: &GenerateRequest) -> Result<Self, AppError> {
        if style == VIDEO_STYLE {
            plan_video(request).map(Job::Video)
        } else {
            plan_image(style, request).map(Job::Image)
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            Job::Image(_) => JobKind::Image,
            Job::Video(_) => JobKind::Video,
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Job::Image(job) => job.model(),
            Job::Video(job) => job.model(),
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Job::Image(job) => &job.prompt,
            Job::Video(job) => &job.prompt,
        }
    }

    pub fn submission(&self, callback_url: String) -> CreateTaskRequest {
        let input = match self {
            Job::Image(job) => job.input(),
            Job::Video(job) => job.input(),
        };

        CreateTaskRequest {
            model: self.model().to_string(),
            callback_url,
            input,
        }
    }

    /// The `pending` record written once the provider accepted the task.
    pub fn pending_record(&self, user: &UserAccount, task_id: &str) -> Transformation {
        let (style, original_image_url, duration, resolution) = match self {
            Job::Image(job) => (
                Some(job.style.clone()),
                job.original_image_url.clone(),
                None,
                None,
            ),
            Job::Video(job) => (
                None,
                Some(job.image_url.clone()),
                Some(job.duration.clone()),
                Some(job.resolution.clone()),
            ),
        };

        Transformation {
            id: task_id.to_string(),
            user_id: user.user_id.clone(),
            task_id: task_id.to_string(),
            kind: self.kind(),
            style,
            prompt: self.prompt().to_string(),
            original_image_url,
            duration,
            resolution,
            status: TransformationStatus::Pending,
            subscription_type_at_creation: user.subscription_type.as_ref().map(|s| s.to_string()),
            result_urls: Vec::new(),
            error_message: None,
            created_at: None,
            completed_at: None,
        }
    }
}

fn plan_image(style: &str, request: &GenerateRequest) -> Result<ImageJob, AppError> {
    let image_urls = request.image_references();
    let mode = GenerationMode::resolve(present(&request.mode), !image_urls.is_empty());
    let pro = request.is_pro == Some(true) || mode == GenerationMode::Pro;

    if mode == GenerationMode::Edit && image_urls.is_empty() {
        return Err(AppError::BadRequest(
            "imageUrl or imageUrls required for edit mode".to_string(),
        ));
    }

    let master = style_prompt(style);
    let custom = present(&request.custom_prompt);
    let prompt = match (mode, custom) {
        (GenerationMode::Generate, subject) => {
            format!("create {}, {}", subject.unwrap_or(DEFAULT_SUBJECT), master)
        }
        // The master prompt already reads "turn this character into ..."
        (_, Some(directive)) => format!("{}, {}", master, directive),
        (_, None) => master.to_string(),
    };

    Ok(ImageJob {
        style: style.to_string(),
        mode,
        pro,
        prompt,
        image_size: present(&request.image_size)
            .unwrap_or(DEFAULT_IMAGE_SIZE)
            .to_string(),
        image_urls,
        original_image_url: present(&request.image_url).map(str::to_string),
    })
}

fn plan_video(request: &GenerateRequest) -> Result<VideoJob, AppError> {
    let image_url = request.primary_image().ok_or_else(|| {
        AppError::BadRequest("imageUrl or imageUrls required for video generation".to_string())
    })?;

    Ok(VideoJob {
        pro: request.is_pro == Some(true),
        prompt: present(&request.custom_prompt)
            .unwrap_or(DEFAULT_VIDEO_PROMPT)
            .to_string(),
        image_url,
        duration: present(&request.duration)
            .unwrap_or(DEFAULT_VIDEO_DURATION)
            .to_string(),
        resolution: present(&request.resolution)
            .unwrap_or(DEFAULT_VIDEO_RESOLUTION)
            .to_string(),
    })
}

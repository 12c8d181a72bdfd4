use std::fmt;

use image::DynamicImage;
use secrecy::SecretString;

use crate::classify::GenerationError;

/// Output sizes accepted by the `OpenAI` Images API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenAiSize {
    /// 1024x1024
    #[default]
    Square,
    /// 1024x1536
    Portrait,
    /// 1536x1024
    Landscape,
    /// Let the API choose
    Auto,
}

impl OpenAiSize {
    /// Every accepted size, in display order
    pub const ALL: [Self; 4] = [Self::Square, Self::Portrait, Self::Landscape, Self::Auto];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1024x1024",
            Self::Portrait => "1024x1536",
            Self::Landscape => "1536x1024",
            Self::Auto => "auto",
        }
    }

    /// Exact match against the accepted size strings
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.as_str() == value)
    }
}

impl fmt::Display for OpenAiSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Parse `WxH` text into two positive integers
    pub fn parse(value: &str) -> Option<Self> {
        let (width, height) = value.trim().split_once(['x', 'X'])?;
        let width = width.trim().parse::<u32>().ok().filter(|w| *w > 0)?;
        let height = height.trim().parse::<u32>().ok().filter(|h| *h > 0)?;

        Some(Self { width, height })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Requested output size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// One of the enumerated `OpenAI` sizes
    OpenAi(OpenAiSize),
    /// Free-form width and height
    Custom(Dimensions),
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi(size) => size.fmt(f),
            Self::Custom(dims) => dims.fmt(f),
        }
    }
}

/// Diffusion tuning knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningParams {
    /// Number of denoising steps
    pub steps: u32,
    /// Classifier-free guidance scale
    pub guidance_scale: f32,
}

/// A validated generation request
///
/// Built once per user action by [`crate::RequestBuilder`] and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub(crate) prompt: String,
    pub(crate) size: ImageSize,
    pub(crate) count: u32,
    pub(crate) model: String,
    pub(crate) tuning: Option<TuningParams>,
}

impl GenerationRequest {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub const fn size(&self) -> ImageSize {
        self.size
    }

    /// Number of images in the batch
    pub const fn count(&self) -> u32 {
        self.count
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub const fn tuning(&self) -> Option<TuningParams> {
        self.tuning
    }

    /// Caption shown next to each image
    pub fn size_label(&self) -> String {
        self.size.to_string()
    }
}

/// Credentials for one generation action
#[derive(Debug)]
pub struct Credentials {
    /// API key or bearer token
    pub api_key: SecretString,
    /// `OpenAI` organization id
    pub organization_id: Option<String>,
}

/// Raw image data returned by a vendor for one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Base64-encoded image file
    Base64(String),
    /// Image file bytes
    Bytes(Vec<u8>),
}

/// One successfully generated image
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Decoded bitmap for display
    pub image: DynamicImage,
    /// Encoded PNG bytes offered for download
    pub raw_bytes: Vec<u8>,
    /// Caption, the requested size
    pub size_label: String,
}

impl GenerationResult {
    /// Download file name for the given 1-based slot
    pub fn file_name(index: u32) -> String {
        format!("image_{index}.png")
    }
}

/// Outcome of one slot in a batch
#[derive(Debug)]
pub struct SlotOutcome {
    /// 1-based slot index
    pub index: u32,
    pub result: std::result::Result<GenerationResult, GenerationError>,
}

/// Everything produced by one generation action
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Non-fatal adjustments made while building the request
    pub warnings: Vec<String>,
    /// Slots in the order they were attempted
    pub slots: Vec<SlotOutcome>,
    /// Number of images the request asked for
    pub requested: u32,
}

impl BatchReport {
    /// True when nothing was requested, e.g. for an empty prompt
    pub const fn is_noop(&self) -> bool {
        self.requested == 0
    }

    /// Number of vendor calls issued
    pub fn attempted(&self) -> usize {
        self.slots.len()
    }

    /// Slots that produced an image
    pub fn successes(&self) -> impl Iterator<Item = (u32, &GenerationResult)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.result.as_ref().ok().map(|r| (slot.index, r)))
    }

    /// Slots that failed
    pub fn failures(&self) -> impl Iterator<Item = (u32, &GenerationError)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.result.as_ref().err().map(|e| (slot.index, e)))
    }

    /// True when the batch stopped before every slot was attempted
    pub fn halted_early(&self) -> bool {
        self.attempted() < self.requested as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_sizes_round_trip_through_text() {
        for size in OpenAiSize::ALL {
            assert_eq!(OpenAiSize::parse(size.as_str()), Some(size));
        }
        assert_eq!(OpenAiSize::parse("512x512"), None);
        assert_eq!(OpenAiSize::parse("AUTO"), None);
    }

    #[test]
    fn dimensions_parse_width_and_height() {
        assert_eq!(
            Dimensions::parse("768x512"),
            Some(Dimensions {
                width: 768,
                height: 512
            })
        );
        assert_eq!(
            Dimensions::parse(" 640 X 480 "),
            Some(Dimensions {
                width: 640,
                height: 480
            })
        );
    }

    #[test]
    fn dimensions_reject_malformed_text() {
        for bad in ["", "1024", "0x512", "512x0", "-1x512", "axb", "512x512x3", "auto"] {
            assert_eq!(Dimensions::parse(bad), None, "{bad} should not parse");
        }
    }

    #[test]
    fn image_size_labels() {
        assert_eq!(ImageSize::OpenAi(OpenAiSize::Auto).to_string(), "auto");
        assert_eq!(
            ImageSize::Custom(Dimensions {
                width: 512,
                height: 768
            })
            .to_string(),
            "512x768"
        );
    }

    #[test]
    fn download_names_follow_slot_index() {
        assert_eq!(GenerationResult::file_name(1), "image_1.png");
        assert_eq!(GenerationResult::file_name(4), "image_4.png");
    }
}

//! Scene rendering for the export composition

pub mod layout;
pub mod paint;
pub mod raster;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// An encoded raster capture of the export wrapper
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    pub fn empty(width: u32, height: u32) -> Self {
        Self { width, height, png_data: Vec::new() }
    }

    /// The image as a `data:` URL, the form browser-side capture hands out
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_has_png_media_type() {
        let shot = Screenshot { width: 1, height: 1, png_data: vec![1, 2, 3] };
        let url = shot.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }
}
